use crate::compile::internal::{lft, rit};
use crate::compile::{def, def_w, AsmError, Assembler, Table};
use crate::operand::{Address, Index, Kind, Operand, Width};

pub(crate) fn register(table: &mut Table) {
    def_w(table, "ALOC", &[Kind::Symbol, Kind::Immediate], aloc);
    def_w(table, "PUSH", &[Kind::Top, Kind::Immediate], push_top_immediate);
    def_w(table, "PUSH", &[Kind::Top, Kind::Address], push_top_address);
    def_w(table, "PUSH", &[Kind::Top, Kind::Top], push_top_top);
    def_w(table, "PUSH", &[Kind::Address, Kind::Immediate], push_address_immediate);
    def_w(table, "PUSH", &[Kind::Address, Kind::Top], push_address_top);
    def_w(table, "POPV", &[Kind::Top], popv_top);
    def_w(table, "POPV", &[Kind::Address, Kind::Top], popv_address_top);
    def(table, "SWAP", &[Kind::Top, Kind::Top], swap);
    def(table, "GETI", &[Kind::Top, Kind::Top], geti_top);
    def(table, "GETI", &[Kind::Top, Kind::Address], geti_address);
    def(table, "SETI", &[Kind::Top, Kind::Top], seti_top);
    def(table, "SETI", &[Kind::Address, Kind::Top], seti_address);
    def(table, "READ", &[Kind::Immediate], read);
    def(table, "OUTC", &[Kind::Address, Kind::Immediate], outc);
    def(table, "OUTP", &[Kind::Top], outp);
}

/// Reserve `n` units of storage under a name. The tape region is claimed by
/// advancing both the allocation frontier and the machine pointer past it.
fn aloc(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Symbol { name, width }, Operand::Immediate { value, .. }] = ops else {
        unreachable!("dispatched on Symbol, Immediate")
    };
    if *value < 0 {
        return Err(AsmError::BadImmediate(*value));
    }
    let cells = *value as u64 * width.cells();
    asm.define_symbol(name, asm.stack_pointer);
    asm.grow_stack(cells);
    Ok(rit(cells))
}

fn push_top_immediate(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Top { width }, Operand::Immediate { value, .. }] = ops else {
        unreachable!("dispatched on Top, Immediate")
    };
    let (value, width) = (*value, *width);
    asm.grow_stack(width.cells());
    asm.assemble(&format!("_ADD {}:{}\n_RIT 1:{}", value, width, width))
}

/// Copy a stored value onto the stack without disturbing it: drain the
/// source into both the new top slot and a scratch cell, then drain the
/// scratch back into the source.
fn push_top_address(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Top { width: dest_width }, Operand::Address(source)] = ops else {
        unreachable!("dispatched on Top, Address")
    };
    if source.indirect() {
        return push_indirect(asm, *dest_width, source.clone());
    }
    let cell = asm.cell_of(source)?;
    match (dest_width, source.width) {
        (Width::W8, Width::W8) => {
            let offset = asm.offset_to(cell)?;
            asm.grow_stack(1);
            asm.assemble(&format!(
                "_LFT {offset}
                 _JFZ
                     _SUB 1
                     _RIT {offset}
                     _ADD 1
                     _RIT 1
                     _ADD 1
                     _LFT {back}
                 _JBN
                 _RIT {back}
                 _JFZ
                     _SUB 1
                     _LFT {back}
                     _ADD 1
                     _RIT {back}
                 _JBN",
                offset = offset,
                back = offset + 1,
            ))
        }
        (Width::W16, Width::W16) => asm.assemble(&format!(
            "PUSH @top @{low}:8
             PUSH @top @{high}:8
             PUSH @top 0
             PUSH @top 0",
            low = cell,
            high = cell + 1,
        )),
        _ => Err(AsmError::UnsupportedWidth {
            mnemonic: "PUSH".to_string(),
        }),
    }
}

/// Indirect read: the index is already on the stack, so this is array access
/// against the address's base.
fn push_indirect(asm: &mut Assembler, dest: Width, source: Address) -> Result<String, AsmError> {
    if dest != Width::W8 || source.width != Width::W8 {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "PUSH".to_string(),
        });
    }
    let base = match source.base {
        crate::operand::Base::Cell(c) => c,
        _ => unreachable!("resolved before dispatch"),
    };
    match source.index {
        Index::Top => geti(asm, base),
        Index::Cell { base: index_base, .. } => {
            let index_cell = match index_base {
                crate::operand::Base::Cell(c) => c,
                _ => unreachable!("resolved before dispatch"),
            };
            let mut out = asm.assemble(&format!("PUSH @top @{}", index_cell))?;
            out += &geti(asm, base)?;
            Ok(out)
        }
        Index::Const { .. } => unreachable!("direct addresses handled by caller"),
    }
}

fn push_top_top(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Top { width }, Operand::Top { .. }] = ops else {
        unreachable!("dispatched on Top, Top")
    };
    match width {
        Width::W8 => {
            let top = asm.stack_pointer.checked_sub(1).ok_or(AsmError::BadOffset {
                cell: 1,
                stack_pointer: asm.stack_pointer,
            })?;
            asm.assemble(&format!("PUSH @top @{}", top))
        }
        Width::W16 => {
            let top = asm
                .stack_pointer
                .checked_sub(4)
                .ok_or(AsmError::BadOffset {
                    cell: 4,
                    stack_pointer: asm.stack_pointer,
                })?;
            asm.assemble(&format!("PUSH @top:16 @{}:16", top))
        }
    }
}

/// Store an immediate into a named cell, leaving the stack untouched.
fn push_address_immediate(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Address(dest), Operand::Immediate { value, .. }] = ops else {
        unreachable!("dispatched on Address, Immediate")
    };
    if dest.indirect() {
        let width = dest.width;
        if width != Width::W8 {
            return Err(AsmError::UnsupportedWidth {
                mnemonic: "PUSH".to_string(),
            });
        }
        let base = asm_base(dest)?;
        return asm.assemble(&format!(
            "PUSH @top {}\nSWAP @top @top\nSETI @{} @top",
            value, base
        ));
    }
    let cell = asm.cell_of(dest)?;
    let offset = asm.offset_to(cell)?;
    asm.assemble(&format!(
        "_LFT {}\n_SET {}:{}\n_RIT {}",
        offset, value, dest.width, offset
    ))
}

/// Copy the top of stack into a named cell without consuming it.
fn push_address_top(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Address(dest), Operand::Top { width }] = ops else {
        unreachable!("dispatched on Address, Top")
    };
    if dest.indirect() {
        return Err(AsmError::Unsupported {
            mnemonic: "PUSH".to_string(),
            kinds: vec![Kind::Address, Kind::Top],
        });
    }
    let cell = asm.cell_of(dest)?;
    match (width, dest.width) {
        (Width::W8, Width::W8) => {
            let top = asm.stack_pointer.checked_sub(1).ok_or(AsmError::BadOffset {
                cell: 1,
                stack_pointer: asm.stack_pointer,
            })?;
            asm.assemble(&format!("PUSH @top @{}\nPOPV @{} @top", top, cell))
        }
        (Width::W16, Width::W16) => {
            let top = asm.stack_pointer.checked_sub(4).ok_or(AsmError::BadOffset {
                cell: 4,
                stack_pointer: asm.stack_pointer,
            })?;
            asm.assemble(&format!(
                "PUSH @top:16 @{}:16\nPOPV:16 @{}:16 @top:16",
                top, cell
            ))
        }
        _ => Err(AsmError::UnsupportedWidth {
            mnemonic: "PUSH".to_string(),
        }),
    }
}

fn popv_top(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Top { width }] = ops else {
        unreachable!("dispatched on Top")
    };
    match width {
        Width::W8 => {
            asm.shrink_stack(1)?;
            Ok("<[-]".to_string())
        }
        Width::W16 => {
            asm.shrink_stack(4)?;
            Ok("<<<[-]<[-]".to_string())
        }
    }
}

/// Pop the stack top into a named cell: zero the destination, then drain the
/// top across.
fn popv_address_top(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Address(dest), Operand::Top { width }] = ops else {
        unreachable!("dispatched on Address, Top")
    };
    if dest.indirect() {
        if *width != Width::W8 {
            return Err(AsmError::UnsupportedWidth {
                mnemonic: "POPV".to_string(),
            });
        }
        // the index is already above the value, exactly what SETI expects
        let base = asm_base(dest)?;
        return asm.assemble(&format!("SETI @{} @top", base));
    }
    let cell = asm.cell_of(dest)?;
    match (width, dest.width) {
        (Width::W8, Width::W8) => {
            let offset = asm
                .offset_to(cell)?
                .checked_sub(1)
                .ok_or(AsmError::BadOffset {
                    cell,
                    stack_pointer: asm.stack_pointer,
                })?;
            let out = asm.assemble(&format!(
                "PUSH @{cell} 0
                 _LFT 1
                 _JFZ
                     _LFT {offset}
                     _ADD 1
                     _RIT {offset}
                     _SUB 1
                 _JBN",
                cell = cell,
                offset = offset,
            ))?;
            asm.shrink_stack(1)?;
            Ok(out)
        }
        (Width::W16, Width::W16) => {
            let low = asm
                .stack_pointer
                .checked_sub(4)
                .ok_or(AsmError::BadOffset {
                    cell: 4,
                    stack_pointer: asm.stack_pointer,
                })?;
            let distance = low.checked_sub(cell).ok_or(AsmError::BadOffset {
                cell,
                stack_pointer: asm.stack_pointer,
            })?;
            let out = asm.assemble(&format!(
                "PUSH:16 @{cell}:16 0
                 _LFT 4
                 _JFZ
                     _LFT {d}
                     _ADD 1
                     _RIT {d}
                     _SUB 1
                 _JBN
                 _RIT 1
                 _JFZ
                     _LFT {d}
                     _ADD 1
                     _RIT {d}
                     _SUB 1
                 _JBN
                 _LFT 1",
                cell = cell,
                d = distance,
            ))?;
            asm.shrink_stack(4)?;
            Ok(out)
        }
        _ => Err(AsmError::UnsupportedWidth {
            mnemonic: "POPV".to_string(),
        }),
    }
}

/// Exchange the top two stack cells through the scratch cell above them.
fn swap(_asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Top { width: a }, Operand::Top { width: b }] = ops else {
        unreachable!("dispatched on Top, Top")
    };
    if *a != Width::W8 || *b != Width::W8 {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "SWAP".to_string(),
        });
    }
    Ok("<[>+<-]<[>+<-]>>[<<+>>-]".to_string())
}

fn geti_top(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Top { width }, Operand::Top { .. }] = ops else {
        unreachable!("dispatched on Top, Top")
    };
    if *width != Width::W8 {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "GETI".to_string(),
        });
    }
    geti(asm, 0)
}

fn geti_address(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Top { width }, Operand::Address(array)] = ops else {
        unreachable!("dispatched on Top, Address")
    };
    if *width != Width::W8 || array.width != Width::W8 {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "GETI".to_string(),
        });
    }
    let base = asm.cell_of(array)?;
    geti(asm, base)
}

/// Dynamic array read. The index on the stack is converted into a trail of
/// marker cells; with the pointer displaced by exactly the index, the
/// ordinary relative copy lands on `base + index`, and the fetched value is
/// slid back across the trail, consuming it.
fn geti(asm: &mut Assembler, base: u64) -> Result<String, AsmError> {
    let mut out = asm.assemble("PUSH @top 0\nSWAP @top @top")?;
    out += "<[[>]+[<]>-]>[>]";
    out += &asm.assemble(&format!("PUSH @top @{}", base))?;
    out += "<<[->[<+>-]<<]>>";
    out += &asm.assemble("SWAP @top @top\nPOPV @top\nSWAP @top @top\nPOPV @top")?;
    Ok(out)
}

fn seti_top(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Top { width }, Operand::Top { .. }] = ops else {
        unreachable!("dispatched on Top, Top")
    };
    if *width != Width::W8 {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "SETI".to_string(),
        });
    }
    seti(asm, 0)
}

fn seti_address(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Address(array), Operand::Top { width }] = ops else {
        unreachable!("dispatched on Address, Top")
    };
    if *width != Width::W8 || array.width != Width::W8 {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "SETI".to_string(),
        });
    }
    let base = asm.cell_of(array)?;
    seti(asm, base)
}

/// Dynamic array write, the mirror of `geti`: build the trail from the
/// index, carry the value out along it (the trail shifts one cell left
/// underneath, so it survives for the way back), write through the displaced
/// pointer, then clear the trail to find home again.
fn seti(asm: &mut Assembler, base: u64) -> Result<String, AsmError> {
    let mut out = asm.assemble("PUSH @top 0\nSWAP @top @top")?;
    // distance from the value's slot down to the array base, measured with
    // the counter cell and its guard already in place
    let distance = asm
        .stack_pointer
        .checked_sub(1)
        .and_then(|s| s.checked_sub(base))
        .ok_or(AsmError::BadOffset {
            cell: base,
            stack_pointer: asm.stack_pointer,
        })?;
    out += "<[[>]+[<]>-]";
    out += "<<[>>+<<-]>>";
    out += ">[-<[>+<-]+>>]";
    out += &lft(distance + 1);
    out += "[-]";
    out += &rit(distance);
    out += "[-";
    out += &lft(distance);
    out += "+";
    out += &rit(distance);
    out += "]";
    out += "<[[-]<]<";
    asm.shrink_stack(3)?;
    Ok(out)
}

fn read(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Immediate { value, .. }] = ops else {
        unreachable!("dispatched on Immediate")
    };
    if *value < 0 {
        return Err(AsmError::BadImmediate(*value));
    }
    let n = *value as u64;
    asm.grow_stack(n);
    Ok(",>".repeat(n as usize))
}

fn outc(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Address(start), Operand::Immediate { value, .. }] = ops else {
        unreachable!("dispatched on Address, Immediate")
    };
    if *value < 0 {
        return Err(AsmError::BadImmediate(*value));
    }
    let n = *value as u64;
    let cell = asm.cell_of(start)?;
    let offset = asm.offset_to(cell)?;
    let back = offset.checked_sub(n).ok_or(AsmError::BadOffset {
        cell: cell + n,
        stack_pointer: asm.stack_pointer,
    })?;
    Ok(format!("{}{}{}", lft(offset), ".>".repeat(n as usize), rit(back)))
}

fn outp(_asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Top { width }] = ops else {
        unreachable!("dispatched on Top")
    };
    if *width != Width::W8 {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "OUTP".to_string(),
        });
    }
    Ok("<.>".to_string())
}

fn asm_base(address: &Address) -> Result<u64, AsmError> {
    match &address.base {
        crate::operand::Base::Cell(c) => Ok(*c),
        crate::operand::Base::Symbol(name) => Err(AsmError::UnresolvedSymbol(name.clone())),
    }
}
