use crate::compile::{def, AsmError, Assembler, Table};
use crate::operand::{Kind, Operand, Width};

pub(crate) fn register(table: &mut Table) {
    def(table, "EQLS", &[Kind::Top, Kind::Top, Kind::Top], eqls);
    def(table, "EQLS", &[Kind::Top, Kind::Top, Kind::Immediate], eqls_immediate);
    def(table, "EQLS:8:16:16", &[Kind::Top, Kind::Top, Kind::Top], eqls16);
    def(table, "GRTR", &[Kind::Top, Kind::Top, Kind::Top], grtr);
    def(table, "GRTR", &[Kind::Top, Kind::Top, Kind::Immediate], grtr_immediate);
    def(table, "LESS", &[Kind::Top, Kind::Top, Kind::Top], less);
    def(table, "LESS", &[Kind::Top, Kind::Top, Kind::Immediate], less_immediate);
    def(table, "LNOT", &[Kind::Top, Kind::Top], lnot);
    def(table, "LAND", &[Kind::Top, Kind::Top, Kind::Top], land);
    def(table, "LOOR", &[Kind::Top, Kind::Top, Kind::Top], loor);
    def(table, "LXOR", &[Kind::Top, Kind::Top, Kind::Top], lxor);
    def(table, "LXNR", &[Kind::Top, Kind::Top, Kind::Top], lxnr);
}

fn all_w8(ops: &[Operand]) -> bool {
    ops.iter().all(|o| o.width() == Width::W8)
}

/// Pop two values, push 1 if equal else 0: subtract, then fold the
/// difference into a boolean with the bias-and-branch zero test.
fn eqls(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    if !all_w8(ops) {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "EQLS".to_string(),
        });
    }
    let mut out = asm.assemble("SUBT @top @top @top")?;
    out += "+<[[-]>-<]>[<+>-]";
    Ok(out)
}

fn eqls_immediate(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Top { width }, Operand::Top { .. }, Operand::Immediate { value, .. }] = ops
    else {
        unreachable!("dispatched on Top, Top, Immediate")
    };
    if *width != Width::W8 {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "EQLS".to_string(),
        });
    }
    let value = *value;
    asm.assemble(&format!("PUSH @top {}\nEQLS @top @top @top", value))
}

/// 16-bit equality: compare low halves, compare high halves, AND the two
/// verdicts, then collapse the eight operand cells under the result.
fn eqls16(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let widths: Vec<Width> = ops.iter().map(|o| o.width()).collect();
    if widths != [Width::W8, Width::W16, Width::W16] {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "EQLS:8:16:16".to_string(),
        });
    }
    let x1 = asm
        .stack_pointer
        .checked_sub(8)
        .ok_or(AsmError::BadOffset {
            cell: 8,
            stack_pointer: asm.stack_pointer,
        })?;
    let x2 = x1 + 1;
    let y1 = x1 + 4;
    let y2 = x1 + 5;
    let out = asm.assemble(&format!(
        "PUSH @top @{x1}
         PUSH @top @{y1}
         EQLS @top @top @top
         PUSH @top @{x2}
         PUSH @top @{y2}
         EQLS @top @top @top
         LAND @top @top @top
         _RAW <<<<[-]<[-]<<<[-]<[-]>>>>>>>>
         _RAW [<<<<<<<<+>>>>>>>>-]<<<<<<<",
    ))?;
    asm.shrink_stack(8)?;
    Ok(out)
}

/// Pop b, pop a, push 1 if a > b else 0. Both operands count down in
/// lockstep; three scratch flags detect which one hit zero first.
fn grtr(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    if !all_w8(ops) {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "GRTR".to_string(),
        });
    }
    asm.shrink_stack(1)?;
    Ok(
        "<<[>>+<[>[-]>+<<-]>>[<<+>>-]<[>>+<<-]<-<-]>[-]>[-]>[-]>[<<<<+>>>>-]<<<"
            .to_string(),
    )
}

fn grtr_immediate(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Top { width }, Operand::Top { .. }, Operand::Immediate { value, .. }] = ops
    else {
        unreachable!("dispatched on Top, Top, Immediate")
    };
    if *width != Width::W8 {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "GRTR".to_string(),
        });
    }
    match *value {
        // nonzero test: bias, branch, rebias
        0 => Ok("+<[[-]+>-]>[->]<".to_string()),
        v => asm.assemble(&format!("PUSH @top {}\nGRTR @top @top @top", v)),
    }
}

fn less(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    if !all_w8(ops) {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "LESS".to_string(),
        });
    }
    asm.assemble("SWAP @top @top\nGRTR @top @top @top")
}

fn less_immediate(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Top { width }, Operand::Top { .. }, Operand::Immediate { value, .. }] = ops
    else {
        unreachable!("dispatched on Top, Top, Immediate")
    };
    if *width != Width::W8 {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "LESS".to_string(),
        });
    }
    let value = *value;
    asm.assemble(&format!("PUSH @top {}\nLESS @top @top @top", value))
}

/// Logical not is equality with zero.
fn lnot(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    if !all_w8(ops) {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "LNOT".to_string(),
        });
    }
    asm.assemble("EQLS @top @top 0")
}

fn land(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    if !all_w8(ops) {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "LAND".to_string(),
        });
    }
    asm.shrink_stack(1)?;
    Ok("<<[>>+<<[-]]>[>+<[-]]>[-[<<+>>[-]]]<".to_string())
}

fn loor(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    if !all_w8(ops) {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "LOOR".to_string(),
        });
    }
    asm.shrink_stack(1)?;
    asm.assemble("_RAW <[[-]<[-]+>]\nGRTR @top @top 0")
}

/// Booleanize both operands, then test the difference for nonzero.
fn lxor(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    if !all_w8(ops) {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "LXOR".to_string(),
        });
    }
    asm.assemble(
        "GRTR @top @top 0
         SWAP @top @top
         GRTR @top @top 0
         SWAP @top @top
         SUBT @top @top @top
         GRTR @top @top 0",
    )
}

/// Booleanize both operands, then test them for equality.
fn lxnr(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    if !all_w8(ops) {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "LXNR".to_string(),
        });
    }
    asm.assemble(
        "GRTR @top @top 0
         SWAP @top @top
         GRTR @top @top 0
         SWAP @top @top
         EQLS @top @top @top",
    )
}
