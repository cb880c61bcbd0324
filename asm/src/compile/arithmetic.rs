use crate::compile::{def, def_w, AsmError, Assembler, Table};
use crate::operand::{Kind, Operand, Width};

/// The canonical six-cell division sequence. With [n, d, 0, 0, 0, 0] and the
/// pointer on n it terminates with [0, d - n%d, n%d, n/d, 0, 0]. Only valid
/// for d >= 2; the immediate lowerings route 0 and 1 through special cases.
const DIVMOD: &str = "[->-[>+>>]>[+[-<+>]>+>>]<<<<<]";

pub(crate) fn register(table: &mut Table) {
    def_w(table, "PLUS", &[Kind::Top, Kind::Top, Kind::Top], plus);
    def_w(table, "PLUS", &[Kind::Top, Kind::Top, Kind::Immediate], plus_immediate);
    def_w(table, "SUBT", &[Kind::Top, Kind::Top, Kind::Top], subt);
    def_w(table, "SUBT", &[Kind::Top, Kind::Top, Kind::Immediate], subt_immediate);
    def(table, "MULT", &[Kind::Top, Kind::Top, Kind::Top], mult);
    def(table, "MULT", &[Kind::Top, Kind::Top, Kind::Immediate], mult_immediate);
    def(table, "DIVI", &[Kind::Top, Kind::Top, Kind::Immediate], divi);
    def(table, "MODS", &[Kind::Top, Kind::Top, Kind::Immediate], mods_immediate);
}

fn widths3(ops: &[Operand]) -> (Width, Width, Width) {
    (ops[0].width(), ops[1].width(), ops[2].width())
}

/// Pop b, pop a, push a + b.
fn plus(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    match widths3(ops) {
        (Width::W8, Width::W8, Width::W8) => {
            asm.shrink_stack(1)?;
            Ok("<[<+>-]".to_string())
        }
        (Width::W16, Width::W16, Width::W16) => {
            asm.shrink_stack(4)?;
            // drain b into a: 256 at a time off the high byte, then single
            // steps off the low byte, each through the carry idiom
            asm.assemble(
                "_LFT 1:16
                 _RAW >[<
                 _LFT 1:16
                 _ADD 256:16
                 _RIT 1:16
                 _SUB 256:16
                 _RAW >]<[
                 _LFT 1:16
                 _ADD 1:16
                 _RIT 1:16
                 _SUB 1:16
                 _RAW ]",
            )
        }
        _ => Err(AsmError::UnsupportedWidth {
            mnemonic: "PLUS".to_string(),
        }),
    }
}

fn plus_immediate(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Top { width }, Operand::Top { .. }, Operand::Immediate { value, .. }] = ops
    else {
        unreachable!("dispatched on Top, Top, Immediate")
    };
    let (value, width) = (*value, *width);
    asm.assemble(&format!(
        "_LFT 1:{w}\n_ADD {v}:{w}\n_RIT 1:{w}",
        w = width,
        v = value
    ))
}

/// Pop b, pop a, push a - b.
fn subt(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    match widths3(ops) {
        (Width::W8, Width::W8, Width::W8) => {
            asm.shrink_stack(1)?;
            Ok("<[<->-]".to_string())
        }
        (Width::W16, Width::W16, Width::W16) => {
            asm.shrink_stack(4)?;
            asm.assemble(
                "_LFT 1:16
                 _RAW >[<
                 _LFT 1:16
                 _SUB 256:16
                 _RIT 1:16
                 _SUB 256:16
                 _RAW >]<[
                 _LFT 1:16
                 _SUB 1:16
                 _RIT 1:16
                 _SUB 1:16
                 _RAW ]",
            )
        }
        _ => Err(AsmError::UnsupportedWidth {
            mnemonic: "SUBT".to_string(),
        }),
    }
}

fn subt_immediate(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Top { width }, Operand::Top { .. }, Operand::Immediate { value, .. }] = ops
    else {
        unreachable!("dispatched on Top, Top, Immediate")
    };
    let (value, width) = (*value, *width);
    asm.assemble(&format!(
        "_LFT 1:{w}\n_SUB {v}:{w}\n_RIT 1:{w}",
        w = width,
        v = value
    ))
}

/// Pop both operands, accumulate one into the result cell the other's count
/// of times.
fn mult(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    match widths3(ops) {
        (Width::W8, Width::W8, Width::W8) => {
            asm.shrink_stack(1)?;
            Ok("<<[>>>+<<<-]>>>[<<[<+>>+<-]>[<+>-]>-]<<[-]".to_string())
        }
        _ => Err(AsmError::UnsupportedWidth {
            mnemonic: "MULT".to_string(),
        }),
    }
}

/// Multiply the top of stack by an immediate in place.
fn mult_immediate(_asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Top { width }, Operand::Top { .. }, Operand::Immediate { value, .. }] = ops
    else {
        unreachable!("dispatched on Top, Top, Immediate")
    };
    if *width != Width::W8 {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "MULT".to_string(),
        });
    }
    let factor = value.rem_euclid(256) as usize;
    Ok(format!("<[>+<-]>[-<{}>]", "+".repeat(factor)))
}

/// Divide the top of stack by an immediate in place.
fn divi(_asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Top { width }, Operand::Top { .. }, Operand::Immediate { value, .. }] = ops
    else {
        unreachable!("dispatched on Top, Top, Immediate")
    };
    if *width != Width::W8 {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "DIVI".to_string(),
        });
    }
    let d = value.rem_euclid(256) as usize;
    match d {
        0 => Err(AsmError::DivideByZero),
        1 => Ok(String::new()),
        _ => Ok(format!(
            "{}<{}>[-]>[-]>[<<<+>>>-]<<",
            "+".repeat(d),
            DIVMOD
        )),
    }
}

/// Reduce the top of stack modulo an immediate in place.
fn mods_immediate(_asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Top { width }, Operand::Top { .. }, Operand::Immediate { value, .. }] = ops
    else {
        unreachable!("dispatched on Top, Top, Immediate")
    };
    if *width != Width::W8 {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "MODS".to_string(),
        });
    }
    let d = value.rem_euclid(256) as usize;
    match d {
        0 => Err(AsmError::DivideByZero),
        1 => Ok("<[-]>".to_string()),
        _ => Ok(format!(
            "{}<{}>[-]>[<<+>>-]>[-]<<",
            "+".repeat(d),
            DIVMOD
        )),
    }
}
