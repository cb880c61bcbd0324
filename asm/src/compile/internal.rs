use crate::compile::{def, def_w, AsmError, Assembler, Table};
use crate::operand::{Kind, Operand, Width};

/// One `+1` against a [low, high, carry, temp] group: tentatively increment
/// the low byte, detect wrap through the temp/carry pair, and let the carry
/// flow into the high byte, leaving carry and temp at 0.
const CARRY_ADD: &str = "+[>>+>+<<<-]>>[<<+>>-]+>[<->[-]]<[-<+>]<<";

/// The borrowing mirror for `-1`.
const CARRY_SUB: &str = "[>>+>+<<<-]>>[<<+>>-]+>[<->[-]]<[-<->]<<-";

pub(crate) fn register(table: &mut Table) {
    def(table, "_RAW", &[Kind::Raw], raw);
    def_w(table, "_RIT", &[Kind::Immediate], right);
    def_w(table, "_LFT", &[Kind::Immediate], left);
    def_w(table, "_ADD", &[Kind::Immediate], add);
    def_w(table, "_SUB", &[Kind::Immediate], sub);
    def_w(table, "_SET", &[Kind::Immediate], set);
    def(table, "_JFZ", &[], jfz);
    def(table, "_JBN", &[], jbn);
}

pub(crate) fn rit(cells: u64) -> String {
    ">".repeat(cells as usize)
}

pub(crate) fn lft(cells: u64) -> String {
    "<".repeat(cells as usize)
}

fn unit(value: i64, width: Width) -> Result<u64, AsmError> {
    if value < 0 {
        return Err(AsmError::BadImmediate(value));
    }
    Ok(value as u64 * width.cells())
}

fn raw(_asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    match ops {
        [Operand::Raw(text)] => Ok(text.clone()),
        _ => unreachable!("dispatched on Raw"),
    }
}

fn right(_asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    match ops {
        [Operand::Immediate { value, width }] => Ok(rit(unit(*value, *width)?)),
        _ => unreachable!("dispatched on Immediate"),
    }
}

fn left(_asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    match ops {
        [Operand::Immediate { value, width }] => Ok(lft(unit(*value, *width)?)),
        _ => unreachable!("dispatched on Immediate"),
    }
}

fn jfz(_asm: &mut Assembler, _ops: &[Operand]) -> Result<String, AsmError> {
    Ok("[".to_string())
}

fn jbn(_asm: &mut Assembler, _ops: &[Operand]) -> Result<String, AsmError> {
    Ok("]".to_string())
}

fn add(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Immediate { value, width }] = ops else {
        unreachable!("dispatched on Immediate")
    };
    match width {
        Width::W8 => Ok("+".repeat(value.rem_euclid(256) as usize)),
        Width::W16 => {
            let value = value.rem_euclid(65536) as u64;
            let high = value / 256;
            let low = value % 256;
            let mut out = String::new();
            // adjust the high byte directly instead of carrying 256 times
            // per unit through the low byte
            if high > 0 {
                out += &asm.assemble(&format!("_RIT 1\n_ADD {}:8\n_LFT 1", high))?;
            }
            out += &CARRY_ADD.repeat(low as usize);
            Ok(out)
        }
    }
}

fn sub(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Immediate { value, width }] = ops else {
        unreachable!("dispatched on Immediate")
    };
    match width {
        Width::W8 => Ok("-".repeat(value.rem_euclid(256) as usize)),
        Width::W16 => {
            let value = value.rem_euclid(65536) as u64;
            let high = value / 256;
            let low = value % 256;
            let mut out = String::new();
            if high > 0 {
                out += &asm.assemble(&format!("_RIT 1\n_SUB {}:8\n_LFT 1", high))?;
            }
            out += &CARRY_SUB.repeat(low as usize);
            Ok(out)
        }
    }
}

fn set(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Immediate { value, width }] = ops else {
        unreachable!("dispatched on Immediate")
    };
    let mut out = match width {
        Width::W8 => "[-]".to_string(),
        Width::W16 => "[-]>[-]<".to_string(),
    };
    out += &asm.assemble(&format!("_ADD {}:{}", value, width))?;
    Ok(out)
}
