use crate::compile::{def, AsmError, Assembler, Table};
use crate::operand::{Kind, Operand, Width};

pub(crate) fn register(table: &mut Table) {
    def(table, "BAND", &[Kind::Top, Kind::Top, Kind::Top], band);
    def(table, "BOOR", &[Kind::Top, Kind::Top, Kind::Top], boor);
    def(table, "BXOR", &[Kind::Top, Kind::Top, Kind::Top], bxor);
    def(table, "LSFT", &[Kind::Top, Kind::Top, Kind::Immediate], lsft);
    def(table, "RSFT", &[Kind::Top, Kind::Top, Kind::Immediate], rsft);
}

fn all_w8(ops: &[Operand]) -> bool {
    ops.iter().all(|o| o.width() == Width::W8)
}

/// Bitwise combine, built rather than primitive: for each of the eight bit
/// positions, shift both operands down, mask to bit zero, apply the one-bit
/// logical combiner, shift the partial back up, then sum the eight partials
/// and drop the consumed operands.
fn combine_bits(asm: &mut Assembler, combiner: &str) -> Result<String, AsmError> {
    let a = asm
        .stack_pointer
        .checked_sub(2)
        .ok_or(AsmError::BadOffset {
            cell: 2,
            stack_pointer: asm.stack_pointer,
        })?;
    let b = a + 1;
    let mut src = String::new();
    for bit in 0..8 {
        for operand in [a, b] {
            src += &format!("PUSH @top @{}\n", operand);
            if bit > 0 {
                src += &format!("RSFT @top @top {}\n", bit);
            }
            src += "MODS @top @top 2\n";
        }
        src += &format!("{} @top @top @top\n", combiner);
        if bit > 0 {
            src += &format!("LSFT @top @top {}\n", bit);
        }
    }
    for _ in 0..7 {
        src += "PLUS @top @top @top\n";
    }
    src += "SWAP @top @top\nPOPV @top\nSWAP @top @top\nPOPV @top\n";
    asm.assemble(&src)
}

fn band(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    if !all_w8(ops) {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "BAND".to_string(),
        });
    }
    combine_bits(asm, "LAND")
}

fn boor(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    if !all_w8(ops) {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "BOOR".to_string(),
        });
    }
    combine_bits(asm, "LOOR")
}

fn bxor(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    if !all_w8(ops) {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "BXOR".to_string(),
        });
    }
    combine_bits(asm, "LXOR")
}

/// Left shift by immediate lowers to multiplication by a power of two; the
/// factor is already reduced mod 256, so shifts of eight or more zero the
/// cell.
fn lsft(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Top { width }, Operand::Top { .. }, Operand::Immediate { value, .. }] = ops
    else {
        unreachable!("dispatched on Top, Top, Immediate")
    };
    if *width != Width::W8 {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "LSFT".to_string(),
        });
    }
    let shift = *value;
    if shift < 0 {
        return Err(AsmError::BadImmediate(shift));
    }
    if shift >= 8 {
        return Ok("<[-]>".to_string());
    }
    asm.assemble(&format!("MULT @top @top {}", 1u64 << shift))
}

/// Right shift by immediate lowers to division by a power of two.
fn rsft(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Top { width }, Operand::Top { .. }, Operand::Immediate { value, .. }] = ops
    else {
        unreachable!("dispatched on Top, Top, Immediate")
    };
    if *width != Width::W8 {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "RSFT".to_string(),
        });
    }
    let shift = *value;
    if shift < 0 {
        return Err(AsmError::BadImmediate(shift));
    }
    if shift >= 8 {
        return Ok("<[-]>".to_string());
    }
    asm.assemble(&format!("DIVI @top @top {}", 1u64 << shift))
}
