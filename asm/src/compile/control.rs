use log::debug;

use crate::compile::internal::{lft, rit};
use crate::compile::{def, AsmError, Assembler, Table};
use crate::operand::{Kind, Operand, Width};

pub(crate) fn register(table: &mut Table) {
    def(table, "FUNC", &[Kind::Symbol], func);
    def(table, "CALL", &[Kind::Symbol], call);
    def(table, "CINZ", &[Kind::Symbol], cinz);
    def(table, "CWNZ", &[Kind::Address, Kind::Symbol], cwnz);
    def(table, "IFNZ", &[], ifnz);
    def(table, "IFEZ", &[], ifez);
    def(table, "ELSE", &[], else_block);
    def(table, "ENIF", &[], enif);
    def(table, "WHNZ", &[Kind::Address], whnz);
    def(table, "ENWH", &[Kind::Address], enwh);
}

/// Open a function definition. The body is captured as text by the assemble
/// loop until RTRN; no code is emitted here.
fn func(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Symbol { name, .. }] = ops else {
        unreachable!("dispatched on Symbol")
    };
    asm.open_function(name)?;
    Ok(String::new())
}

/// Calls are inlined: the body is recompiled at the call site against the
/// current symbol table and stack pointer. There is no call primitive on the
/// target machine, so recursion cannot exist.
fn call(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Symbol { name, .. }] = ops else {
        unreachable!("dispatched on Symbol")
    };
    let body = asm.function_body(name)?;
    debug!("inlining {} at stack pointer {}", name, asm.stack_pointer());
    asm.assemble(&body)
}

/// Pop a flag; inline the call only when it was nonzero. The body must have
/// zero net stack effect.
fn cinz(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Symbol { name, .. }] = ops else {
        unreachable!("dispatched on Symbol")
    };
    asm.shrink_stack(1)?;
    let mut out = String::from("<[[-]");
    out += &asm.assemble(&format!("CALL {}", name))?;
    out += "]";
    Ok(out)
}

/// Inline the call repeatedly while a named cell is nonzero, decrementing
/// the cell each pass: a bounded-iteration primitive.
fn cwnz(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Address(flag), Operand::Symbol { name, .. }] = ops else {
        unreachable!("dispatched on Address, Symbol")
    };
    if flag.width != Width::W8 {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "CWNZ".to_string(),
        });
    }
    let cell = asm.cell_of(flag)?;
    let offset = asm.offset_to(cell)?;
    let mut out = format!("{}[{}", lft(offset), rit(offset));
    out += &asm.assemble(&format!("CALL {}", name))?;
    out += &format!("{}-]{}", lft(offset), rit(offset));
    Ok(out)
}

/// Open an if-block keyed off the top of stack, consuming it. The guarded
/// region must have zero net stack effect and leave the pointer where it
/// started, or every later offset is wrong.
fn ifnz(asm: &mut Assembler, _ops: &[Operand]) -> Result<String, AsmError> {
    asm.shrink_stack(1)?;
    Ok("<[[-]".to_string())
}

fn ifez(asm: &mut Assembler, _ops: &[Operand]) -> Result<String, AsmError> {
    let mut out = asm.assemble("EQLS @top @top 0")?;
    asm.shrink_stack(1)?;
    out += "<[[-]";
    Ok(out)
}

/// Carry an entered-flag across the closing bracket so the alternative runs
/// exactly when the if-body did not.
fn else_block(_asm: &mut Assembler, _ops: &[Operand]) -> Result<String, AsmError> {
    Ok(">+<]>[<+>-]<-[[-]".to_string())
}

fn enif(_asm: &mut Assembler, _ops: &[Operand]) -> Result<String, AsmError> {
    Ok("]".to_string())
}

/// Loop keyed off a named cell rather than the stack top: the condition has
/// a stable home the loop can re-test each iteration.
fn whnz(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Address(flag)] = ops else {
        unreachable!("dispatched on Address")
    };
    if flag.width != Width::W8 {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "WHNZ".to_string(),
        });
    }
    let cell = asm.cell_of(flag)?;
    let offset = asm.offset_to(cell)?;
    Ok(format!("{}[{}", lft(offset), rit(offset)))
}

/// Close a WHNZ loop, decrementing the named cell before the back-jump
/// re-tests it.
fn enwh(asm: &mut Assembler, ops: &[Operand]) -> Result<String, AsmError> {
    let [Operand::Address(flag)] = ops else {
        unreachable!("dispatched on Address")
    };
    if flag.width != Width::W8 {
        return Err(AsmError::UnsupportedWidth {
            mnemonic: "ENWH".to_string(),
        });
    }
    let cell = asm.cell_of(flag)?;
    let offset = asm.offset_to(cell)?;
    Ok(format!("{}-]{}", lft(offset), rit(offset)))
}
