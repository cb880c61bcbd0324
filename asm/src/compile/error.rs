use std::fmt;

use crate::operand::Kind;
use crate::parse::ParseError;

/// Every error is fatal: assembly is a batch transformation with no partial
/// output, so the first failure aborts the whole run.
#[derive(Debug)]
pub enum AsmError {
    Parse { line: usize, err: ParseError },
    UnresolvedSymbol(String),
    Unsupported { mnemonic: String, kinds: Vec<Kind> },
    UnsupportedWidth { mnemonic: String },
    FunctionRedefined(String),
    NestedFunction(String),
    UnknownFunction(String),
    BadOffset { cell: u64, stack_pointer: u64 },
    StackUnderflow { cells: u64, stack_pointer: u64 },
    BadImmediate(i64),
    DivideByZero,
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmError::Parse { line, err } => write!(f, "line {}: {}", line, err),
            AsmError::UnresolvedSymbol(name) => write!(f, "unresolved symbol: {}", name),
            AsmError::Unsupported { mnemonic, kinds } => {
                let kinds: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
                write!(
                    f,
                    "{} not implemented for operands ({})",
                    mnemonic,
                    kinds.join(", ")
                )
            }
            AsmError::UnsupportedWidth { mnemonic } => {
                write!(f, "{} not implemented for this width combination", mnemonic)
            }
            AsmError::FunctionRedefined(name) => write!(f, "function already defined: {}", name),
            AsmError::NestedFunction(name) => {
                write!(f, "cannot define function {} inside another function", name)
            }
            AsmError::UnknownFunction(name) => write!(f, "unknown function: {}", name),
            AsmError::BadOffset {
                cell,
                stack_pointer,
            } => write!(
                f,
                "cell {} is above the stack pointer {}",
                cell, stack_pointer
            ),
            AsmError::StackUnderflow {
                cells,
                stack_pointer,
            } => write!(
                f,
                "cannot pop {} cells with stack pointer at {}",
                cells, stack_pointer
            ),
            AsmError::BadImmediate(v) => write!(f, "immediate out of range: {}", v),
            AsmError::DivideByZero => write!(f, "division by zero immediate"),
        }
    }
}

impl From<AsmError> for String {
    fn from(e: AsmError) -> Self {
        format!("{}", e)
    }
}
