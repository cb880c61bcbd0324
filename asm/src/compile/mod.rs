use std::collections::HashMap;

use log::{debug, trace};

use crate::operand::{Address, Base, Index, Kind, Operand};
use crate::parse::parse_line;

mod arithmetic;
mod bitwise;
mod comparison;
mod control;
pub mod error;
mod internal;
mod memory;

pub use error::AsmError;

/// A code-generation routine: consumes resolved operands, emits machine code
/// and adjusts the simulated stack pointer by the net cell effect of that
/// code.
pub(crate) type Gen = fn(&mut Assembler, &[Operand]) -> Result<String, AsmError>;

/// Dispatch table keyed on (mnemonic, ordered operand kinds). Lookup is
/// exact; a miss means the combination is not part of the language.
pub(crate) type Table = HashMap<(String, Vec<Kind>), Gen>;

pub(crate) fn def(table: &mut Table, mnemonic: &str, kinds: &[Kind], gen: Gen) {
    table.insert((mnemonic.to_string(), kinds.to_vec()), gen);
}

/// Register both the bare and `:16`-suffixed spellings of a mnemonic against
/// one routine; the routine branches on the operand widths it receives.
pub(crate) fn def_w(table: &mut Table, mnemonic: &str, kinds: &[Kind], gen: Gen) {
    def(table, mnemonic, kinds, gen);
    def(table, &format!("{}:16", mnemonic), kinds, gen);
}

/// The assembler: symbol and function tables, the dispatch table, and the
/// simulated stack pointer.
///
/// The stack pointer is the load-bearing invariant of the whole design:
/// after executing everything emitted so far, the machine's data pointer
/// equals this value. Every routine keeps the two in step.
pub struct Assembler {
    symbols: HashMap<String, u64>,
    functions: HashMap<String, String>,
    defining: Option<String>,
    stack_pointer: u64,
    table: Table,
}

impl Assembler {
    pub fn new() -> Self {
        let mut table = Table::new();
        internal::register(&mut table);
        memory::register(&mut table);
        arithmetic::register(&mut table);
        comparison::register(&mut table);
        bitwise::register(&mut table);
        control::register(&mut table);
        debug!("dispatch table built: {} entries", table.len());
        Self {
            symbols: HashMap::new(),
            functions: HashMap::new(),
            defining: None,
            stack_pointer: 0,
            table,
        }
    }

    pub fn stack_pointer(&self) -> u64 {
        self.stack_pointer
    }

    /// Assemble a program. Composite instructions re-enter this routine with
    /// small generated fragments, so it must tolerate being called mid-pass.
    pub fn assemble(&mut self, source: &str) -> Result<String, AsmError> {
        let mut out = String::new();
        for (number, text) in source.lines().enumerate() {
            let parsed = parse_line(text).map_err(|err| AsmError::Parse {
                line: number + 1,
                err,
            })?;
            let Some(line) = parsed else { continue };

            if line.mnemonic == "RTRN" {
                self.defining = None;
                continue;
            }
            if let Some(name) = self.defining.clone() {
                // width and stack effects are realized when the function is
                // inlined, so the body is captured as unresolved text
                let body = self.functions.get_mut(&name).expect("open function");
                body.push_str(text);
                body.push('\n');
                continue;
            }

            let operands = self.resolve(line.operands)?;
            let kinds: Vec<Kind> = operands.iter().map(Operand::kind).collect();
            let gen = self
                .table
                .get(&(line.mnemonic.clone(), kinds.clone()))
                .copied()
                .ok_or(AsmError::Unsupported {
                    mnemonic: line.mnemonic.clone(),
                    kinds,
                })?;
            let before = self.stack_pointer;
            let code = gen(self, &operands)?;
            if !line.mnemonic.starts_with('_') {
                trace!("{} {} {}", before, text.trim(), code);
            }
            out.push_str(&code);
        }
        Ok(out)
    }

    pub(crate) fn lookup(&self, name: &str) -> Result<u64, AsmError> {
        self.symbols
            .get(name)
            .copied()
            .ok_or_else(|| AsmError::UnresolvedSymbol(name.to_string()))
    }

    pub(crate) fn define_symbol(&mut self, name: &str, cell: u64) {
        self.symbols.insert(name.to_string(), cell);
    }

    pub(crate) fn function_body(&self, name: &str) -> Result<String, AsmError> {
        self.functions
            .get(name)
            .cloned()
            .ok_or_else(|| AsmError::UnknownFunction(name.to_string()))
    }

    pub(crate) fn open_function(&mut self, name: &str) -> Result<(), AsmError> {
        if self.defining.is_some() {
            return Err(AsmError::NestedFunction(name.to_string()));
        }
        if self.functions.contains_key(name) {
            return Err(AsmError::FunctionRedefined(name.to_string()));
        }
        self.functions.insert(name.to_string(), String::new());
        self.defining = Some(name.to_string());
        Ok(())
    }

    pub(crate) fn grow_stack(&mut self, cells: u64) {
        self.stack_pointer += cells;
    }

    pub(crate) fn shrink_stack(&mut self, cells: u64) -> Result<(), AsmError> {
        self.stack_pointer =
            self.stack_pointer
                .checked_sub(cells)
                .ok_or(AsmError::StackUnderflow {
                    cells,
                    stack_pointer: self.stack_pointer,
                })?;
        Ok(())
    }

    /// Distance from the stack pointer down to a cell. Cells above the stack
    /// pointer are not addressable.
    pub(crate) fn offset_to(&self, cell: u64) -> Result<u64, AsmError> {
        self.stack_pointer
            .checked_sub(cell)
            .ok_or(AsmError::BadOffset {
                cell,
                stack_pointer: self.stack_pointer,
            })
    }

    /// Cell number of a resolved direct address.
    pub(crate) fn cell_of(&self, address: &Address) -> Result<u64, AsmError> {
        address
            .direct_cell()
            .ok_or_else(|| AsmError::UnresolvedSymbol(format!("{:?}", address)))
    }

    /// Resolve operands against the symbol table: `&name` becomes the
    /// symbol's cell number, and symbolic address bases become absolute
    /// cells. Bare symbols stay symbolic; they name things being declared.
    fn resolve(&self, operands: Vec<Operand>) -> Result<Vec<Operand>, AsmError> {
        operands
            .into_iter()
            .map(|op| match op {
                Operand::AddressOf { name, width } => {
                    let cell = self.lookup(&name)?;
                    Ok(Operand::Immediate {
                        value: cell as i64,
                        width,
                    })
                }
                Operand::Address(a) => {
                    let base = match a.base {
                        Base::Symbol(name) => Base::Cell(self.lookup(&name)?),
                        base => base,
                    };
                    let index = match a.index {
                        Index::Cell { base: Base::Symbol(name), width } => Index::Cell {
                            base: Base::Cell(self.lookup(&name)?),
                            width,
                        },
                        index => index,
                    };
                    Ok(Operand::Address(Address {
                        base,
                        width: a.width,
                        index,
                    }))
                }
                op => Ok(op),
            })
            .collect()
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}
