use std::fmt;

use crate::io::{Input, Output};
use crate::op::{parse_program, Op};

pub const DEFAULT_TAPE_SIZE: usize = 30_000;

#[derive(Debug)]
pub enum ExecError {
    TapeUnderflow(usize),
    TapeOverflow(usize),
    UnbalancedOpen(usize),
    UnbalancedClose(usize),
    CycleLimit(u64),
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::TapeUnderflow(pc) => write!(f, "pointer moved left of cell 0 @ op {}", pc),
            ExecError::TapeOverflow(pc) => write!(f, "pointer moved past end of tape @ op {}", pc),
            ExecError::UnbalancedOpen(pc) => write!(f, "no matching ] for [ @ op {}", pc),
            ExecError::UnbalancedClose(pc) => write!(f, "no matching [ for ] @ op {}", pc),
            ExecError::CycleLimit(n) => write!(f, "cycle limit exceeded: {}", n),
        }
    }
}

impl From<ExecError> for String {
    fn from(e: ExecError) -> Self {
        format!("{}", e)
    }
}

/// The target machine: a byte tape, a data pointer and a program counter.
/// Jumps are resolved by scanning for the matching bracket at the point of
/// the jump, the same way the reference executor does it.
pub struct Machine {
    tape: Vec<u8>,
    pointer: usize,
    program: Vec<Op>,
    pc: usize,
    cycles: u64,
}

impl Machine {
    pub fn new(tape_size: usize) -> Self {
        Self {
            tape: vec![0; tape_size],
            pointer: 0,
            program: Vec::new(),
            pc: 0,
            cycles: 0,
        }
    }

    pub fn load(&mut self, source: &str) {
        self.program = parse_program(source);
        self.pc = 0;
    }

    pub fn reset(&mut self) {
        self.tape.fill(0);
        self.pointer = 0;
        self.pc = 0;
        self.cycles = 0;
    }

    pub fn halted(&self) -> bool {
        self.pc >= self.program.len()
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn cell(&self, addr: usize) -> u8 {
        self.tape.get(addr).copied().unwrap_or(0)
    }

    pub fn step(
        &mut self,
        input: &mut dyn Input,
        output: &mut dyn Output,
    ) -> Result<(), ExecError> {
        let Some(op) = self.program.get(self.pc).copied() else {
            return Ok(());
        };
        match op {
            Op::Right => {
                if self.pointer + 1 >= self.tape.len() {
                    return Err(ExecError::TapeOverflow(self.pc));
                }
                self.pointer += 1;
            }
            Op::Left => {
                if self.pointer == 0 {
                    return Err(ExecError::TapeUnderflow(self.pc));
                }
                self.pointer -= 1;
            }
            Op::Inc => self.tape[self.pointer] = self.tape[self.pointer].wrapping_add(1),
            Op::Dec => self.tape[self.pointer] = self.tape[self.pointer].wrapping_sub(1),
            Op::Open => {
                if self.tape[self.pointer] == 0 {
                    self.jump_forward()?;
                }
            }
            Op::Close => {
                if self.tape[self.pointer] != 0 {
                    self.jump_backward()?;
                }
            }
            Op::Out => output.write_byte(self.tape[self.pointer]),
            Op::In => {
                // end of input leaves the cell untouched
                if let Some(b) = input.read_byte() {
                    self.tape[self.pointer] = b;
                }
            }
        }
        self.pc += 1;
        self.cycles += 1;
        Ok(())
    }

    pub fn run(
        &mut self,
        input: &mut dyn Input,
        output: &mut dyn Output,
        max_cycles: u64,
    ) -> Result<(), ExecError> {
        while !self.halted() {
            self.step(input, output)?;
            if self.cycles >= max_cycles {
                return Err(ExecError::CycleLimit(max_cycles));
            }
        }
        Ok(())
    }

    // O(distance) scan counting bracket depth, leaving pc on the matching
    // bracket so the shared pc increment in step() lands one past it.
    fn jump_forward(&mut self) -> Result<(), ExecError> {
        let open = self.pc;
        let mut depth = 1;
        let mut at = self.pc;
        while depth != 0 {
            at += 1;
            match self.program.get(at) {
                Some(Op::Open) => depth += 1,
                Some(Op::Close) => depth -= 1,
                Some(_) => {}
                None => return Err(ExecError::UnbalancedOpen(open)),
            }
        }
        self.pc = at;
        Ok(())
    }

    fn jump_backward(&mut self) -> Result<(), ExecError> {
        let close = self.pc;
        let mut depth = 1;
        let mut at = self.pc;
        while depth != 0 {
            if at == 0 {
                return Err(ExecError::UnbalancedClose(close));
            }
            at -= 1;
            match self.program[at] {
                Op::Close => depth += 1,
                Op::Open => depth -= 1,
                _ => {}
            }
        }
        self.pc = at;
        Ok(())
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(DEFAULT_TAPE_SIZE)
    }
}
