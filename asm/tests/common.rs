use bfasm::Assembler;
use bfvm::{BufferInput, BufferOutput, Machine};

pub const MAX_TEST_CYCLES: u64 = 5_000_000;

/// Check the machine against the assembler's simulated stack: the data
/// pointer must sit exactly on the tracked stack pointer, the cells below it
/// must hold the expected values, and the scratch cells above it must be
/// clean.
#[macro_export]
macro_rules! assert_stack {
    ($asm:expr, $vm:expr, [$($v:expr),* $(,)?]) => {{
        let sp = $asm.stack_pointer() as usize;
        assert_eq!(
            sp,
            $vm.pointer(),
            "stack pointer {} diverged from machine pointer {}",
            sp,
            $vm.pointer()
        );
        let expected: Vec<u8> = vec![$($v as u8),*];
        let base = sp - expected.len();
        let actual: Vec<u8> = (0..expected.len()).map(|i| $vm.cell(base + i)).collect();
        assert_eq!(expected, actual, "stack contents from cell {}", base);
        for i in 0..4 {
            assert_eq!(0, $vm.cell(sp + i), "residue above stack at +{}", i);
        }
    }};
}

/// 16-bit variant: each slot is a [low, high, carry, temp] group and the
/// carry/temp cells must be back to zero.
#[macro_export]
macro_rules! assert_stack16 {
    ($asm:expr, $vm:expr, [$($v:expr),* $(,)?]) => {{
        let sp = $asm.stack_pointer() as usize;
        assert_eq!(sp, $vm.pointer(), "stack pointer diverged from machine pointer");
        let expected: Vec<u32> = vec![$($v as u32),*];
        let base = sp - expected.len() * 4;
        for (i, v) in expected.iter().enumerate() {
            let at = base + i * 4;
            let got = $vm.cell(at) as u32 + ($vm.cell(at + 1) as u32) * 256;
            assert_eq!(*v, got, "16-bit slot {} at cell {}", i, at);
            assert_eq!(0, $vm.cell(at + 2), "carry cell at {}", at + 2);
            assert_eq!(0, $vm.cell(at + 3), "temp cell at {}", at + 3);
        }
        for i in 0..4 {
            assert_eq!(0, $vm.cell(sp + i), "residue above stack at +{}", i);
        }
    }};
}

#[macro_export]
macro_rules! assert_cells {
    ($vm:expr, $base:expr, [$($v:expr),* $(,)?]) => {{
        let expected: Vec<u8> = vec![$($v as u8),*];
        let actual: Vec<u8> = (0..expected.len()).map(|i| $vm.cell($base + i)).collect();
        assert_eq!(expected, actual, "cells from {}", $base);
    }};
}

#[allow(dead_code)]
pub fn build(source: &str) -> (Assembler, String) {
    let mut asm = Assembler::new();
    let code = asm.assemble(source).expect("assembly failed");
    (asm, code)
}

#[allow(dead_code)]
pub fn run(source: &str) -> (Assembler, Machine) {
    let (asm, machine, _) = run_with_input(source, &[]);
    (asm, machine)
}

#[allow(dead_code)]
pub fn run_with_input(source: &str, input: &[u8]) -> (Assembler, Machine, Vec<u8>) {
    let (asm, code) = build(source);
    let mut machine = Machine::default();
    machine.load(&code);
    let mut input = BufferInput::new(input);
    let mut output = BufferOutput::new();
    machine
        .run(&mut input, &mut output, MAX_TEST_CYCLES)
        .expect("execution failed");
    (asm, machine, output.data)
}
