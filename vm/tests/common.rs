use bfvm::{BufferInput, BufferOutput, ExecError, Machine};

pub const MAX_TEST_CYCLES: u64 = 1_000_000;

pub fn run(source: &str) -> Result<Machine, ExecError> {
    run_with_input(source, &[]).map(|(m, _)| m)
}

pub fn run_with_input(source: &str, input: &[u8]) -> Result<(Machine, Vec<u8>), ExecError> {
    let mut machine = Machine::default();
    machine.load(source);
    let mut input = BufferInput::new(input);
    let mut output = BufferOutput::new();
    machine.run(&mut input, &mut output, MAX_TEST_CYCLES)?;
    Ok((machine, output.data))
}
