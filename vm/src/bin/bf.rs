use std::env;
use std::fs::File;
use std::io::{stdin, stdout, Read};
use std::path::Path;

use bfvm::{Machine, StreamInput, StreamOutput};

const MAX_CYCLES: u64 = u64::MAX;

fn main() -> Result<(), String> {
    let args: Vec<_> = env::args().collect();
    if args.len() != 2 {
        return Err(format!("usage: {} <program>", args[0]));
    }

    let mut reader: Box<dyn Read> = match args[1].as_ref() {
        "-" => Box::new(stdin()),
        _ => {
            Box::new(File::open(Path::new(&args[1])).map_err(|x| format!("failed to open: {}", x))?)
        }
    };
    let mut source = String::new();
    reader
        .read_to_string(&mut source)
        .map_err(|x| format!("read: {}", x))?;

    let mut machine = Machine::default();
    machine.load(&source);
    let mut input = StreamInput(stdin());
    let mut output = StreamOutput(stdout());
    machine
        .run(&mut input, &mut output, MAX_CYCLES)
        .map_err(String::from)
}
