use std::env;
use std::fs::File;
use std::io::{stdin, stdout, Read, Write};
use std::path::Path;

use bfasm::args::process_cli;
use bfasm::Assembler;

fn main() -> Result<(), String> {
    env_logger::init();

    let args = process_cli(&env::args().collect::<Vec<_>>())
        .map_err(|x| format!("processing cli: {x}"))?;
    if !args.validate() {
        println!("{}", args.usage());
        return Ok(());
    }

    let target_file = args.target_files.first().unwrap();
    let mut reader: Box<dyn Read> = match target_file.as_ref() {
        "-" => Box::new(stdin()),
        _ => Box::new(
            File::open(Path::new(&target_file)).map_err(|x| format!("failed to open: {}", x))?,
        ),
    };

    let mut source = String::new();
    reader
        .read_to_string(&mut source)
        .map_err(|x| format!("read: {}", x))?;

    let mut assembler = Assembler::new();
    let code = assembler
        .assemble(&source)
        .map_err(|x| format!("assembling: {}", x))?;

    let mut stdout = stdout().lock();
    stdout
        .write_all(code.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .map_err(|x| format!("{}", x))
}
