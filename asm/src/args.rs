use std::fmt;

pub enum ArgsError {
    UnknownFlag(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::UnknownFlag(s) => write!(f, "unknown flag: {}", s),
        }
    }
}

#[derive(Debug, Default)]
pub struct Args {
    pub bin_name: String,
    pub target_files: Vec<String>,
    show_help: bool,
}

impl Args {
    pub fn validate(&self) -> bool {
        if self.show_help {
            return false;
        };
        !self.target_files.is_empty()
    }

    pub fn usage(&self) -> String {
        format!(
            "usage: {} [OPTIONS] <input file>

reads assembly from the input file (or - for stdin) and writes
machine code to stdout

options:
    -h, --help\tShow this message.
",
            self.bin_name
        )
    }
}

pub fn process_cli(args: &[String]) -> Result<Args, ArgsError> {
    let mut out = Args {
        bin_name: args[0].to_string(),
        ..Args::default()
    };
    for a in &args[1..] {
        match a.as_str() {
            "-" => out.target_files.push(a.to_string()),
            "-h" | "--help" => out.show_help = true,
            x if x.starts_with('-') => return Err(ArgsError::UnknownFlag(x.to_string())),
            _ => out.target_files.push(a.to_string()),
        }
    }
    Ok(out)
}
