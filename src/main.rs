use std::env;
use std::process::ExitCode;

use simpl_lang::{RunOptions, Simpl, EXIT_FAILURE};

fn main() -> ExitCode {
    env_logger::init();

    let mut script = None;
    let mut options = RunOptions::default();

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--ast" => options.print_ast = true,
            "--time" => options.time = true,
            _ if script.is_none() => script = Some(arg),
            _ => {
                eprintln!("Usage: simpl [script] [--ast] [--time]");
                return ExitCode::from(EXIT_FAILURE);
            }
        }
    }

    let mut simpl = Simpl::new();

    match script {
        Some(path) => simpl.run_file(&path, options),
        None => simpl.run_prompt(),
    }
}
