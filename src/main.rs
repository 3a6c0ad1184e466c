use clap::Parser;
use std::process::ExitCode;

mod command_line;

use command_line::cli::{run, Cli, Outcome};

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(Outcome::Sat) => ExitCode::SUCCESS,
        Ok(Outcome::Unsat) => ExitCode::from(1),
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::from(2)
        }
    }
}
