use std::process::ExitCode;

use clap::Parser;
use pgmod_cli::{exit_code, logging, print_error, print_report, run, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut stdout = std::io::stdout().lock();
    match run(&cli) {
        Ok(report) => match print_report(&cli, &report, &mut stdout) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("error: {err:#}");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            if let Err(print_err) = print_error(&cli, &err, &mut stdout) {
                eprintln!("error: {print_err:#}");
            }
            ExitCode::from(exit_code(&err))
        }
    }
}
