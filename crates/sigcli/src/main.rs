//! `sigcli` binary: set up logging, then hand the parsed CLI to `sigcli::run()`.

use std::process::ExitCode;

use clap::Parser;
use sigcli::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    sigcli::logging::init(cli.verbose, cli.quiet);

    if let Err(e) = sigcli::run(cli) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
