use robokit_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Fall back to stderr if the log file cannot be opened.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("robokit error: {:#}", err);
        std::process::exit(1);
    }
}
