//! tg - command-line entry point for taggu

use std::process::ExitCode;

use taggu::ui::output;

fn main() -> ExitCode {
    match taggu::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
