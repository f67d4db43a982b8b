use std::process::ExitCode;

use hypercube::ui::output;

fn main() -> ExitCode {
    match hypercube::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
