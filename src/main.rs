//! catcombo - generate and reconcile category option combinations

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = catcombo::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
