//! rsnap - snapshot evaluated resource graphs

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = resource_snapshot::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
