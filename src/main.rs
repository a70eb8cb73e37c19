//! Replan CLI - Local-first goal planning with cascade-aware rescheduling

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = replan_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
