//! # dupe-finder CLI
//!
//! Command-line interface for the duplicate file finder.
//!
//! ## Usage
//! ```bash
//! dupe-finder scan ~/Documents -o duplicates.json
//! dupe-finder show duplicates.json
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", cli::failure_message(&e));
            ExitCode::FAILURE
        }
    }
}
