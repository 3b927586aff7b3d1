use std::process::ExitCode;

use chat_archive_explorer::cli;
use chat_archive_explorer::storage::ArchiveError;

/// Exit status when the requested conversation or message does not exist
const EXIT_NOT_FOUND: u8 = 2;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.downcast_ref::<ArchiveError>().is_some_and(ArchiveError::is_not_found) {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_NOT_FOUND);
            }
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
