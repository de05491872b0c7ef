//! `hashlog verify`: walk the stored chain and report the first failure.

use crate::settings::Settings;
use colored::Colorize;
use hl_ledger::{ChainFailure, LedgerFile};
use std::process::ExitCode;
use tracing::debug;

/// Exit status for a chain that fails verification.
pub const EXIT_BROKEN: u8 = 1;
/// Exit status for a ledger that cannot be read or parsed.
pub const EXIT_UNREADABLE: u8 = 2;

/// Handle the verify command.
pub fn cmd_verify(settings: &Settings) -> ExitCode {
    let file = LedgerFile::new(&settings.ledger_path);
    debug!(path = %file.path().display(), algorithm = %settings.algorithm, "verifying");

    let report = match file.verify(settings.algorithm) {
        Ok(report) => report,
        Err(err) => {
            println!("{} {err}", "FAIL:".red().bold());
            return ExitCode::from(EXIT_UNREADABLE);
        }
    };

    match &report.failure {
        None => {
            let summary = format!("OK: {} entries, chain intact", report.entries_verified);
            println!("{}", summary.green().bold());
            ExitCode::SUCCESS
        }
        Some(failure) => {
            print_failure(failure);
            ExitCode::from(EXIT_BROKEN)
        }
    }
}

fn print_failure(failure: &ChainFailure) {
    let (headline, expected, actual) = match failure {
        ChainFailure::ParentLinkMismatch {
            position,
            expected,
            actual,
        } => (
            format!("FAIL {position}: parent_hash mismatch"),
            expected,
            actual,
        ),
        ChainFailure::ContentHashMismatch {
            position,
            task_id,
            expected,
            stored,
        } => (
            format!("FAIL {position}: hash mismatch for task {task_id}"),
            expected,
            stored,
        ),
    };
    println!("{}", headline.red().bold());
    println!("  {}: {expected}", "expected".bold());
    println!("  {}:      {actual}", "got".bold());
}
