//! Subcommand handlers.

pub mod append;
pub mod generate;
pub mod inspect;
pub mod verify;

use anyhow::{Context, Result};
use chrono::Utc;
use hl_ledger::Timestamp;
use std::fs;
use std::path::Path;

/// Parse a timestamp argument as a JSON number, so `12` stays an integer and `12.0` a float.
pub fn parse_timestamp(arg: &str) -> Result<Timestamp, String> {
    serde_json::from_str(arg.trim()).map_err(|_| format!("'{arg}' is not a number of seconds"))
}

/// Current wall-clock time in seconds since the Unix epoch.
pub(crate) fn now_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display())),
        _ => Ok(()),
    }
}
