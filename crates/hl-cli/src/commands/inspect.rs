//! `hashlog log` and `hashlog tip`: read-only views of a ledger.

use crate::settings::Settings;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use hl_canon::to_canonical_string;
use hl_ledger::LedgerFile;
use serde_json::Value;

fn open_existing(settings: &Settings) -> Result<LedgerFile> {
    let file = LedgerFile::new(&settings.ledger_path);
    if !file.exists() {
        bail!("ledger {} does not exist", file.path().display());
    }
    Ok(file)
}

/// Handle the log command, printing at most `limit` entries from the start.
pub fn cmd_log(settings: &Settings, limit: Option<usize>) -> Result<()> {
    let file = open_existing(settings)?;
    let records = file
        .records()
        .with_context(|| format!("failed to read ledger {}", file.path().display()))?;

    println!("{}", "Ledger".bold().underline());
    println!("{}: {}", "File".bold(), file.path().display());
    println!();

    let mut shown = 0;
    for record in records.take(limit.unwrap_or(usize::MAX)) {
        let (line, entry) = record?;
        shown += 1;
        println!("{} {}", "Entry".bold().cyan(), shown.to_string().cyan());
        println!("  {}: {}", "Line".bold(), line);
        println!("  {}: {}", "Task".bold(), entry.task_id);
        println!("  {}: {}", "Timestamp".bold(), entry.timestamp);
        if entry.is_genesis() {
            println!("  {}: {}", "Parent".bold(), "genesis".yellow());
        } else {
            println!("  {}: {}", "Parent".bold(), entry.parent_hash);
        }
        println!("  {}: {}", "Hash".bold(), entry.current_hash);
        let payload = to_canonical_string(&Value::Object(entry.payload))?;
        println!("  {}: {}", "Payload".bold(), payload);
        println!();
    }

    if shown == 0 {
        println!("{}", "Ledger is empty".yellow());
    }
    Ok(())
}

/// Handle the tip command.
pub fn cmd_tip(settings: &Settings) -> Result<()> {
    let file = LedgerFile::new(&settings.ledger_path);
    let tip = file
        .tip()
        .with_context(|| format!("failed to read ledger {}", file.path().display()))?;
    println!("{}: {}", "tip".bold(), tip.hash);
    println!("{}: {}", "entries".bold(), tip.len);
    if let Some(timestamp) = &tip.timestamp {
        println!("{}: {}", "timestamp".bold(), timestamp);
    }
    Ok(())
}
