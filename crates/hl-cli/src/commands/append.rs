//! `hashlog append`: add one entry at the tip.

use super::{ensure_parent_dir, now_secs};
use crate::settings::Settings;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use hl_ledger::{Ledger, Timestamp};
use serde_json::Value;
use tracing::info;

/// Handle the append command.
pub fn cmd_append(
    settings: &Settings,
    task_id: String,
    payload: &str,
    timestamp: Option<Timestamp>,
) -> Result<()> {
    let value: Value = serde_json::from_str(payload).context("payload is not valid JSON")?;
    let Value::Object(payload) = value else {
        bail!("payload must be a JSON object");
    };
    let timestamp = match timestamp {
        Some(timestamp) => timestamp,
        None => Timestamp::from_secs_f64(now_secs())?,
    };

    ensure_parent_dir(&settings.ledger_path)?;
    let ledger = Ledger::open(&settings.ledger_path, settings.algorithm).with_context(|| {
        format!("failed to open ledger {}", settings.ledger_path.display())
    })?;
    let entry = ledger
        .append(timestamp, task_id, payload)
        .context("failed to append entry")?;
    let len = ledger.tip()?.len;
    info!(task_id = %entry.task_id, hash = %entry.current_hash, "appended");

    println!("{} Appended entry {len}", "✓".green().bold());
    println!("  {}: {}", "Task".bold(), entry.task_id);
    println!("  {}: {}", "Hash".bold(), entry.current_hash);
    Ok(())
}
