//! `hashlog generate`: extend a ledger with seeded fixture entries.

use super::{ensure_parent_dir, now_secs};
use crate::fixtures::FixtureGenerator;
use crate::settings::Settings;
use anyhow::{Context, Result};
use colored::Colorize;
use hl_ledger::Ledger;
use std::collections::BTreeMap;
use tracing::info;

/// Handle the generate command.
///
/// New timestamps continue from the tip unless `start` is given.
pub fn cmd_generate(settings: &Settings, count: usize, seed: u64, start: Option<f64>) -> Result<()> {
    ensure_parent_dir(&settings.ledger_path)?;
    let ledger = Ledger::open(&settings.ledger_path, settings.algorithm).with_context(|| {
        format!("failed to open ledger {}", settings.ledger_path.display())
    })?;
    let tip = ledger.tip()?;

    let start = start
        .or_else(|| tip.timestamp.as_ref().map(|ts| ts.as_f64()))
        .unwrap_or_else(now_secs);
    let records = FixtureGenerator::new(seed).generate(count, start)?;

    let mut tally: BTreeMap<&'static str, usize> = BTreeMap::new();
    for record in &records {
        *tally.entry(record.kind.type_name()).or_default() += 1;
    }

    let entries = ledger
        .append_batch(
            records
                .into_iter()
                .map(|record| (record.timestamp, record.task_id, record.payload)),
        )
        .context("failed to append fixture entries")?;
    info!(count = entries.len(), seed, "generated fixtures");

    println!(
        "{} Added {} entries ({} existing → {} total)",
        "✓".green().bold(),
        entries.len(),
        tip.len,
        tip.len + entries.len()
    );

    if !tally.is_empty() {
        let mut by_count: Vec<_> = tally.into_iter().collect();
        by_count.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        println!();
        println!("{}", "New entries by type:".bold());
        for (name, count) in by_count {
            println!("  {count:>3}  {name}");
        }
    }
    Ok(())
}
