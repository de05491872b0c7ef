//! Single-writer ledger over a JSONL file.

use crate::builder::{ChainBuilder, ChainTip};
use crate::entry::{Entry, Payload, Timestamp};
use crate::error::LedgerError;
use crate::store::LedgerFile;
use crate::verify::VerificationReport;
use hl_canon::HashAlgorithm;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// A ledger file plus the one tip its writers share.
///
/// Appends from any number of threads are serialized on the tip lock, so each new entry
/// is built against the true current tip. The tip only advances after the entry is on
/// disk.
#[derive(Debug)]
pub struct Ledger {
    store: LedgerFile,
    builder: ChainBuilder,
    tip: Mutex<ChainTip>,
}

impl Ledger {
    /// Open a ledger, recovering the tip from its last stored entry.
    pub fn open(path: impl Into<PathBuf>, algorithm: HashAlgorithm) -> Result<Self, LedgerError> {
        let store = LedgerFile::new(path);
        let tip = store.tip()?;
        debug!(
            path = %store.path().display(),
            entries = tip.len,
            tip = %tip.hash,
            "opened ledger"
        );
        Ok(Self {
            store,
            builder: ChainBuilder::new(algorithm),
            tip: Mutex::new(tip),
        })
    }

    /// Open a ledger only if its existing contents verify.
    pub fn open_verified(
        path: impl Into<PathBuf>,
        algorithm: HashAlgorithm,
    ) -> Result<Self, LedgerError> {
        let ledger = Self::open(path, algorithm)?;
        if ledger.store.exists() {
            let report = ledger.store.verify(algorithm)?;
            if let Some(failure) = report.failure {
                return Err(LedgerError::BrokenChain(failure));
            }
        }
        Ok(ledger)
    }

    pub fn store(&self) -> &LedgerFile {
        &self.store
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.builder.algorithm()
    }

    /// Snapshot of the current tip.
    pub fn tip(&self) -> Result<ChainTip, LedgerError> {
        Ok(self.lock()?.clone())
    }

    /// Build, persist and accept one entry.
    ///
    /// Timestamps may repeat but must not go backwards.
    pub fn append(
        &self,
        timestamp: Timestamp,
        task_id: impl Into<String>,
        payload: Payload,
    ) -> Result<Entry, LedgerError> {
        let mut tip = self.lock()?;
        check_timestamp(&tip, &timestamp)?;

        let entry = self.builder.append(&tip.hash, timestamp, task_id, payload)?;
        self.store.append(&entry)?;
        tip.advance(&entry);

        debug!(
            index = tip.len - 1,
            task_id = %entry.task_id,
            hash = %entry.current_hash,
            "appended entry"
        );
        Ok(entry)
    }

    /// Build a batch against the tip and persist it with a single flush.
    ///
    /// Nothing is written if any entry in the batch is rejected.
    pub fn append_batch<I, S>(&self, items: I) -> Result<Vec<Entry>, LedgerError>
    where
        I: IntoIterator<Item = (Timestamp, S, Payload)>,
        S: Into<String>,
    {
        let mut tip = self.lock()?;
        let mut pending = tip.clone();
        let mut entries = Vec::new();
        for (timestamp, task_id, payload) in items {
            check_timestamp(&pending, &timestamp)?;
            let entry = self
                .builder
                .append(&pending.hash, timestamp, task_id, payload)?;
            pending.advance(&entry);
            entries.push(entry);
        }

        self.store.append_all(&entries)?;
        *tip = pending;
        debug!(count = entries.len(), tip = %tip.hash, "appended batch");
        Ok(entries)
    }

    /// Verify the stored chain.
    ///
    /// Holds the tip lock for the duration, so no append is half-written while reading.
    pub fn verify(&self) -> Result<VerificationReport, LedgerError> {
        let tip = self.lock()?;
        if tip.is_genesis() && !self.store.exists() {
            return Ok(VerificationReport {
                entries_verified: 0,
                tip: tip.hash.clone(),
                failure: None,
            });
        }
        self.store.verify(self.algorithm())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ChainTip>, LedgerError> {
        self.tip.lock().map_err(|_| LedgerError::Poisoned)
    }
}

fn check_timestamp(tip: &ChainTip, timestamp: &Timestamp) -> Result<(), LedgerError> {
    if let Some(previous) = &tip.timestamp {
        if timestamp.as_f64() < previous.as_f64() {
            return Err(LedgerError::TimestampRegression {
                previous: previous.as_f64(),
                requested: timestamp.as_f64(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::GENESIS_HASH;
    use crate::verify::FailureKind;
    use serde_json::{json, Value};
    use std::fs;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    fn ts(secs: f64) -> Timestamp {
        Timestamp::from_secs_f64(secs).unwrap()
    }

    #[test]
    fn test_open_empty_ledger() {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::open(dir.path().join("ledger.jsonl"), HashAlgorithm::Sha256).unwrap();

        let tip = ledger.tip().unwrap();
        assert_eq!(tip.hash, GENESIS_HASH);
        assert!(ledger.verify().unwrap().is_valid());
    }

    #[test]
    fn test_reopen_continues_chain() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.jsonl");

        let first = {
            let ledger = Ledger::open(&path, HashAlgorithm::Sha256).unwrap();
            ledger
                .append(ts(10.0), "one", payload(json!({"type": "a"})))
                .unwrap()
        };

        let ledger = Ledger::open(&path, HashAlgorithm::Sha256).unwrap();
        let second = ledger
            .append(ts(11.0), "two", payload(json!({"type": "b"})))
            .unwrap();

        assert_eq!(second.parent_hash, first.current_hash);
        let report = ledger.verify().unwrap();
        assert!(report.is_valid());
        assert_eq!(report.entries_verified, 2);
        assert_eq!(report.tip, second.current_hash);
    }

    #[test]
    fn test_timestamp_regression_rejected() {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::open(dir.path().join("ledger.jsonl"), HashAlgorithm::Sha256).unwrap();

        ledger.append(ts(100.0), "a", Payload::new()).unwrap();
        ledger.append(ts(100.0), "same-time", Payload::new()).unwrap();
        let err = ledger.append(ts(99.5), "late", Payload::new()).unwrap_err();

        assert!(matches!(err, LedgerError::TimestampRegression { .. }));
        assert_eq!(ledger.tip().unwrap().len, 2);
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::open(dir.path().join("ledger.jsonl"), HashAlgorithm::Sha256).unwrap();

        let err = ledger
            .append_batch(vec![
                (ts(1.0), "a", Payload::new()),
                (ts(0.5), "b", Payload::new()),
            ])
            .unwrap_err();
        assert!(matches!(err, LedgerError::TimestampRegression { .. }));
        assert!(!ledger.store().exists());

        let entries = ledger
            .append_batch(vec![
                (ts(1.0), "a", Payload::new()),
                (ts(2.0), "b", Payload::new()),
            ])
            .unwrap();
        assert_eq!(entries[1].parent_hash, entries[0].current_hash);
        assert_eq!(ledger.tip().unwrap().hash, entries[1].current_hash);
    }

    #[test]
    fn test_open_verified_rejects_broken_chain() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.jsonl");
        {
            let ledger = Ledger::open(&path, HashAlgorithm::Sha256).unwrap();
            ledger.append(ts(1.0), "a", payload(json!({"type": "a"}))).unwrap();
            ledger.append(ts(2.0), "b", payload(json!({"type": "b"}))).unwrap();
        }

        let text = fs::read_to_string(&path).unwrap();
        fs::write(&path, text.replace("\"type\": \"b\"", "\"type\": \"x\"")).unwrap();

        match Ledger::open_verified(&path, HashAlgorithm::Sha256) {
            Err(LedgerError::BrokenChain(failure)) => {
                assert_eq!(failure.kind(), FailureKind::ContentHashMismatch);
                assert_eq!(failure.position().index, 1);
            }
            other => panic!("expected broken chain, got {other:?}"),
        }
    }

    #[test]
    fn test_concurrent_appends_form_one_chain() {
        let dir = TempDir::new().unwrap();
        let ledger = Arc::new(
            Ledger::open(dir.path().join("ledger.jsonl"), HashAlgorithm::Sha256).unwrap(),
        );

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    for i in 0..25 {
                        let mut p = Payload::new();
                        p.insert("worker".to_string(), worker.into());
                        ledger
                            .append(Timestamp::from_secs(1), format!("w{worker}-{i}"), p)
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let report = ledger.verify().unwrap();
        assert!(report.is_valid());
        assert_eq!(report.entries_verified, 100);
        assert_eq!(report.tip, ledger.tip().unwrap().hash);
    }
}
