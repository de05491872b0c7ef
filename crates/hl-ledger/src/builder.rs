//! Entry construction at the chain tip.

use crate::entry::{Entry, Payload, Timestamp, GENESIS_HASH};
use crate::error::BuildError;
use hl_canon::{is_digest_hex, to_structured, HashAlgorithm};
use serde::Serialize;
use serde_json::Value;

/// Builds new entries on top of a caller-supplied tip.
///
/// The builder holds no chain state: the tip is passed into every call and the returned
/// entry's `current_hash` is the tip for the next one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainBuilder {
    algorithm: HashAlgorithm,
}

impl ChainBuilder {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Construct the entry that follows `tip_hash`.
    ///
    /// `tip_hash` is the `current_hash` of the most recent entry, or [`GENESIS_HASH`]
    /// for an empty ledger. The returned entry is internally consistent.
    pub fn append(
        &self,
        tip_hash: &str,
        timestamp: Timestamp,
        task_id: impl Into<String>,
        payload: Payload,
    ) -> Result<Entry, BuildError> {
        if !is_digest_hex(tip_hash) {
            return Err(BuildError::MalformedTip(tip_hash.to_string()));
        }

        let mut entry = Entry {
            timestamp,
            task_id: task_id.into(),
            parent_hash: tip_hash.to_string(),
            payload,
            current_hash: String::new(),
        };
        entry.current_hash = entry.compute_hash(self.algorithm)?;
        Ok(entry)
    }

    /// Like [`append`](Self::append), converting a typed payload first.
    ///
    /// The payload must serialize to a string-keyed map with only finite floats.
    pub fn append_serializable<T: Serialize + ?Sized>(
        &self,
        tip_hash: &str,
        timestamp: Timestamp,
        task_id: impl Into<String>,
        payload: &T,
    ) -> Result<Entry, BuildError> {
        match to_structured(payload)? {
            Value::Object(map) => self.append(tip_hash, timestamp, task_id, map),
            other => Err(BuildError::PayloadNotAnObject(value_kind(&other))),
        }
    }
}

/// The last accepted entry of a chain, as seen by its single writer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainTip {
    /// Hash the next entry must declare as its parent
    pub hash: String,
    /// Timestamp of the last entry, `None` for an empty chain
    pub timestamp: Option<Timestamp>,
    /// Number of entries behind this tip
    pub len: usize,
}

impl ChainTip {
    pub fn genesis() -> Self {
        Self {
            hash: GENESIS_HASH.to_string(),
            timestamp: None,
            len: 0,
        }
    }

    /// Move the tip onto `entry`.
    pub fn advance(&mut self, entry: &Entry) {
        self.hash = entry.current_hash.clone();
        self.timestamp = Some(entry.timestamp.clone());
        self.len += 1;
    }

    pub fn is_genesis(&self) -> bool {
        self.len == 0
    }
}

impl Default for ChainTip {
    fn default() -> Self {
        Self::genesis()
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}
