//! Ledger entry data structures.

use crate::error::BuildError;
use hl_canon::{to_canonical_string, CanonError, HashAlgorithm};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Parent hash of the first entry: a 256-bit zero value rendered as hex.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Opaque application data carried by an entry.
pub type Payload = Map<String, Value>;

/// Writer-assigned creation time in seconds.
///
/// Integral and fractional values are kept apart so that an entry re-encodes exactly as
/// it was written (`12` and `12.0` hash differently).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(Number);

impl Timestamp {
    /// Fractional seconds. Non-finite values are rejected.
    pub fn from_secs_f64(secs: f64) -> Result<Self, BuildError> {
        Number::from_f64(secs)
            .map(Timestamp)
            .ok_or(BuildError::NonFiniteTimestamp(secs))
    }

    /// Whole seconds.
    pub fn from_secs(secs: u64) -> Self {
        Timestamp(Number::from(secs))
    }

    pub fn as_f64(&self) -> f64 {
        self.0.as_f64().unwrap_or_default()
    }

    pub fn as_number(&self) -> &Number {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A single record in the ledger.
///
/// Entries are produced by [`ChainBuilder::append`](crate::ChainBuilder::append) and are
/// never mutated afterwards. Deserialization rejects unknown fields, so a stored record
/// carries exactly the five fields below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Entry {
    /// Creation time assigned by the writer
    pub timestamp: Timestamp,

    /// Application-chosen identifier (not required to be unique)
    pub task_id: String,

    /// `current_hash` of the preceding entry, or [`GENESIS_HASH`]
    pub parent_hash: String,

    /// Opaque structured data
    pub payload: Payload,

    /// Digest of the canonical record with this field held at `""`
    pub current_hash: String,
}

impl Entry {
    /// Whether this entry declares itself the first in its chain.
    pub fn is_genesis(&self) -> bool {
        self.parent_hash == GENESIS_HASH
    }

    /// Recompute the content hash from the entry's own fields.
    ///
    /// The stored `current_hash` takes no part: the record is hashed with that field
    /// present and set to the empty string.
    pub fn compute_hash(&self, algorithm: HashAlgorithm) -> Result<String, CanonError> {
        algorithm.hash_value(&self.record(""))
    }

    /// Whether the stored `current_hash` matches a recomputation.
    pub fn is_consistent(&self, algorithm: HashAlgorithm) -> bool {
        self.compute_hash(algorithm)
            .map(|hash| hash == self.current_hash)
            .unwrap_or(false)
    }

    /// Canonical single-line form used for storage.
    pub fn to_canonical_line(&self) -> Result<String, CanonError> {
        to_canonical_string(&self.record(&self.current_hash))
    }

    fn record(&self, current_hash: &str) -> Value {
        let mut record = Map::new();
        record.insert(
            "current_hash".to_string(),
            Value::String(current_hash.to_string()),
        );
        record.insert(
            "parent_hash".to_string(),
            Value::String(self.parent_hash.clone()),
        );
        record.insert("payload".to_string(), Value::Object(self.payload.clone()));
        record.insert("task_id".to_string(), Value::String(self.task_id.clone()));
        record.insert(
            "timestamp".to_string(),
            Value::Number(self.timestamp.as_number().clone()),
        );
        Value::Object(record)
    }
}
