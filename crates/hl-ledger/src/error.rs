//! Error types for building, reading and verifying a ledger.

use crate::verify::{ChainFailure, Position};
use hl_canon::CanonError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while constructing a new entry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("tip hash '{0}' is not a 64-character lowercase hex digest")]
    MalformedTip(String),

    #[error("payload must be a string-keyed map, got {0}")]
    PayloadNotAnObject(&'static str),

    #[error("timestamp {0} is not a finite number")]
    NonFiniteTimestamp(f64),

    #[error("payload has no canonical representation: {0}")]
    Canon(#[from] CanonError),
}

/// Malformed input: a record that cannot take part in verification at all.
///
/// Kept apart from [`ChainFailure`], which reports well-formed records whose hashes do
/// not line up.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructuralError {
    #[error("line {line}: malformed record: {message}")]
    MalformedRecord { line: usize, message: String },

    #[error("{position}: record has no canonical representation: {source}")]
    Unhashable {
        position: Position,
        #[source]
        source: CanonError,
    },
}

/// Errors surfaced by on-disk ledgers.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("entry could not be encoded: {0}")]
    Canon(#[from] CanonError),

    #[error("timestamp {requested} precedes the chain tip timestamp {previous}")]
    TimestampRegression { previous: f64, requested: f64 },

    #[error("chain verification failed: {0}")]
    BrokenChain(ChainFailure),

    #[error("ledger tip lock poisoned by a panicked writer")]
    Poisoned,
}

impl LedgerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LedgerError::Io {
            path: path.into(),
            source,
        }
    }
}
