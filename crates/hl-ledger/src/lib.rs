//! Tamper-evident, append-only ledger.
//!
//! Each entry stores the hash of the entry before it and a hash of its own contents, so
//! any edit, deletion or reordering of stored records is caught by recomputing the
//! chain from the genesis sentinel.
//!
//! - [`ChainBuilder`] creates the entry that follows a given tip.
//! - [`verify_chain`] / [`ChainWalk`] check an ordered sequence.
//! - [`LedgerFile`] stores entries one canonical JSON line each.
//! - [`Ledger`] owns a file and the single mutex-guarded tip its writers share.
//!
//! # Example
//!
//! ```
//! use hl_ledger::{verify_chain, ChainBuilder, HashAlgorithm, Payload, Timestamp, GENESIS_HASH};
//! use serde_json::json;
//!
//! let builder = ChainBuilder::new(HashAlgorithm::Sha256);
//! let mut tip = GENESIS_HASH.to_string();
//! let mut entries = Vec::new();
//!
//! for ty in ["a", "b", "c"] {
//!     let mut payload = Payload::new();
//!     payload.insert("type".to_string(), json!(ty));
//!     let entry = builder
//!         .append(&tip, Timestamp::from_secs(1_700_000_000), format!("task-{ty}"), payload)
//!         .unwrap();
//!     tip = entry.current_hash.clone();
//!     entries.push(entry);
//! }
//!
//! let report = verify_chain(&entries, HashAlgorithm::Sha256).unwrap();
//! assert!(report.is_valid());
//! assert_eq!(report.entries_verified, 3);
//! ```

mod builder;
mod config;
mod entry;
mod error;
mod ledger;
mod store;
mod verify;

pub use builder::{ChainBuilder, ChainTip};
pub use config::{ConfigError, LedgerConfig, CONFIG_FILE_NAME};
pub use entry::{Entry, Payload, Timestamp, GENESIS_HASH};
pub use error::{BuildError, LedgerError, StructuralError};
pub use hl_canon::HashAlgorithm;
pub use ledger::Ledger;
pub use store::{parse_record, LedgerFile, Records};
pub use verify::{
    verify_chain, ChainFailure, ChainVerifier, ChainWalk, FailureKind, Position,
    VerificationReport, VerifyError,
};
