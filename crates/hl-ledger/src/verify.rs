//! Chain verification.
//!
//! The verifier walks entries oldest first. Each entry must name the previously verified
//! hash as its parent (starting from [`GENESIS_HASH`]) and must hash to its stored
//! `current_hash`. The walk stops at the first entry that fails either check, since
//! nothing after a broken link can be trusted.

use crate::entry::{Entry, GENESIS_HASH};
use crate::error::StructuralError;
use hl_canon::HashAlgorithm;
use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Where an entry sits in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    /// Zero-based index among the entries walked
    pub index: usize,
    /// One-based line in the backing file, when read from one
    pub line: Option<usize>,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}"),
            None => write!(f, "entry {}", self.index),
        }
    }
}

/// Integrity failures. Both are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainFailure {
    /// The declared parent is not the hash of the entry before it: an entry was deleted,
    /// inserted or reordered.
    #[error("{position}: parent_hash mismatch (expected {expected}, got {actual})")]
    ParentLinkMismatch {
        position: Position,
        expected: String,
        actual: String,
    },

    /// The recomputed hash differs from the stored one: a field was edited in place.
    #[error("{position}: hash mismatch for task {task_id} (expected {expected}, got {stored})")]
    ContentHashMismatch {
        position: Position,
        task_id: String,
        expected: String,
        stored: String,
    },
}

/// Discriminant of a [`ChainFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    ParentLinkMismatch,
    ContentHashMismatch,
}

impl ChainFailure {
    pub fn position(&self) -> Position {
        match self {
            ChainFailure::ParentLinkMismatch { position, .. }
            | ChainFailure::ContentHashMismatch { position, .. } => *position,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ChainFailure::ParentLinkMismatch { .. } => FailureKind::ParentLinkMismatch,
            ChainFailure::ContentHashMismatch { .. } => FailureKind::ContentHashMismatch,
        }
    }
}

/// A single step of the walk went wrong.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Chain(#[from] ChainFailure),

    #[error(transparent)]
    Structural(#[from] StructuralError),
}

/// Outcome of a complete walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    /// Entries that passed both checks
    pub entries_verified: usize,
    /// Hash of the last verified entry ([`GENESIS_HASH`] if none)
    pub tip: String,
    /// First failure found, if any
    pub failure: Option<ChainFailure>,
}

impl VerificationReport {
    pub fn is_valid(&self) -> bool {
        self.failure.is_none()
    }
}

/// Incremental verifier state: the parent the next entry must declare.
#[derive(Debug, Clone)]
pub struct ChainVerifier {
    algorithm: HashAlgorithm,
    expected_parent: String,
    verified: usize,
}

impl ChainVerifier {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            expected_parent: GENESIS_HASH.to_string(),
            verified: 0,
        }
    }

    /// Check the next entry in order.
    ///
    /// On success the entry's hash becomes the expected parent of the following one. On
    /// failure the state is left untouched.
    pub fn check(&mut self, line: Option<usize>, entry: &Entry) -> Result<(), VerifyError> {
        let position = Position {
            index: self.verified,
            line,
        };

        if entry.parent_hash != self.expected_parent {
            return Err(ChainFailure::ParentLinkMismatch {
                position,
                expected: self.expected_parent.clone(),
                actual: entry.parent_hash.clone(),
            }
            .into());
        }

        let computed = entry
            .compute_hash(self.algorithm)
            .map_err(|source| StructuralError::Unhashable { position, source })?;
        if computed != entry.current_hash {
            return Err(ChainFailure::ContentHashMismatch {
                position,
                task_id: entry.task_id.clone(),
                expected: computed,
                stored: entry.current_hash.clone(),
            }
            .into());
        }

        self.expected_parent.clone_from(&entry.current_hash);
        self.verified += 1;
        Ok(())
    }

    pub fn verified(&self) -> usize {
        self.verified
    }

    pub fn expected_parent(&self) -> &str {
        &self.expected_parent
    }

    /// Close the walk into a report.
    pub fn finish(self, failure: Option<ChainFailure>) -> VerificationReport {
        match &failure {
            Some(failure) => warn!(
                verified = self.verified,
                %failure,
                "chain verification failed"
            ),
            None => debug!(entries = self.verified, "chain intact"),
        }
        VerificationReport {
            entries_verified: self.verified,
            tip: self.expected_parent,
            failure,
        }
    }
}

/// Lazy walk over an in-memory sequence.
///
/// Yields each entry's position once it passes both checks, then the first error, then
/// nothing.
pub struct ChainWalk<I> {
    entries: I,
    verifier: ChainVerifier,
    halted: bool,
}

impl<I> ChainWalk<I>
where
    I: Iterator,
    I::Item: Borrow<Entry>,
{
    pub fn new(entries: I, algorithm: HashAlgorithm) -> Self {
        Self {
            entries,
            verifier: ChainVerifier::new(algorithm),
            halted: false,
        }
    }

    pub fn verifier(&self) -> &ChainVerifier {
        &self.verifier
    }

    pub fn into_verifier(self) -> ChainVerifier {
        self.verifier
    }
}

impl<I> Iterator for ChainWalk<I>
where
    I: Iterator,
    I::Item: Borrow<Entry>,
{
    type Item = Result<Position, VerifyError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted {
            return None;
        }
        let Some(entry) = self.entries.next() else {
            self.halted = true;
            return None;
        };

        let index = self.verifier.verified();
        match self.verifier.check(None, entry.borrow()) {
            Ok(()) => Some(Ok(Position { index, line: None })),
            Err(err) => {
                self.halted = true;
                Some(Err(err))
            }
        }
    }
}

/// Verify an ordered sequence of entries.
///
/// Integrity failures land in the report; an entry that cannot be hashed at all is a
/// [`StructuralError`].
pub fn verify_chain<I>(
    entries: I,
    algorithm: HashAlgorithm,
) -> Result<VerificationReport, StructuralError>
where
    I: IntoIterator,
    I::Item: Borrow<Entry>,
{
    let mut walk = ChainWalk::new(entries.into_iter(), algorithm);
    let mut failure = None;
    for step in walk.by_ref() {
        match step {
            Ok(_) => {}
            Err(VerifyError::Chain(found)) => failure = Some(found),
            Err(VerifyError::Structural(err)) => return Err(err),
        }
    }
    Ok(walk.into_verifier().finish(failure))
}
