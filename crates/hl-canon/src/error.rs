use thiserror::Error;

/// Errors produced while canonicalizing or hashing a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CanonError {
    #[error("non-finite number {0} has no canonical representation")]
    NonFiniteNumber(f64),

    #[error("number {0} has no canonical representation")]
    UnrepresentableNumber(String),

    #[error("value could not be converted to a structured value: {0}")]
    Serialization(String),

    #[error("unknown hash algorithm '{0}' (expected 'sha256' or 'sha3-256')")]
    UnknownAlgorithm(String),
}
