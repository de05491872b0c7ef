//! Content digests over canonical bytes.

use crate::encode::to_canonical_bytes;
use crate::error::CanonError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use sha3::{Digest, Sha3_256};
use std::fmt;
use std::str::FromStr;

/// Length of a rendered digest in hex characters.
pub const DIGEST_HEX_LEN: usize = 64;

/// The 256-bit digest used to derive content hashes.
///
/// Producer and verifier of a ledger must agree on this; it is a ledger-wide setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[default]
    #[serde(rename = "sha256")]
    Sha256,
    #[serde(rename = "sha3-256")]
    Sha3_256,
}

impl HashAlgorithm {
    /// Configuration name of the algorithm.
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha3_256 => "sha3-256",
        }
    }

    /// Digest raw bytes and render the result as lowercase hex.
    pub fn digest_hex(&self, bytes: &[u8]) -> String {
        match self {
            HashAlgorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
            HashAlgorithm::Sha3_256 => hex::encode(Sha3_256::digest(bytes)),
        }
    }

    /// Canonically encode a value, then digest the encoding.
    pub fn hash_value(&self, value: &Value) -> Result<String, CanonError> {
        let bytes = to_canonical_bytes(value)?;
        Ok(self.digest_hex(&bytes))
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = CanonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "sha3-256" | "sha3_256" => Ok(HashAlgorithm::Sha3_256),
            other => Err(CanonError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Whether `s` is a rendered digest: exactly 64 lowercase hex characters.
pub fn is_digest_hex(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
