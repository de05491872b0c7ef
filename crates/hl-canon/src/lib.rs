//! Canonical encoding and content hashing for hashlog entries.
//!
//! Every hash in a ledger is a digest over the `json-sorted-v1` encoding of a structured
//! value. Builder and verifier both go through [`HashAlgorithm::hash_value`], so they
//! agree byte-for-byte.
//!
//! # Example
//!
//! ```
//! use hl_canon::{to_canonical_string, HashAlgorithm};
//! use serde_json::json;
//!
//! let value = json!({"type": "a", "count": 2});
//! assert_eq!(to_canonical_string(&value).unwrap(), r#"{"count": 2, "type": "a"}"#);
//!
//! let hash = HashAlgorithm::Sha256.hash_value(&value).unwrap();
//! assert_eq!(hash.len(), 64);
//! ```

mod digest;
mod encode;
mod error;
mod finite;

pub use digest::{is_digest_hex, HashAlgorithm, DIGEST_HEX_LEN};
pub use encode::{
    format_float, to_canonical_bytes, to_canonical_string, to_structured, ENCODING_NAME,
};
pub use error::CanonError;
