//! Ledger configuration loaded from `hashlog.toml`.
//!
//! ```toml
//! ledger_path = "ledger.jsonl"
//! hash_algorithm = "sha256"
//! canonical_encoding = "json-sorted-v1"
//! ```

use hl_canon::{HashAlgorithm, ENCODING_NAME};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory when no path is given.
pub const CONFIG_FILE_NAME: &str = "hashlog.toml";

/// Ledger location and chain parameters.
///
/// Every key is optional; missing keys take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Path of the JSONL ledger (default: `ledger.jsonl`)
    pub ledger_path: PathBuf,
    /// Digest used for content hashes (default: `sha256`)
    pub hash_algorithm: HashAlgorithm,
    /// Name of the canonical encoding; only `json-sorted-v1` exists
    pub canonical_encoding: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            ledger_path: PathBuf::from("ledger.jsonl"),
            hash_algorithm: HashAlgorithm::default(),
            canonical_encoding: ENCODING_NAME.to_string(),
        }
    }
}

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("unsupported canonical encoding '{0}' (expected 'json-sorted-v1')")]
    UnsupportedEncoding(String),
}

impl LedgerConfig {
    /// Parse configuration text. `origin` only labels errors.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: LedgerConfig = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Load `hashlog.toml` from `dir` if present, otherwise return the defaults.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let candidate = dir.as_ref().join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(candidate)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.canonical_encoding != ENCODING_NAME {
            return Err(ConfigError::UnsupportedEncoding(
                self.canonical_encoding.clone(),
            ));
        }
        Ok(())
    }
}
