//! Resolution of the effective ledger settings from `hashlog.toml` and command-line flags.

use anyhow::{Context, Result};
use clap::Args;
use hl_ledger::{HashAlgorithm, LedgerConfig};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Configuration file (default: `hashlog.toml` in the working directory, if present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Content hash algorithm, overriding the configuration (sha256, sha3-256)
    #[arg(long, global = true, value_name = "NAME")]
    pub algorithm: Option<HashAlgorithm>,
}

/// Ledger location and algorithm after merging file and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub ledger_path: PathBuf,
    pub algorithm: HashAlgorithm,
}

impl Settings {
    /// Load configuration from the process working directory.
    pub fn resolve(global: &GlobalArgs, ledger: Option<PathBuf>) -> Result<Self> {
        let cwd = env::current_dir().context("failed to determine working directory")?;
        Self::resolve_in(&cwd, global, ledger)
    }

    /// Load configuration relative to `dir`; flags win over file values.
    ///
    /// A relative `ledger_path` is taken relative to the directory of the config file
    /// that supplied it, or to `dir` when the file was discovered or absent.
    pub fn resolve_in(dir: &Path, global: &GlobalArgs, ledger: Option<PathBuf>) -> Result<Self> {
        let (config, base) = match &global.config {
            Some(path) => {
                let config = LedgerConfig::load(path)?;
                let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
                (config, base)
            }
            None => (LedgerConfig::discover(dir)?, dir.to_path_buf()),
        };

        let ledger_path = match ledger {
            Some(path) => path,
            None if config.ledger_path.is_relative() => base.join(&config.ledger_path),
            None => config.ledger_path.clone(),
        };
        let algorithm = global.algorithm.unwrap_or(config.hash_algorithm);

        debug!(ledger = %ledger_path.display(), %algorithm, "resolved settings");
        Ok(Settings {
            ledger_path,
            algorithm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_config_file() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::resolve_in(dir.path(), &GlobalArgs::default(), None).unwrap();
        assert_eq!(settings.ledger_path, dir.path().join("ledger.jsonl"));
        assert_eq!(settings.algorithm, HashAlgorithm::Sha256);
    }

    #[test]
    fn test_discovered_file_applies() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("hashlog.toml"),
            "ledger_path = \"audit.jsonl\"\nhash_algorithm = \"sha3-256\"\n",
        )
        .unwrap();

        let settings = Settings::resolve_in(dir.path(), &GlobalArgs::default(), None).unwrap();
        assert_eq!(settings.ledger_path, dir.path().join("audit.jsonl"));
        assert_eq!(settings.algorithm, HashAlgorithm::Sha3_256);
    }

    #[test]
    fn test_flags_override_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("hashlog.toml"),
            "hash_algorithm = \"sha3-256\"\n",
        )
        .unwrap();
        let global = GlobalArgs {
            config: None,
            algorithm: Some(HashAlgorithm::Sha256),
        };

        let settings =
            Settings::resolve_in(dir.path(), &global, Some(PathBuf::from("other.jsonl"))).unwrap();
        assert_eq!(settings.ledger_path, PathBuf::from("other.jsonl"));
        assert_eq!(settings.algorithm, HashAlgorithm::Sha256);
    }

    #[test]
    fn test_explicit_config_anchors_relative_path() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("conf").join("ledger.toml");
        fs::create_dir_all(config.parent().unwrap()).unwrap();
        fs::write(&config, "ledger_path = \"data/ledger.jsonl\"\n").unwrap();
        let global = GlobalArgs {
            config: Some(config),
            algorithm: None,
        };

        let settings = Settings::resolve_in(Path::new("/unused"), &global, None).unwrap();
        assert_eq!(
            settings.ledger_path,
            dir.path().join("conf").join("data/ledger.jsonl")
        );
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let global = GlobalArgs {
            config: Some(PathBuf::from("/nonexistent/hashlog.toml")),
            algorithm: None,
        };
        assert!(Settings::resolve_in(Path::new("."), &global, None).is_err());
    }
}
