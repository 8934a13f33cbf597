//! Audit run configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Key products directory used by the 2021-05-03 ceremony layout.
pub const DEFAULT_KEY_DIRECTORY: &str = "../../../ceremony/2021-05-03/keys";

/// Default number of roles audited concurrently.
pub const DEFAULT_AUDIT_CONCURRENCY: usize = 4;

/// Upper bound on concurrently audited roles.
pub const MAX_AUDIT_CONCURRENCY: usize = 64;

/// Configuration for one audit run.
///
/// Built once at startup and passed by reference afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditConfig {
    /// PEM-encoded root CA certificate anchoring every device chain.
    #[serde(default)]
    pub root: PathBuf,
    /// Directory holding one subdirectory per device serial number.
    #[serde(default = "default_key_directory")]
    pub key_directory: PathBuf,
    /// Signed metadata repository. The metadata audit is skipped when unset.
    #[serde(default)]
    pub repository: Option<PathBuf>,
    /// Maximum number of roles verified concurrently.
    #[serde(default = "default_audit_concurrency")]
    pub audit_concurrency: usize,
    /// Log filter directive used when RUST_LOG is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_key_directory() -> PathBuf {
    PathBuf::from(DEFAULT_KEY_DIRECTORY)
}

fn default_audit_concurrency() -> usize {
    DEFAULT_AUDIT_CONCURRENCY
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            key_directory: default_key_directory(),
            repository: None,
            audit_concurrency: default_audit_concurrency(),
            log_filter: default_log_filter(),
        }
    }
}

impl AuditConfig {
    /// Repository path, treating an empty path as unset.
    pub fn repository(&self) -> Option<&PathBuf> {
        self.repository
            .as_ref()
            .filter(|path| !path.as_os_str().is_empty())
    }

    /// Check that every configured path exists before verification starts.
    pub fn validate(&self) -> Result<()> {
        if self.root.as_os_str().is_empty() {
            return Err(Error::Config(
                "root CA certificate path must be specified".to_string(),
            ));
        }
        if !self.root.is_file() {
            return Err(Error::Config(format!(
                "root CA certificate not found: {}",
                self.root.display()
            )));
        }
        if !self.key_directory.is_dir() {
            return Err(Error::Config(format!(
                "key directory not found: {}",
                self.key_directory.display()
            )));
        }
        if let Some(repository) = self.repository()
            && !repository.is_dir()
        {
            return Err(Error::Config(format!(
                "repository directory not found: {}",
                repository.display()
            )));
        }
        if self.audit_concurrency == 0 || self.audit_concurrency > MAX_AUDIT_CONCURRENCY {
            return Err(Error::Config(format!(
                "audit_concurrency must be between 1 and {MAX_AUDIT_CONCURRENCY}, got {}",
                self.audit_concurrency
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn valid_config() -> (tempfile::TempDir, AuditConfig) {
        let temp = tempdir().unwrap();
        let root = temp.path().join("root.pem");
        std::fs::write(&root, "pem").unwrap();
        let keys = temp.path().join("keys");
        std::fs::create_dir(&keys).unwrap();
        let config = AuditConfig {
            root,
            key_directory: keys,
            ..AuditConfig::default()
        };
        (temp, config)
    }

    #[test]
    fn test_defaults() {
        let config: AuditConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.key_directory, PathBuf::from(DEFAULT_KEY_DIRECTORY));
        assert_eq!(config.audit_concurrency, DEFAULT_AUDIT_CONCURRENCY);
        assert_eq!(config.log_filter, "info");
        assert!(config.repository().is_none());
    }

    #[test]
    fn test_validate_ok() {
        let (_temp, config) = valid_config();
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_missing_root() {
        let (_temp, mut config) = valid_config();
        config.root = PathBuf::new();
        let err = config.validate().unwrap_err();
        assert!(matches!(&err, Error::Config(msg) if msg.contains("must be specified")));

        config.root = PathBuf::from("/nonexistent/root.pem");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_validate_missing_key_directory() {
        let (temp, mut config) = valid_config();
        config.key_directory = temp.path().join("absent");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("key directory"));
    }

    #[test]
    fn test_empty_repository_is_unset() {
        let (_temp, mut config) = valid_config();
        config.repository = Some(PathBuf::new());
        assert!(config.repository().is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_missing_repository() {
        let (temp, mut config) = valid_config();
        config.repository = Some(temp.path().join("repo"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("repository"));
    }

    #[test]
    fn test_validate_concurrency_bounds() {
        let (_temp, mut config) = valid_config();
        config.audit_concurrency = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        config.audit_concurrency = MAX_AUDIT_CONCURRENCY + 1;
        assert!(config.validate().is_err());
    }
}
