//! Layered configuration loading.

use crate::Args;
use anyhow::{Context, Result};
use ceremony_core::AuditConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::Serialize;
use std::path::PathBuf;

/// Command-line values that take precedence over every other source.
#[derive(Debug, Serialize)]
struct Overrides {
    root: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_directory: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repository: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audit_concurrency: Option<usize>,
}

impl From<&Args> for Overrides {
    fn from(args: &Args) -> Self {
        Self {
            root: args.root.clone(),
            key_directory: args.key_directory.clone(),
            repository: args.repository.clone(),
            audit_concurrency: args.concurrency,
        }
    }
}

/// Merge defaults, the optional config file, `CEREMONY_` environment
/// variables and command-line flags, then validate the result.
pub fn load(args: &Args) -> Result<AuditConfig> {
    let mut figment = Figment::from(Serialized::defaults(AuditConfig::default()));

    if let Some(path) = &args.config {
        if !path.is_file() {
            anyhow::bail!("config file not found: {}", path.display());
        }
        figment = figment.merge(Toml::file(path));
    }

    let config: AuditConfig = figment
        .merge(Env::prefixed("CEREMONY_").split("__"))
        .merge(Serialized::globals(Overrides::from(args)))
        .extract()
        .context("failed to load configuration")?;

    config.validate().context("invalid configuration")?;
    Ok(config)
}
