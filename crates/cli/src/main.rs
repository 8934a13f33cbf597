//! Ceremony key and metadata audit.

mod config;

use anyhow::{Context, Result};
use ceremony_core::{AuditConfig, AuditSummary};
use ceremony_keys::{KeyRegistryBuilder, X509ChainVerifier};
use ceremony_metadata::{FileSystemStore, MetadataAuditor, RepositoryStore};
use ceremony_storage::{ArtifactSource, FilesystemArtifactSource};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Verify ceremony key products against the root CA and audit signed metadata
#[derive(Parser, Debug)]
#[command(name = "ceremony-verify")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "CEREMONY_CONFIG")]
    config: Option<PathBuf>,

    /// Root CA certificate (PEM)
    #[arg(long, value_parser = existing_file)]
    root: PathBuf,

    /// Directory of key products, one subdirectory per device serial number
    #[arg(long)]
    key_directory: Option<PathBuf>,

    /// Signed metadata repository to audit; an empty value skips the audit
    #[arg(long, value_parser = any_path)]
    repository: Option<PathBuf>,

    /// Maximum number of roles audited at once
    #[arg(long)]
    concurrency: Option<usize>,
}

fn existing_file(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("file not found: {value}"))
    }
}

/// Accepts any path, including an empty one.
fn any_path(value: &str) -> Result<PathBuf, String> {
    Ok(PathBuf::from(value))
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = config::load(&args);
    init_tracing(
        config
            .as_ref()
            .map(|c| c.log_filter.as_str())
            .unwrap_or("info"),
    );

    let result = match config {
        Ok(config) => run(&config).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &AuditConfig) -> Result<()> {
    let root_pem = std::fs::read(&config.root).with_context(|| {
        format!(
            "failed to read root CA certificate {}",
            config.root.display()
        )
    })?;
    let verifier =
        X509ChainVerifier::from_pem(&root_pem).context("failed to load root CA certificate")?;
    info!(subject = %verifier.root_subject(), "loaded root CA certificate");

    let source = FilesystemArtifactSource::new(&config.key_directory);
    let registry = KeyRegistryBuilder::new(&verifier)
        .build(&source)
        .with_context(|| format!("key verification failed in {}", source.describe()))?;
    info!(keys = registry.len(), "verified {} ceremony keys", registry.len());

    let Some(repository) = config.repository() else {
        info!("no repository configured, skipping metadata audit");
        return Ok(());
    };

    let store: Arc<dyn RepositoryStore> = Arc::new(FileSystemStore::new(repository));
    let (auditor, roles) = MetadataAuditor::from_store(store).with_context(|| {
        format!(
            "failed to load root metadata from {}",
            repository.display()
        )
    })?;
    let results = auditor
        .with_concurrency(config.audit_concurrency)
        .audit(&roles)
        .await;

    let summary = AuditSummary::from_results(&results);
    info!(
        keys = registry.len(),
        "audited {} roles: {} complete, {} partial, {} failed",
        summary.total(),
        summary.complete,
        summary.partial,
        summary.failed
    );
    Ok(())
}
