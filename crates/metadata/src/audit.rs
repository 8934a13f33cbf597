//! Per-role signature audit of a metadata repository.

use crate::error::MetadataResult;
use crate::store::RepositoryStore;
use crate::verify::{KeyDb, ThresholdError, ThresholdSignatureVerifier};
use ceremony_core::config::DEFAULT_AUDIT_CONCURRENCY;
use ceremony_core::{AuditOutcome, RoleDescriptor, SignatureAuditResult};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Audits each role's document against its threshold.
///
/// Roles are independent: a failure in one is recorded as that role's
/// outcome and the others are still audited.
pub struct MetadataAuditor {
    store: Arc<dyn RepositoryStore>,
    verifier: Arc<dyn ThresholdSignatureVerifier>,
    concurrency: usize,
}

impl MetadataAuditor {
    pub fn new(
        store: Arc<dyn RepositoryStore>,
        verifier: Arc<dyn ThresholdSignatureVerifier>,
    ) -> Self {
        Self {
            store,
            verifier,
            concurrency: DEFAULT_AUDIT_CONCURRENCY,
        }
    }

    /// Bound the number of roles audited at once (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Load root metadata from `store` and build an auditor for its roles.
    ///
    /// Failure to read or validate root metadata is fatal; it is the only
    /// error this type returns.
    pub fn from_store(
        store: Arc<dyn RepositoryStore>,
    ) -> MetadataResult<(Self, Vec<RoleDescriptor>)> {
        let (_, root) = store.root()?;
        let roles = root.role_descriptors()?;
        let key_db = KeyDb::from_root(&root)?;
        debug!(
            repository = %store.describe(),
            roles = roles.len(),
            keys = key_db.len(),
            "loaded root metadata"
        );
        Ok((Self::new(store, Arc::new(key_db)), roles))
    }

    /// Audit one role synchronously.
    pub fn audit_role(&self, role: &RoleDescriptor) -> SignatureAuditResult {
        audit_one(self.store.as_ref(), self.verifier.as_ref(), role)
    }

    /// Audit every role, returning results in the order given.
    pub async fn audit(&self, roles: &[RoleDescriptor]) -> Vec<SignatureAuditResult> {
        let results: Vec<SignatureAuditResult> = stream::iter(roles.iter().cloned())
            .map(|role| {
                let store = Arc::clone(&self.store);
                let verifier = Arc::clone(&self.verifier);
                async move {
                    let name = role.name.clone();
                    tokio::task::spawn_blocking(move || {
                        audit_one(store.as_ref(), verifier.as_ref(), &role)
                    })
                    .await
                    .unwrap_or_else(|e| {
                        SignatureAuditResult::error(name, format!("spawn_blocking failed: {e}"))
                    })
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        for result in &results {
            log_result(result);
        }
        results
    }
}

fn audit_one(
    store: &dyn RepositoryStore,
    verifier: &dyn ThresholdSignatureVerifier,
    role: &RoleDescriptor,
) -> SignatureAuditResult {
    let document = match store.signed_meta(&role.file_name()) {
        Ok(document) => document,
        Err(err) => return SignatureAuditResult::error(&role.name, err),
    };

    match verifier.verify_role(role, &document) {
        Ok(()) => SignatureAuditResult::success(&role.name),
        Err(ThresholdError::RoleThreshold { actual, required }) => {
            SignatureAuditResult::partial(&role.name, actual, required)
        }
        Err(err) => SignatureAuditResult::error(&role.name, err),
    }
}

fn log_result(result: &SignatureAuditResult) {
    let role = result.role_name.as_str();
    info!(role = %role, "verifying {role}...");
    match &result.outcome {
        AuditOutcome::Success => info!(role = %role, "{}", result.outcome),
        AuditOutcome::PartialThreshold { .. } => warn!(role = %role, "{}", result.outcome),
        AuditOutcome::Error { .. } => error!(role = %role, "{}", result.outcome),
    }
}
