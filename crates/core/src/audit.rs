//! Per-role signature audit results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of auditing one role's signatures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Threshold met and every counted signature is valid.
    Success,
    /// Fewer valid signatures than required; expected while signatures are collected.
    PartialThreshold { actual: u32, required: u32 },
    /// Verification failed for any other reason.
    Error { detail: String },
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success! signatures valid and threshold achieved"),
            Self::PartialThreshold { actual, required } => {
                write!(f, "contains {actual}/{required} valid signatures")
            }
            Self::Error { detail } => write!(f, "error verifying: {detail}"),
        }
    }
}

/// The audit result for a single role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureAuditResult {
    pub role_name: String,
    pub outcome: AuditOutcome,
}

impl SignatureAuditResult {
    pub fn success(role_name: impl Into<String>) -> Self {
        Self {
            role_name: role_name.into(),
            outcome: AuditOutcome::Success,
        }
    }

    pub fn partial(role_name: impl Into<String>, actual: u32, required: u32) -> Self {
        Self {
            role_name: role_name.into(),
            outcome: AuditOutcome::PartialThreshold { actual, required },
        }
    }

    pub fn error(role_name: impl Into<String>, detail: impl fmt::Display) -> Self {
        Self {
            role_name: role_name.into(),
            outcome: AuditOutcome::Error {
                detail: detail.to_string(),
            },
        }
    }
}

/// Counts of each outcome across an audit run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub complete: usize,
    pub partial: usize,
    pub failed: usize,
}

impl AuditSummary {
    /// Tally a set of results.
    pub fn from_results(results: &[SignatureAuditResult]) -> Self {
        results
            .iter()
            .fold(Self::default(), |mut summary, result| {
                match result.outcome {
                    AuditOutcome::Success => summary.complete += 1,
                    AuditOutcome::PartialThreshold { .. } => summary.partial += 1,
                    AuditOutcome::Error { .. } => summary.failed += 1,
                }
                summary
            })
    }

    /// Total number of roles audited.
    pub fn total(&self) -> usize {
        self.complete + self.partial + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_display() {
        assert_eq!(
            AuditOutcome::PartialThreshold {
                actual: 1,
                required: 2
            }
            .to_string(),
            "contains 1/2 valid signatures"
        );
        assert_eq!(
            SignatureAuditResult::error("targets", "bad sig")
                .outcome
                .to_string(),
            "error verifying: bad sig"
        );
    }

    #[test]
    fn test_summary() {
        let results = vec![
            SignatureAuditResult::success("root"),
            SignatureAuditResult::partial("targets", 1, 2),
            SignatureAuditResult::success("snapshot"),
            SignatureAuditResult::error("timestamp", "missing"),
        ];
        let summary = AuditSummary::from_results(&results);
        assert_eq!(
            summary,
            AuditSummary {
                complete: 2,
                partial: 1,
                failed: 1
            }
        );
        assert_eq!(summary.total(), 4);
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let json = serde_json::to_value(AuditOutcome::PartialThreshold {
            actual: 2,
            required: 3,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "partial_threshold", "actual": 2, "required": 3})
        );
    }
}
