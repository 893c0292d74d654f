//! Error types and read snapshots for the policy store.

use airwave_core::{StoreError, ValidationResult};
use serde::Serialize;

use crate::schema::{AutonomyPolicy, PolicyConflict};

/// Errors returned by [`PolicyStore`](super::PolicyStore) operations.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// The document shape is invalid (blank ids, empty windows, duplicate shows).
    #[error("policy validation failed: {}", validation_summary(.0))]
    Validation(ValidationResult),

    /// The document is well-formed but its overrides contradict each other.
    #[error("policy has conflicts: {}", conflict_summary(.conflicts))]
    Conflicts { conflicts: Vec<PolicyConflict> },

    /// Reading or writing the backing files failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for policy store operations.
pub type Result<T> = std::result::Result<T, PolicyError>;

fn validation_summary(result: &ValidationResult) -> String {
    result.summary(5)
}

fn conflict_summary(conflicts: &[PolicyConflict]) -> String {
    let mut parts: Vec<String> = conflicts.iter().take(3).map(|c| c.message.clone()).collect();
    if conflicts.len() > 3 {
        parts.push(format!("(+{} more)", conflicts.len() - 3));
    }
    parts.join("; ")
}

/// Policy as seen by read paths that must not fail on conflicts.
#[derive(Debug, Clone, Serialize)]
pub struct PolicySnapshot {
    /// The stored policy, or the built-in defaults when `fallback` is set.
    pub policy: AutonomyPolicy,
    /// Conflicts found in the stored document.
    pub conflicts: Vec<PolicyConflict>,
    /// Whether the stored document was replaced by defaults for this read.
    pub fallback: bool,
}
