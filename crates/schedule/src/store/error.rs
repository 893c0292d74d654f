//! Error types and read/write results for the schedule store.

use std::path::PathBuf;

use airwave_core::{StoreError, ValidationResult};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::schema::{ScheduleConflict, ScheduleEnvelope, ScheduleRecord, SkippedSpec, TimelineBlock};

/// Errors returned by [`ScheduleStore`](super::ScheduleStore) operations.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// Records are malformed or incomplete.
    #[error("schedule validation failed: {}", validation_summary(.0))]
    Validation(ValidationResult),

    /// Records are well-formed but contradict each other; the write was refused.
    #[error("{message}")]
    Conflicts {
        message: String,
        conflicts: Vec<ScheduleConflict>,
    },

    /// The stored document cannot be parsed or migrated.
    #[error("stored schedules at {} are corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

impl ScheduleError {
    /// Refusal for `conflicts`, with the first three messages in the summary.
    pub(crate) fn rejected(conflicts: Vec<ScheduleConflict>) -> Self {
        let shown: Vec<&str> = conflicts.iter().take(3).map(|c| c.message.as_str()).collect();
        let mut message = format!(
            "Cannot save/publish schedules due to conflicts: {}",
            shown.join("; ")
        );
        if conflicts.len() > 3 {
            message.push_str(&format!(" (+{} more)", conflicts.len() - 3));
        }
        ScheduleError::Conflicts { message, conflicts }
    }
}

fn validation_summary(result: &ValidationResult) -> String {
    result.summary(5)
}

/// Everything the schedule editor shows: the document, its weekly projection
/// and any conflicts. Reading never fails because of conflicts.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleUiState {
    pub envelope: ScheduleEnvelope,
    pub timeline: Vec<TimelineBlock>,
    pub skipped: Vec<SkippedSpec>,
    pub conflicts: Vec<ScheduleConflict>,
}

/// Dry-run result of checking a record set.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleValidation {
    /// No shape errors and no hard conflicts.
    pub valid: bool,
    pub validation: ValidationResult,
    pub conflicts: Vec<ScheduleConflict>,
    pub timeline: Vec<TimelineBlock>,
    pub skipped: Vec<SkippedSpec>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishSummary {
    pub published_count: usize,
    pub published_at: DateTime<Utc>,
    pub envelope: ScheduleEnvelope,
}

/// Records expanded from a template, with the conflicts they would raise
/// against the stored schedules.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateApplication {
    pub records: Vec<ScheduleRecord>,
    pub conflicts: Vec<ScheduleConflict>,
}
