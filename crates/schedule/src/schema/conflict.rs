//! Schedule conflict report types.

use std::fmt;

use airwave_core::DayOfWeek;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleConflictKind {
    DuplicateId,
    DuplicateName,
    InvalidWindow,
    Overlap,
    TemplateAmbiguity,
    AmbiguousDispatch,
}

impl ScheduleConflictKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleConflictKind::DuplicateId => "duplicate_id",
            ScheduleConflictKind::DuplicateName => "duplicate_name",
            ScheduleConflictKind::InvalidWindow => "invalid_window",
            ScheduleConflictKind::Overlap => "overlap",
            ScheduleConflictKind::TemplateAmbiguity => "template_ambiguity",
            ScheduleConflictKind::AmbiguousDispatch => "ambiguous_dispatch",
        }
    }

    /// Hard kinds block saving and publishing.
    pub fn is_hard(self) -> bool {
        matches!(
            self,
            ScheduleConflictKind::DuplicateId
                | ScheduleConflictKind::DuplicateName
                | ScheduleConflictKind::InvalidWindow
                | ScheduleConflictKind::Overlap
                | ScheduleConflictKind::TemplateAmbiguity
                | ScheduleConflictKind::AmbiguousDispatch
        )
    }
}

impl fmt::Display for ScheduleConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An actionable fix offered alongside a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictSuggestion {
    /// Machine-readable action, e.g. `"raise_priority"`.
    pub action: String,
    pub message: String,
}

impl ConflictSuggestion {
    pub fn new(action: &str, message: impl Into<String>) -> Self {
        Self {
            action: action.to_string(),
            message: message.into(),
        }
    }
}

/// Two or more records that cannot coexist as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConflict {
    pub kind: ScheduleConflictKind,
    pub schedule_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<DayOfWeek>,
    pub message: String,
    pub suggestions: Vec<ConflictSuggestion>,
}

impl ScheduleConflict {
    pub fn is_hard(&self) -> bool {
        self.kind.is_hard()
    }
}

impl fmt::Display for ScheduleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
