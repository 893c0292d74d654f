//! Policy conflict report types.

use std::fmt;

use airwave_core::DayOfWeek;
use serde::{Deserialize, Serialize};

/// Kind of contradiction found among overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyConflictKind {
    DuplicateTimeslotOverrideId,
    OverlappingTimeslotOverrides,
    ShowTimeslotIntentConflict,
}

/// A semantically contradictory pair (or group) of overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConflict {
    pub kind: PolicyConflictKind,
    pub override_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<DayOfWeek>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_id: Option<String>,
    pub message: String,
    pub suggested_resolution: String,
}

impl fmt::Display for PolicyConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
