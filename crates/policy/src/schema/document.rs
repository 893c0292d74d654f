//! The persisted autonomy policy document.

use airwave_core::time::MINUTES_PER_DAY;
use airwave_core::{ClockTime, DayOfWeek};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AutonomyMode, ModePermissions, PermissionMatrix};

/// Station-wide autonomy policy: default mode, per-mode permissions and overrides.
///
/// Mutated only by replacing the whole document through the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutonomyPolicy {
    pub station_default_mode: AutonomyMode,
    pub mode_permissions: ModePermissions,
    #[serde(default)]
    pub show_overrides: Vec<ShowOverride>,
    #[serde(default)]
    pub timeslot_overrides: Vec<TimeslotOverride>,
    /// Restamped on every save, so submitted documents may leave it out.
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl AutonomyPolicy {
    /// Built-in defaults: `assisted` station-wide, no overrides.
    pub fn defaults() -> Self {
        Self {
            station_default_mode: AutonomyMode::Assisted,
            mode_permissions: ModePermissions::default(),
            show_overrides: Vec::new(),
            timeslot_overrides: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn show_override(&self, show_id: &str) -> Option<&ShowOverride> {
        self.show_overrides.iter().find(|o| o.show_id == show_id)
    }

    pub fn timeslot_override(&self, id: &str) -> Option<&TimeslotOverride> {
        self.timeslot_overrides.iter().find(|o| o.id == id)
    }

    /// The mode's matrix as defined by this document.
    pub fn mode_matrix(&self, mode: AutonomyMode) -> &PermissionMatrix {
        self.mode_permissions.get(mode)
    }
}

/// Policy exception scoped to one show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShowOverride {
    pub show_id: String,
    pub mode: AutonomyMode,
    /// Explicit matrix; when absent the mode's matrix applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionMatrix>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Policy exception scoped to a weekly time window, optionally for one show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeslotOverride {
    pub id: String,
    pub day_of_week: DayOfWeek,
    pub start_time: ClockTime,
    /// `00:00` closes the window at the end of the day.
    pub end_time: ClockTime,
    /// `None` applies station-wide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_id: Option<String>,
    pub mode: AutonomyMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionMatrix>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TimeslotOverride {
    pub fn start_minute(&self) -> u16 {
        self.start_time.minutes()
    }

    /// Minute of day the window closes, `1440` for an `00:00` end.
    pub fn end_minute(&self) -> u16 {
        match self.end_time.minutes() {
            0 => MINUTES_PER_DAY,
            m => m,
        }
    }

    pub fn time_range(&self) -> String {
        format!("{}-{}", self.start_time, self.end_time)
    }
}

/// Common view over the two override kinds for matrix resolution.
pub trait OverrideScope {
    fn mode(&self) -> AutonomyMode;
    fn explicit_permissions(&self) -> Option<&PermissionMatrix>;

    /// Explicit matrix, else the mode's matrix from `policy`.
    fn effective_permissions(&self, policy: &AutonomyPolicy) -> PermissionMatrix {
        self.explicit_permissions()
            .copied()
            .unwrap_or_else(|| *policy.mode_matrix(self.mode()))
    }
}

impl OverrideScope for ShowOverride {
    fn mode(&self) -> AutonomyMode {
        self.mode
    }

    fn explicit_permissions(&self) -> Option<&PermissionMatrix> {
        self.permissions.as_ref()
    }
}

impl OverrideScope for TimeslotOverride {
    fn mode(&self) -> AutonomyMode {
        self.mode
    }

    fn explicit_permissions(&self) -> Option<&PermissionMatrix> {
        self.permissions.as_ref()
    }
}
