//! Schedule records, their runtime fields, and the persisted envelope.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::ScheduleSpec;

/// Current on-disk schema version of the schedule envelope.
pub const SCHEMA_VERSION: u32 = 2;

/// Priority given to records that do not specify one.
pub const DEFAULT_PRIORITY: u8 = 50;

/// Highest accepted priority.
pub const MAX_PRIORITY: u8 = 100;

/// Keys that make up [`RuntimeFields`], in serialization order.
pub const RUNTIME_FIELDS: [&str; 7] = [
    "timezone",
    "ui_state",
    "priority",
    "start_window",
    "end_window",
    "content_refs",
    "schedule_spec",
];

/// Editor-facing state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiState {
    Active,
    Paused,
    Draft,
}

impl UiState {
    pub fn as_str(self) -> &'static str {
        match self {
            UiState::Active => "active",
            UiState::Paused => "paused",
            UiState::Draft => "draft",
        }
    }

    /// State assumed for records that predate `ui_state`.
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled { UiState::Active } else { UiState::Paused }
    }
}

impl fmt::Display for UiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One end of a record's activity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowBound {
    pub value: DateTime<Utc>,
}

impl WindowBound {
    pub fn new(value: DateTime<Utc>) -> Self {
        Self { value }
    }

    /// `1970-01-01T00:00:00Z`, the start of the open default window.
    pub fn open_start() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// `9999-12-31T23:59:59Z`, the end of the open default window.
    pub fn open_end() -> Self {
        let value = Utc
            .with_ymd_and_hms(9999, 12, 31, 23, 59, 59)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(value)
    }
}

/// The seven fields a record must supply either at top level or in `overrides`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_state: Option<UiState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_window: Option<WindowBound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_window: Option<WindowBound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_refs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_spec: Option<ScheduleSpec>,
}

impl RuntimeFields {
    /// Names of the fields that are set, in [`RUNTIME_FIELDS`] order.
    pub fn present(&self) -> Vec<&'static str> {
        let flags = [
            self.timezone.is_some(),
            self.ui_state.is_some(),
            self.priority.is_some(),
            self.start_window.is_some(),
            self.end_window.is_some(),
            self.content_refs.is_some(),
            self.schedule_spec.is_some(),
        ];
        RUNTIME_FIELDS
            .iter()
            .zip(flags)
            .filter(|(_, set)| *set)
            .map(|(name, _)| *name)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present().is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.present().len() == RUNTIME_FIELDS.len()
    }
}

/// One programmed item: standalone, or a template reference plus overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub id: String,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_ref: Option<String>,
    #[serde(flatten)]
    pub runtime: RuntimeFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<RuntimeFields>,
}

fn default_enabled() -> bool {
    true
}

// Effective values: the top-level field, else the override.
impl ScheduleRecord {
    fn override_fields(&self) -> Option<&RuntimeFields> {
        self.overrides.as_ref()
    }

    pub fn is_template_based(&self) -> bool {
        self.template_ref.is_some()
    }

    pub fn effective_timezone(&self) -> Option<&str> {
        self.runtime
            .timezone
            .as_deref()
            .or_else(|| self.override_fields()?.timezone.as_deref())
    }

    pub fn effective_ui_state(&self) -> Option<UiState> {
        self.runtime
            .ui_state
            .or_else(|| self.override_fields()?.ui_state)
    }

    pub fn effective_priority(&self) -> Option<u8> {
        self.runtime
            .priority
            .or_else(|| self.override_fields()?.priority)
    }

    pub fn effective_start_window(&self) -> Option<WindowBound> {
        self.runtime
            .start_window
            .or_else(|| self.override_fields()?.start_window)
    }

    pub fn effective_end_window(&self) -> Option<WindowBound> {
        self.runtime
            .end_window
            .or_else(|| self.override_fields()?.end_window)
    }

    pub fn effective_schedule_spec(&self) -> Option<&ScheduleSpec> {
        self.runtime
            .schedule_spec
            .as_ref()
            .or_else(|| self.override_fields()?.schedule_spec.as_ref())
    }

    /// Effective window with missing bounds treated as the open default.
    pub fn effective_window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.effective_start_window()
                .unwrap_or_else(WindowBound::open_start)
                .value,
            self.effective_end_window()
                .unwrap_or_else(WindowBound::open_end)
                .value,
        )
    }

    /// Runtime fields present both at top level and in `overrides`.
    pub fn ambiguous_fields(&self) -> Vec<&'static str> {
        let Some(overrides) = &self.overrides else {
            return Vec::new();
        };
        let over = overrides.present();
        self.runtime
            .present()
            .into_iter()
            .filter(|f| over.contains(f))
            .collect()
    }

    /// Enabled and in the `active` editor state.
    pub fn is_dispatchable(&self) -> bool {
        self.enabled && self.effective_ui_state() == Some(UiState::Active)
    }
}

/// Persisted schedule document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEnvelope {
    pub schema_version: u32,
    pub schedules: Vec<ScheduleRecord>,
}

impl ScheduleEnvelope {
    pub fn new(schedules: Vec<ScheduleRecord>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            schedules,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}
