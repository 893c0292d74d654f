//! Built-in weekly templates expanded into template-referencing records.

use std::fmt;
use std::str::FromStr;

use airwave_core::{ClockTime, DayOfWeek};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::recurrence::to_rrule;
use crate::schema::{
    RuntimeFields, ScheduleRecord, ScheduleSpec, UiState, WindowBound, DEFAULT_PRIORITY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// Monday to Friday, 06:00 for four hours.
    Weekday,
    /// Saturday and Sunday, 08:00 for six hours.
    Weekend,
    /// Every day, 22:00 for eight hours into the next morning.
    Overnight,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 3] = [TemplateKind::Weekday, TemplateKind::Weekend, TemplateKind::Overnight];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKind::Weekday => "weekday",
            TemplateKind::Weekend => "weekend",
            TemplateKind::Overnight => "overnight",
        }
    }

    fn label(self) -> &'static str {
        match self {
            TemplateKind::Weekday => "Weekday",
            TemplateKind::Weekend => "Weekend",
            TemplateKind::Overnight => "Overnight",
        }
    }

    pub fn days(self) -> &'static [DayOfWeek] {
        use DayOfWeek::*;
        match self {
            TemplateKind::Weekday => &[Monday, Tuesday, Wednesday, Thursday, Friday],
            TemplateKind::Weekend => &[Saturday, Sunday],
            TemplateKind::Overnight => &DayOfWeek::ALL,
        }
    }

    pub fn start(self) -> ClockTime {
        let hour = match self {
            TemplateKind::Weekday => 6,
            TemplateKind::Weekend => 8,
            TemplateKind::Overnight => 22,
        };
        ClockTime::from_minutes_wrapping(hour * 60)
    }

    pub fn duration_minutes(self) -> u32 {
        match self {
            TemplateKind::Weekday => 240,
            TemplateKind::Weekend => 360,
            TemplateKind::Overnight => 480,
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        TemplateKind::ALL
            .into_iter()
            .find(|k| k.as_str() == name)
            .ok_or_else(|| format!("unknown template '{s}', expected weekday, weekend or overnight"))
    }
}

/// Parameters for [`expand_template`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRequest {
    pub kind: TemplateKind,
    pub timezone: String,
    #[serde(default)]
    pub content_refs: Vec<String>,
    /// Defaults to the open window start.
    #[serde(default)]
    pub start_window: Option<WindowBound>,
    /// Defaults to the open window end.
    #[serde(default)]
    pub end_window: Option<WindowBound>,
}

/// One record per template day, each carrying its runtime fields in `overrides`.
pub fn expand_template(request: &TemplateRequest) -> Vec<ScheduleRecord> {
    let kind = request.kind;
    let start = kind.start();
    kind.days()
        .iter()
        .map(|&day| {
            let suffix = Uuid::new_v4().simple().to_string();
            ScheduleRecord {
                id: format!(
                    "{}-{}-{:02}{:02}-{}",
                    kind,
                    day.rrule_code().to_ascii_lowercase(),
                    start.hour(),
                    start.minute(),
                    &suffix[..8]
                ),
                name: format!("{} {} {}", kind.label(), day.short_label(), start),
                enabled: true,
                template_ref: Some(kind.as_str().to_string()),
                runtime: RuntimeFields::default(),
                overrides: Some(RuntimeFields {
                    timezone: Some(request.timezone.clone()),
                    ui_state: Some(UiState::Active),
                    priority: Some(DEFAULT_PRIORITY),
                    start_window: Some(request.start_window.unwrap_or_else(WindowBound::open_start)),
                    end_window: Some(request.end_window.unwrap_or_else(WindowBound::open_end)),
                    content_refs: Some(request.content_refs.clone()),
                    schedule_spec: Some(ScheduleSpec::Rrule {
                        rrule: to_rrule(day, start, Some(kind.duration_minutes())),
                    }),
                }),
            }
        })
        .collect()
}
