//! Recurrence specifications.

use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// How a schedule recurs: once, weekly via an RRULE subset, or via 5-field cron.
///
/// Tagged by `kind`; each variant carries only its own field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum ScheduleSpec {
    OneOff { run_at: String },
    Rrule { rrule: String },
    Cron { cron: String },
}

/// Discriminant of a [`ScheduleSpec`], carried on timeline blocks as a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecKind {
    OneOff,
    Rrule,
    Cron,
}

impl SpecKind {
    pub const ALL: [SpecKind; 3] = [SpecKind::OneOff, SpecKind::Rrule, SpecKind::Cron];

    pub fn as_str(self) -> &'static str {
        match self {
            SpecKind::OneOff => "one_off",
            SpecKind::Rrule => "rrule",
            SpecKind::Cron => "cron",
        }
    }

    /// The variant's payload key (`run_at`, `rrule` or `cron`).
    pub fn field(self) -> &'static str {
        match self {
            SpecKind::OneOff => "run_at",
            SpecKind::Rrule => "rrule",
            SpecKind::Cron => "cron",
        }
    }

    pub fn from_name(name: &str) -> Option<SpecKind> {
        SpecKind::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ScheduleSpec {
    pub fn kind(&self) -> SpecKind {
        match self {
            ScheduleSpec::OneOff { .. } => SpecKind::OneOff,
            ScheduleSpec::Rrule { .. } => SpecKind::Rrule,
            ScheduleSpec::Cron { .. } => SpecKind::Cron,
        }
    }

    /// The raw expression or timestamp.
    pub fn expression(&self) -> &str {
        match self {
            ScheduleSpec::OneOff { run_at } => run_at,
            ScheduleSpec::Rrule { rrule } => rrule,
            ScheduleSpec::Cron { cron } => cron,
        }
    }
}

impl fmt::Display for ScheduleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.expression())
    }
}

/// Wall-clock time of a one-off `run_at`.
///
/// Accepts an RFC 3339 instant (its local wall time as written is kept) or a
/// naive `YYYY-MM-DDTHH:MM[:SS]` value interpreted in the record's timezone.
pub fn parse_run_at(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}
