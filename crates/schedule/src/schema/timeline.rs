//! Weekly timeline projection types.

use airwave_core::time::MINUTES_PER_DAY;
use airwave_core::{ClockTime, DayOfWeek};
use serde::{Deserialize, Serialize};

use super::SpecKind;

/// A schedule's recurrence projected onto one representative week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBlock {
    pub schedule_id: String,
    pub day_of_week: DayOfWeek,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    /// The block continues past midnight into the next day.
    pub overnight: bool,
    pub mode_hint: SpecKind,
}

/// Minute interval `[start, end)` on one day, the unit of overlap checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DaySegment {
    pub day: DayOfWeek,
    pub start: u16,
    pub end: u16,
}

impl DaySegment {
    pub fn overlaps(&self, other: &DaySegment) -> bool {
        self.day == other.day && self.start < other.end && other.start < self.end
    }

    /// `HH:MM-HH:MM`, with a segment ending at midnight shown as `24:00`.
    pub fn label(&self) -> String {
        format!("{}-{}", minute_label(self.start), minute_label(self.end))
    }
}

fn minute_label(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

impl TimelineBlock {
    /// Occupied minutes, split at midnight.
    ///
    /// Overnight blocks yield `[start, 24:00)` on their own day and
    /// `[00:00, end)` on the next. One-off and cron blocks are points and
    /// occupy their start minute.
    pub fn segments(&self) -> Vec<DaySegment> {
        let start = self.start_time.minutes();
        let end = self.end_time.minutes();
        let day_end = MINUTES_PER_DAY;

        if self.overnight {
            let mut out = vec![DaySegment { day: self.day_of_week, start, end: day_end }];
            if end > 0 {
                out.push(DaySegment { day: self.day_of_week.next(), start: 0, end });
            }
            return out;
        }

        let end = if self.mode_hint != SpecKind::Rrule && end == start {
            start + 1
        } else if end > start {
            end
        } else {
            // Ends exactly at midnight.
            day_end
        };
        vec![DaySegment { day: self.day_of_week, start, end }]
    }
}

/// A record whose spec could not be placed on the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSpec {
    pub schedule_id: String,
    pub reason: String,
}

/// Projection of a whole record set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub blocks: Vec<TimelineBlock>,
    pub skipped: Vec<SkippedSpec>,
}
