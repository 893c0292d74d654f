//! Projection of recurrence specs onto a weekly timeline, and the inverse.
//!
//! One-off and cron specs become zero-length points; weekly RRULEs become
//! blocks of `DURATION_MINUTES` that may run past midnight. Specs that cannot
//! be projected are reported and skipped, never fatal.

mod cron;
mod rrule;

#[cfg(test)]
mod tests;

use chrono::{Datelike, Timelike};
use tracing::warn;

use airwave_core::time::MINUTES_PER_DAY;
use airwave_core::{ClockTime, DayOfWeek};

use crate::schema::{
    parse_run_at, ScheduleRecord, ScheduleSpec, SkippedSpec, Timeline, TimelineBlock,
};

pub use self::cron::{cron_point, parse_cron_day, to_cron, CronPoint};
pub(crate) use self::cron::parse_schedule;
pub use self::rrule::{
    parse_weekly_rrule, to_rrule, WeeklyRule, DEFAULT_DURATION_MINUTES, MAX_DURATION_MINUTES,
};

/// Project one spec into its weekly blocks.
pub fn project_spec(schedule_id: &str, spec: &ScheduleSpec) -> Result<Vec<TimelineBlock>, String> {
    let block = |day: DayOfWeek, start: ClockTime, end: ClockTime, overnight: bool| TimelineBlock {
        schedule_id: schedule_id.to_string(),
        day_of_week: day,
        start_time: start,
        end_time: end,
        overnight,
        mode_hint: spec.kind(),
    };

    match spec {
        ScheduleSpec::OneOff { run_at } => {
            let at = parse_run_at(run_at).ok_or_else(|| format!("unparseable run_at '{run_at}'"))?;
            let start = ClockTime::from_hm(at.hour(), at.minute())
                .ok_or_else(|| format!("run_at '{run_at}' has an invalid time"))?;
            Ok(vec![block(at.weekday().into(), start, start, false)])
        }
        ScheduleSpec::Cron { cron } => {
            let point = cron_point(cron)?;
            Ok(vec![block(point.day, point.start, point.start, false)])
        }
        ScheduleSpec::Rrule { rrule } => {
            let rule = parse_weekly_rrule(rrule)?;
            let start = u32::from(rule.start.minutes());
            let end_total = start + rule.duration_minutes;
            let overnight = end_total > u32::from(MINUTES_PER_DAY);
            let end = ClockTime::from_minutes_wrapping(end_total);
            Ok(rule
                .days
                .iter()
                .map(|day| block(*day, rule.start, end, overnight))
                .collect())
        }
    }
}

/// Project a record's effective spec.
pub fn project_record(record: &ScheduleRecord) -> Result<Vec<TimelineBlock>, String> {
    let spec = record
        .effective_schedule_spec()
        .ok_or("record has no schedule_spec")?;
    project_spec(&record.id, spec)
}

/// Project every record, collecting the ones that could not be placed.
pub fn build_timeline(records: &[ScheduleRecord]) -> Timeline {
    let mut timeline = Timeline::default();
    for record in records {
        match project_record(record) {
            Ok(blocks) => timeline.blocks.extend(blocks),
            Err(reason) => {
                warn!(schedule_id = %record.id, reason = %reason, "schedule spec not projected onto timeline");
                timeline.skipped.push(SkippedSpec {
                    schedule_id: record.id.clone(),
                    reason,
                });
            }
        }
    }
    timeline
}
