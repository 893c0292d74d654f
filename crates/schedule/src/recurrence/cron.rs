//! Five-field cron subset: normalization for the `cron` crate and timeline points.

use std::str::FromStr;

use airwave_core::{ClockTime, DayOfWeek};
use cron::Schedule;

/// A cron expression reduced to a single weekly firing minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CronPoint {
    pub day: DayOfWeek,
    pub start: ClockTime,
}

/// Parse the single numeric day-of-week token (`0`/`7` = Sunday).
pub fn parse_cron_day(field: &str) -> Result<DayOfWeek, String> {
    field
        .parse::<u8>()
        .ok()
        .and_then(DayOfWeek::from_cron_number)
        .ok_or_else(|| {
            format!(
                "unsupported day-of-week '{field}': cron schedules need a single day number 0-7"
            )
        })
}

/// Normalize a 5-field expression to the `cron` crate's 6-field form.
///
/// Prepends a zero seconds field and spells a numeric day-of-week as a name,
/// since the crate numbers days from 1 = Sunday.
pub(crate) fn normalize_cron(expr: &str) -> String {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != 5 {
        return expr.trim().to_string();
    }
    let dow = parse_cron_day(fields[4])
        .map(|d| d.short_label().to_string())
        .unwrap_or_else(|_| fields[4].to_string());
    format!("0 {} {} {} {} {}", fields[0], fields[1], fields[2], fields[3], dow)
}

/// Confirm the `cron` crate accepts the expression.
pub(crate) fn parse_schedule(expr: &str) -> Result<Schedule, String> {
    Schedule::from_str(&normalize_cron(expr)).map_err(|e| e.to_string())
}

/// Reduce a cron expression to its weekly firing point.
///
/// Only fully numeric minute and hour fields with `*` day-of-month and month
/// can be placed on a weekly timeline; anything else is valid for storage but
/// not projectable.
pub fn cron_point(expr: &str) -> Result<CronPoint, String> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(format!("cron must have exactly 5 fields, got {}", fields.len()));
    }
    let day = parse_cron_day(fields[4])?;
    if fields[2] != "*" || fields[3] != "*" {
        return Err("day-of-month and month must be '*' to project onto a weekly timeline".into());
    }
    let minute = fields[0]
        .parse::<u32>()
        .map_err(|_| format!("minute field '{}' is not a single number", fields[0]))?;
    let hour = fields[1]
        .parse::<u32>()
        .map_err(|_| format!("hour field '{}' is not a single number", fields[1]))?;
    let start = ClockTime::from_hm(hour, minute)
        .ok_or_else(|| format!("time {hour}:{minute} is out of range"))?;
    Ok(CronPoint { day, start })
}

/// Render `minute hour * * day` for a weekly firing point.
pub fn to_cron(day: DayOfWeek, start: ClockTime) -> String {
    format!("{} {} * * {}", start.minute(), start.hour(), day.cron_number())
}
