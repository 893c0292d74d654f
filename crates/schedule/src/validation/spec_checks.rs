//! Recurrence spec and timezone checks.

use airwave_core::ValidationResult;

use crate::recurrence::{cron_point, parse_cron_day, parse_schedule, parse_weekly_rrule};
use crate::schema::{parse_run_at, ScheduleSpec};

pub(super) fn validate_spec(spec: &ScheduleSpec, path: &str, result: &mut ValidationResult) {
    match spec {
        ScheduleSpec::OneOff { run_at } => {
            if parse_run_at(run_at).is_none() {
                result.error_with_suggestion(
                    format!("{path}.run_at"),
                    format!("Invalid run_at '{run_at}'"),
                    "Use an RFC 3339 instant or a local YYYY-MM-DDTHH:MM[:SS] time",
                );
            }
        }
        ScheduleSpec::Rrule { rrule } => {
            if !rrule.to_ascii_uppercase().contains("FREQ=") {
                result.error_with_suggestion(
                    format!("{path}.rrule"),
                    "RRULE must contain FREQ=",
                    "e.g. FREQ=WEEKLY;BYDAY=MO;BYHOUR=6;BYMINUTE=0",
                );
            } else if let Err(reason) = parse_weekly_rrule(rrule) {
                result.warn(
                    format!("{path}.rrule"),
                    format!("RRULE will not appear on the timeline: {reason}"),
                );
            }
        }
        ScheduleSpec::Cron { cron } => validate_cron(cron, &format!("{path}.cron"), result),
    }
}

fn validate_cron(expr: &str, path: &str, result: &mut ValidationResult) {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != 5 {
        result.error(
            path,
            format!(
                "Cron must have exactly 5 fields (min hour dom month dow), got {}",
                fields.len()
            ),
        );
        return;
    }

    let ranges: &[(&str, u32, u32)] = &[
        ("minute", 0, 59),
        ("hour", 0, 23),
        ("day-of-month", 1, 31),
        ("month", 1, 12),
        ("day-of-week", 0, 7),
    ];
    let mut fields_ok = true;
    for (field, (name, min, max)) in fields.iter().zip(ranges.iter()) {
        if !validate_cron_field(field, *min, *max) {
            fields_ok = false;
            result.error(path, format!("Invalid cron {name} field: '{field}'"));
        }
    }
    if !fields_ok {
        return;
    }

    if let Err(reason) = parse_cron_day(fields[4]) {
        result.error_with_suggestion(path, reason, "Create one cron schedule per day");
        return;
    }
    if let Err(reason) = parse_schedule(expr) {
        result.error(path, format!("Cron expression rejected: {reason}"));
        return;
    }
    if let Err(reason) = cron_point(expr) {
        result.warn(path, format!("Cron will not appear on the timeline: {reason}"));
    }
}

/// Cron field syntax: `*`, `N`, `N-M`, `*/N`, `N-M/N` and comma lists.
fn validate_cron_field(field: &str, min: u32, max: u32) -> bool {
    field.split(',').all(|part| {
        let part = part.trim();
        let range = match part.split_once('/') {
            Some((r, step)) => match step.parse::<u32>() {
                Ok(v) if v > 0 && v <= max => r,
                _ => return false,
            },
            None => part,
        };
        if range == "*" {
            return true;
        }
        if range.is_empty() {
            return false;
        }
        let in_range = |v: u32| v >= min && v <= max;
        match range.split_once('-') {
            Some((a, b)) => matches!(
                (a.parse::<u32>(), b.parse::<u32>()),
                (Ok(a), Ok(b)) if in_range(a) && in_range(b) && a <= b
            ),
            None => range.parse::<u32>().is_ok_and(in_range),
        }
    })
}

pub(super) fn validate_timezone(tz: &str, path: &str, result: &mut ValidationResult) {
    if tz == "UTC" || tz == "GMT" {
        return;
    }
    if !is_iana_timezone(tz) {
        result.error(
            path,
            format!("Invalid timezone '{tz}', expected IANA format (e.g., 'Europe/London')"),
        );
    }
}

/// `Area/Location[/Sub]` with each segment starting uppercase.
pub fn is_iana_timezone(tz: &str) -> bool {
    let parts: Vec<&str> = tz.split('/').collect();
    parts.len() >= 2
        && parts.iter().all(|part| {
            part.chars().next().is_some_and(|c| c.is_ascii_uppercase())
                && part.chars().all(|c| c.is_ascii_alphabetic() || c == '_' || c == '-')
        })
}
