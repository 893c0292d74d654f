//! Render one weekly slot as each spec kind, for editor previews.

use airwave_core::{ClockTime, DayOfWeek, ValidationResult};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::recurrence::{to_cron, to_rrule};
use crate::schema::ScheduleSpec;
use crate::validation::is_iana_timezone;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub day: DayOfWeek,
    pub time: ClockTime,
    pub timezone: String,
    /// First date the one-off rendering may fall on.
    pub start_date: NaiveDate,
}

/// The same slot as a one-off, a weekly RRULE and a cron expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecPreview {
    pub timezone: String,
    pub one_off: ScheduleSpec,
    pub rrule: ScheduleSpec,
    pub cron: ScheduleSpec,
}

pub fn preview_spec(request: &PreviewRequest) -> Result<SpecPreview, ValidationResult> {
    let tz = request.timezone.as_str();
    if !(tz == "UTC" || tz == "GMT" || is_iana_timezone(tz)) {
        let mut result = ValidationResult::new();
        result.error(
            "timezone",
            format!("Invalid timezone '{tz}', expected IANA format (e.g., 'Europe/London')"),
        );
        return Err(result);
    }

    let date = next_on_or_after(request.start_date, request.day);
    Ok(SpecPreview {
        timezone: request.timezone.clone(),
        one_off: ScheduleSpec::OneOff {
            run_at: format!("{}T{}:00", date.format("%Y-%m-%d"), request.time),
        },
        rrule: ScheduleSpec::Rrule {
            rrule: to_rrule(request.day, request.time, None),
        },
        cron: ScheduleSpec::Cron {
            cron: to_cron(request.day, request.time),
        },
    })
}

fn next_on_or_after(start: NaiveDate, day: DayOfWeek) -> NaiveDate {
    let from = DayOfWeek::from(start.weekday()).index();
    let ahead = (day.index() + 7 - from) % 7;
    start
        .checked_add_days(Days::new(ahead as u64))
        .unwrap_or(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::project_spec;

    fn request(day: DayOfWeek, time: &str, start: &str) -> PreviewRequest {
        PreviewRequest {
            day,
            time: time.parse().unwrap(),
            timezone: "America/New_York".into(),
            start_date: start.parse().unwrap(),
        }
    }

    #[test]
    fn renders_all_three_kinds() {
        // 2025-06-04 is a Wednesday.
        let preview = preview_spec(&request(DayOfWeek::Friday, "07:30", "2025-06-04")).unwrap();
        assert_eq!(preview.timezone, "America/New_York");
        assert_eq!(preview.one_off.expression(), "2025-06-06T07:30:00");
        assert_eq!(preview.rrule.expression(), "FREQ=WEEKLY;BYDAY=FR;BYHOUR=7;BYMINUTE=30");
        assert_eq!(preview.cron.expression(), "30 7 * * 5");
    }

    #[test]
    fn start_date_on_the_day_is_used_as_is() {
        let preview = preview_spec(&request(DayOfWeek::Wednesday, "23:00", "2025-06-04")).unwrap();
        assert_eq!(preview.one_off.expression(), "2025-06-04T23:00:00");
    }

    #[test]
    fn every_rendering_projects_to_the_same_slot() {
        let preview = preview_spec(&request(DayOfWeek::Sunday, "18:45", "2025-06-04")).unwrap();
        for spec in [&preview.one_off, &preview.rrule, &preview.cron] {
            let blocks = project_spec("p", spec).unwrap();
            assert_eq!(blocks[0].day_of_week, DayOfWeek::Sunday);
            assert_eq!(blocks[0].start_time.to_string(), "18:45");
        }
    }

    #[test]
    fn bad_timezone_is_rejected() {
        let mut req = request(DayOfWeek::Monday, "06:00", "2025-06-04");
        req.timezone = "eastern".into();
        assert!(preview_spec(&req).is_err());
    }
}
