use super::*;
use crate::schema::SpecKind;

fn rrule(expr: &str) -> ScheduleSpec {
    ScheduleSpec::Rrule { rrule: expr.into() }
}

fn cron(expr: &str) -> ScheduleSpec {
    ScheduleSpec::Cron { cron: expr.into() }
}

#[test]
fn rrule_overnight_block_wraps() {
    let blocks = project_spec(
        "late",
        &rrule("FREQ=WEEKLY;BYDAY=MO;BYHOUR=22;BYMINUTE=0;DURATION_MINUTES=480"),
    )
    .unwrap();
    assert_eq!(blocks.len(), 1);
    let block = &blocks[0];
    assert_eq!(block.day_of_week, DayOfWeek::Monday);
    assert_eq!(block.start_time.to_string(), "22:00");
    assert_eq!(block.end_time.to_string(), "06:00");
    assert!(block.overnight);
    assert_eq!(block.mode_hint, SpecKind::Rrule);
}

#[test]
fn rrule_default_duration_is_one_hour() {
    let blocks = project_spec("x", &rrule("FREQ=WEEKLY;BYDAY=FR;BYHOUR=9;BYMINUTE=15")).unwrap();
    assert_eq!(blocks[0].end_time.to_string(), "10:15");
    assert!(!blocks[0].overnight);
}

#[test]
fn rrule_ending_at_midnight_is_not_overnight() {
    let blocks = project_spec(
        "x",
        &rrule("FREQ=WEEKLY;BYDAY=SU;BYHOUR=23;BYMINUTE=0;DURATION_MINUTES=60"),
    )
    .unwrap();
    assert!(!blocks[0].overnight);
    assert_eq!(blocks[0].end_time.to_string(), "00:00");
    assert_eq!(blocks[0].segments()[0].label(), "23:00-24:00");
}

#[test]
fn rrule_keys_are_order_and_case_insensitive() {
    let rule = parse_weekly_rrule("RRULE:byminute=30;BYHOUR=7;byday=tu,MO;freq=weekly").unwrap();
    assert_eq!(rule.days, vec![DayOfWeek::Monday, DayOfWeek::Tuesday]);
    assert_eq!(rule.start.to_string(), "07:30");
    assert_eq!(rule.duration_minutes, DEFAULT_DURATION_MINUTES);
}

#[test]
fn unsupported_rrules_are_rejected() {
    assert!(parse_weekly_rrule("FREQ=DAILY;BYHOUR=6;BYMINUTE=0").is_err());
    assert!(parse_weekly_rrule("FREQ=WEEKLY;BYDAY=MO;BYHOUR=6").is_err());
    assert!(parse_weekly_rrule("FREQ=WEEKLY;BYDAY=XX;BYHOUR=6;BYMINUTE=0").is_err());
    assert!(parse_weekly_rrule("FREQ=WEEKLY;BYDAY=MO;BYHOUR=24;BYMINUTE=0").is_err());
    assert!(parse_weekly_rrule("FREQ=WEEKLY;BYDAY=MO;BYHOUR=6;BYMINUTE=0;COUNT=3").is_err());
    assert!(
        parse_weekly_rrule("FREQ=WEEKLY;BYDAY=MO;BYHOUR=6;BYMINUTE=0;DURATION_MINUTES=0").is_err()
    );
}

#[test]
fn cron_projects_numeric_point() {
    let blocks = project_spec("c", &cron("30 6 * * 1")).unwrap();
    assert_eq!(blocks[0].day_of_week, DayOfWeek::Monday);
    assert_eq!(blocks[0].start_time, blocks[0].end_time);
    assert_eq!(blocks[0].start_time.to_string(), "06:30");

    let sunday = project_spec("c", &cron("0 0 * * 7")).unwrap();
    assert_eq!(sunday[0].day_of_week, DayOfWeek::Sunday);
}

#[test]
fn cron_with_wildcards_is_not_projected() {
    assert!(project_spec("c", &cron("*/15 6 * * 1")).is_err());
    assert!(project_spec("c", &cron("0 6 1 * 1")).is_err());
    assert!(project_spec("c", &cron("0 6 * * 1-5")).is_err());
    assert!(project_spec("c", &cron("0 6 * * *")).is_err());
}

#[test]
fn one_off_lands_on_its_weekday() {
    // 2025-03-05 is a Wednesday.
    let spec = ScheduleSpec::OneOff { run_at: "2025-03-05T18:45:00+01:00".into() };
    let blocks = project_spec("once", &spec).unwrap();
    assert_eq!(blocks[0].day_of_week, DayOfWeek::Wednesday);
    assert_eq!(blocks[0].start_time.to_string(), "18:45");
    assert_eq!(blocks[0].mode_hint, SpecKind::OneOff);
}

#[test]
fn inverse_round_trips() {
    for day in DayOfWeek::ALL {
        let start = ClockTime::from_hm(21, 5).unwrap();
        let from_rrule = project_spec("r", &rrule(&to_rrule(day, start, Some(90)))).unwrap();
        assert_eq!((from_rrule[0].day_of_week, from_rrule[0].start_time), (day, start));

        let from_cron = project_spec("c", &cron(&to_cron(day, start))).unwrap();
        assert_eq!((from_cron[0].day_of_week, from_cron[0].start_time), (day, start));
    }
    assert_eq!(
        to_rrule(DayOfWeek::Monday, ClockTime::from_hm(6, 0).unwrap(), Some(60)),
        "FREQ=WEEKLY;BYDAY=MO;BYHOUR=6;BYMINUTE=0"
    );
    assert_eq!(to_cron(DayOfWeek::Sunday, ClockTime::from_hm(8, 30).unwrap()), "30 8 * * 0");
}

#[test]
fn cron_crate_accepts_normalized_expressions() {
    assert!(parse_schedule("0 6 * * 1").is_ok());
    assert!(parse_schedule("0 6 * * 0").is_ok());
    assert!(parse_schedule("*/15 9-17 * * 5").is_ok());
}

#[test]
fn timeline_collects_skipped_specs() {
    let record: ScheduleRecord = serde_json::from_value(serde_json::json!({
        "id": "bad",
        "name": "Bad",
        "schedule_spec": {"kind": "cron", "cron": "*/5 * * * 1"}
    }))
    .unwrap();
    let timeline = build_timeline(&[record]);
    assert!(timeline.blocks.is_empty());
    assert_eq!(timeline.skipped.len(), 1);
    assert_eq!(timeline.skipped[0].schedule_id, "bad");
}

#[test]
fn full_day_rrule_covers_the_whole_day() {
    let blocks = project_spec(
        "allday",
        &rrule("FREQ=WEEKLY;BYDAY=TU;BYHOUR=0;BYMINUTE=0;DURATION_MINUTES=1440"),
    )
    .unwrap();
    assert!(!blocks[0].overnight);
    let segments = blocks[0].segments();
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].label(), "00:00-24:00");
}
