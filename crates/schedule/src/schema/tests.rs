use super::*;
use airwave_core::DayOfWeek;
use serde_json::json;

fn template_record() -> ScheduleRecord {
    serde_json::from_value(json!({
        "id": "weekday-mo",
        "name": "Weekday Mon",
        "template_ref": "weekday",
        "overrides": {
            "timezone": "Europe/London",
            "ui_state": "active",
            "priority": 70,
            "start_window": {"value": "2025-01-01T00:00:00Z"},
            "end_window": {"value": "2025-12-31T23:59:59Z"},
            "content_refs": ["playlist:breakfast"],
            "schedule_spec": {"kind": "rrule", "rrule": "FREQ=WEEKLY;BYDAY=MO;BYHOUR=6;BYMINUTE=0"}
        }
    }))
    .unwrap()
}

#[test]
fn effective_fields_read_overrides() {
    let record = template_record();
    assert!(record.enabled);
    assert!(record.runtime.is_empty());
    assert_eq!(record.effective_timezone(), Some("Europe/London"));
    assert_eq!(record.effective_priority(), Some(70));
    assert_eq!(record.effective_ui_state(), Some(UiState::Active));
    assert_eq!(
        record.effective_schedule_spec().map(ScheduleSpec::kind),
        Some(SpecKind::Rrule)
    );
    assert!(record.is_dispatchable());
}

#[test]
fn top_level_wins_and_is_ambiguous() {
    let mut record = template_record();
    record.runtime.priority = Some(10);
    record.runtime.timezone = Some("UTC".into());
    assert_eq!(record.effective_priority(), Some(10));
    assert_eq!(record.ambiguous_fields(), vec!["timezone", "priority"]);
}

#[test]
fn record_serializes_runtime_fields_flat() {
    let mut record = template_record();
    let overrides = record.overrides.take().unwrap();
    record.runtime = overrides;
    record.template_ref = None;

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["priority"], 70);
    assert_eq!(value["schedule_spec"]["kind"], "rrule");
    assert!(value.get("overrides").is_none());
    assert!(value.get("template_ref").is_none());
}

#[test]
fn open_window_defaults() {
    let mut record = template_record();
    record.overrides.as_mut().unwrap().start_window = None;
    record.overrides.as_mut().unwrap().end_window = None;
    let (start, end) = record.effective_window();
    assert_eq!(start.to_rfc3339(), "1970-01-01T00:00:00+00:00");
    assert_eq!(end.to_rfc3339(), "9999-12-31T23:59:59+00:00");
}

#[test]
fn run_at_accepts_instant_and_naive() {
    let instant = parse_run_at("2025-03-03T09:30:00-05:00").unwrap();
    assert_eq!(instant.to_string(), "2025-03-03 09:30:00");
    let naive = parse_run_at("2025-03-03T09:30").unwrap();
    assert_eq!(naive, instant);
    assert!(parse_run_at("next tuesday").is_none());
}

#[test]
fn overnight_block_splits_at_midnight() {
    let block = TimelineBlock {
        schedule_id: "late".into(),
        day_of_week: DayOfWeek::Monday,
        start_time: "22:00".parse().unwrap(),
        end_time: "06:00".parse().unwrap(),
        overnight: true,
        mode_hint: SpecKind::Rrule,
    };
    let segments = block.segments();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].day, DayOfWeek::Monday);
    assert_eq!(segments[0].label(), "22:00-24:00");
    assert_eq!(segments[1].day, DayOfWeek::Tuesday);
    assert_eq!(segments[1].label(), "00:00-06:00");
}

#[test]
fn point_block_occupies_one_minute() {
    let block = TimelineBlock {
        schedule_id: "id".into(),
        day_of_week: DayOfWeek::Sunday,
        start_time: "12:00".parse().unwrap(),
        end_time: "12:00".parse().unwrap(),
        overnight: false,
        mode_hint: SpecKind::OneOff,
    };
    assert_eq!(block.segments()[0].label(), "12:00-12:01");
}
