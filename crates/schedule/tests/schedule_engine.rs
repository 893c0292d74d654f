//! End-to-end behavior of the schedule engine through its public API.

use std::fs;

use airwave_core::{Config, DayOfWeek};
use airwave_schedule::recurrence::project_record;
use airwave_schedule::validation::parse_records;
use airwave_schedule::{
    build_timeline, detect_conflicts, ScheduleConflictKind, ScheduleError, ScheduleStore,
    TemplateKind, TemplateRequest,
};
use serde_json::json;
use tempfile::TempDir;

fn store() -> (TempDir, ScheduleStore) {
    let dir = TempDir::new().unwrap();
    let store = ScheduleStore::from_config(&Config::rooted_at(dir.path()));
    (dir, store)
}

fn standalone(id: &str, spec: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "name": id,
        "timezone": "UTC",
        "ui_state": "active",
        "priority": 50,
        "start_window": {"value": "2025-01-01T00:00:00Z"},
        "end_window": {"value": "2026-01-01T00:00:00Z"},
        "content_refs": ["playlist:main"],
        "schedule_spec": spec,
    })
}

#[test]
fn overnight_rrule_conflicts_with_next_morning() {
    let records = parse_records(&json!([
        standalone("late", json!({"kind": "rrule",
            "rrule": "FREQ=WEEKLY;BYDAY=MO;BYHOUR=22;BYMINUTE=0;DURATION_MINUTES=480"})),
        standalone("breakfast", json!({"kind": "cron", "cron": "30 5 * * 2"})),
        standalone("evening", json!({"kind": "rrule",
            "rrule": "FREQ=WEEKLY;BYDAY=MO;BYHOUR=21;BYMINUTE=0"})),
    ]))
    .unwrap();

    let timeline = build_timeline(&records);
    let late = &timeline.blocks[0];
    assert!(late.overnight);
    assert_eq!(late.end_time.to_string(), "06:00");

    let conflicts = detect_conflicts(&records, &timeline.blocks);
    assert_eq!(conflicts.len(), 1, "{conflicts:?}");
    assert_eq!(conflicts[0].kind, ScheduleConflictKind::Overlap);
    assert_eq!(conflicts[0].day_of_week, Some(DayOfWeek::Tuesday));
    assert_eq!(conflicts[0].schedule_ids, vec!["breakfast", "late"]);
}

#[test]
fn weekday_template_round_trips_without_hard_conflicts() {
    let (_dir, store) = store();
    let applied = store
        .apply_template(&TemplateRequest {
            kind: TemplateKind::Weekday,
            timezone: "Europe/London".into(),
            content_refs: vec!["playlist:breakfast".into()],
            start_window: None,
            end_window: None,
        })
        .unwrap();
    assert_eq!(applied.records.len(), 5);

    let expected = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
    ];
    for (record, day) in applied.records.iter().zip(expected) {
        let blocks = project_record(record).unwrap();
        assert_eq!(blocks[0].day_of_week, day);
        assert_eq!(blocks[0].start_time.to_string(), "06:00");
    }

    let report = store.validate_schedules(&applied.records);
    assert!(report.valid, "{:?}", report.conflicts);
    assert!(report.conflicts.iter().all(|c| !c.is_hard()));

    store.update_schedules(applied.records.clone()).unwrap();
    assert_eq!(store.get_ui_state().unwrap().envelope.schedules, applied.records);
}

#[test]
fn ambiguous_dispatch_gates_publishing() {
    let (_dir, store) = store();
    let baseline = parse_records(&json!([standalone(
        "base",
        json!({"kind": "one_off", "run_at": "2025-05-05T09:00:00"})
    )]))
    .unwrap();
    store.update_schedules(baseline).unwrap();
    let before = fs::read(store.path()).unwrap();

    let spec = json!({"kind": "rrule", "rrule": "FREQ=WEEKLY;BYDAY=TH;BYHOUR=12;BYMINUTE=0"});
    let mut twin = standalone("twin", spec.clone());
    twin["start_window"] = json!({"value": "2025-06-01T00:00:00Z"});
    let records = parse_records(&json!([standalone("original", spec), twin])).unwrap();

    let err = store.publish_schedules(records).unwrap_err();
    assert!(
        err.to_string()
            .contains("Cannot save/publish schedules due to conflicts"),
        "{err}"
    );
    assert!(matches!(err, ScheduleError::Conflicts { .. }));
    assert_eq!(fs::read(store.path()).unwrap(), before);
}

#[test]
fn legacy_flat_array_migration_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let config = Config::rooted_at(dir.path());
    fs::create_dir_all(&config.paths.config_dir).unwrap();
    fs::write(
        &config.paths.schedule_path,
        serde_json::to_string(&json!([
            {"id": "a", "name": "Drive", "rrule": "FREQ=WEEKLY;BYDAY=MO;BYHOUR=7;BYMINUTE=0"},
            {"id": "b", "name": "Late", "enabled": false, "run_at": "2025-01-03T23:00:00"},
            {"id": "c", "name": "Tpl", "template_ref": "weekend", "cron": "0 8 * * 6"}
        ]))
        .unwrap(),
    )
    .unwrap();

    ScheduleStore::from_config(&config).get_ui_state().unwrap();
    let first = fs::read(&config.paths.schedule_path).unwrap();
    let state = ScheduleStore::from_config(&config).get_ui_state().unwrap();
    let second = fs::read(&config.paths.schedule_path).unwrap();
    assert_eq!(first, second);

    let templated = &state.envelope.schedules[2];
    assert!(templated.runtime.is_empty());
    assert!(templated.overrides.as_ref().unwrap().is_complete());
    assert_eq!(state.timeline.len(), 3);
}
