//! Upgrade stored schedule documents to the current envelope layout.
//!
//! Works on raw JSON so that legacy keys never reach typed parsing. Runtime
//! defaults are written where the record keeps its runtime fields: inside
//! `overrides` for template records, at top level otherwise.

use serde_json::{json, Map, Value};

use crate::schema::{
    SpecKind, UiState, WindowBound, DEFAULT_PRIORITY, RUNTIME_FIELDS, SCHEMA_VERSION,
};

/// What a migration changed, for logging and events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Version found on disk; `1` for bare arrays and unversioned envelopes.
    pub from_version: u32,
    pub steps: Vec<String>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Bring `document` up to the current schema. Returns the record values and a
/// report; the error is a human-readable reason the document cannot be used.
pub fn migrate_document(document: Value) -> Result<(Vec<Value>, MigrationReport), String> {
    let mut report = MigrationReport {
        from_version: SCHEMA_VERSION,
        steps: Vec::new(),
    };

    let items = match document {
        Value::Array(items) => {
            report.from_version = 1;
            report.steps.push("wrapped legacy schedule list in an envelope".into());
            items
        }
        Value::Object(mut obj) => {
            let version = match obj.get("schema_version") {
                None => 1,
                Some(v) => v
                    .as_u64()
                    .and_then(|v| u32::try_from(v).ok())
                    .ok_or_else(|| format!("schema_version must be an integer, got {v}"))?,
            };
            if version > SCHEMA_VERSION {
                return Err(format!(
                    "unsupported schema_version {version} (newest known is {SCHEMA_VERSION})"
                ));
            }
            if version < SCHEMA_VERSION {
                report.steps.push(format!("upgraded schema_version {version} to {SCHEMA_VERSION}"));
            }
            report.from_version = version;
            match obj.remove("schedules") {
                Some(Value::Array(items)) => items,
                Some(_) => return Err("'schedules' must be a list".into()),
                None => return Err("document has no 'schedules' list".into()),
            }
        }
        _ => return Err("document must be a list or an object with 'schedules'".into()),
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(record) => migrate_record(record, i, &mut report.steps).map(Value::Object),
            _ => Err(format!("schedules[{i}] is not an object")),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((records, report))
}

fn migrate_record(
    mut record: Map<String, Value>,
    index: usize,
    steps: &mut Vec<String>,
) -> Result<Map<String, Value>, String> {
    let path = format!("schedules[{index}]");

    if !record.contains_key("enabled") {
        record.insert("enabled".into(), Value::Bool(true));
        steps.push(format!("{path}: defaulted enabled to true"));
    }
    let enabled = record.get("enabled").and_then(Value::as_bool).unwrap_or(true);
    let template_based = record.contains_key("template_ref");

    let mut overrides = match record.remove("overrides") {
        Some(Value::Object(over)) => Some(over),
        Some(_) => return Err(format!("{path}.overrides is not an object")),
        None if template_based => Some(Map::new()),
        None => None,
    };

    fold_legacy_spec(&mut record, overrides.as_mut(), &path, steps)?;

    for field in RUNTIME_FIELDS {
        let present = record.contains_key(field)
            || overrides.as_ref().is_some_and(|o| o.contains_key(field));
        if present {
            continue;
        }
        let Some(value) = default_for(field, enabled) else {
            continue;
        };
        let (target, at) = match overrides.as_mut() {
            Some(over) if template_based => (over, format!("{path}.overrides.{field}")),
            _ => (&mut record, format!("{path}.{field}")),
        };
        target.insert(field.to_string(), value);
        steps.push(format!("{at}: filled default"));
    }

    if let Some(over) = overrides {
        record.insert("overrides".into(), Value::Object(over));
    }
    Ok(record)
}

/// Move legacy top-level `run_at` / `rrule` / `cron` keys into `schedule_spec`.
fn fold_legacy_spec(
    record: &mut Map<String, Value>,
    mut overrides: Option<&mut Map<String, Value>>,
    path: &str,
    steps: &mut Vec<String>,
) -> Result<(), String> {
    let mut legacy: Vec<(SpecKind, Value)> = Vec::new();
    for kind in SpecKind::ALL {
        if let Some(value) = record.remove(kind.field()) {
            legacy.push((kind, value));
        }
        if let Some(over) = overrides.as_deref_mut() {
            if let Some(value) = over.remove(kind.field()) {
                legacy.push((kind, value));
            }
        }
    }

    let (kind, value) = match legacy.len() {
        0 => return Ok(()),
        1 => legacy.remove(0),
        _ => {
            let names: Vec<&str> = legacy.iter().map(|(k, _)| k.field()).collect();
            return Err(format!(
                "{path} has several legacy recurrence keys ({}); keep exactly one",
                names.join(", ")
            ));
        }
    };

    let has_spec = record.contains_key("schedule_spec")
        || overrides.as_deref().is_some_and(|o| o.contains_key("schedule_spec"));
    if has_spec {
        return Err(format!(
            "{path} has both schedule_spec and a legacy '{}' key",
            kind.field()
        ));
    }

    let mut spec = Map::new();
    spec.insert("kind".into(), Value::String(kind.as_str().into()));
    spec.insert(kind.field().into(), value);
    match overrides {
        Some(over) if record.contains_key("template_ref") => {
            over.insert("schedule_spec".into(), Value::Object(spec));
            steps.push(format!("{path}: folded legacy '{}' into overrides.schedule_spec", kind.field()));
        }
        _ => {
            record.insert("schedule_spec".into(), Value::Object(spec));
            steps.push(format!("{path}: folded legacy '{}' into schedule_spec", kind.field()));
        }
    }
    Ok(())
}

fn default_for(field: &str, enabled: bool) -> Option<Value> {
    let value = match field {
        "timezone" => json!("UTC"),
        "ui_state" => json!(UiState::from_enabled(enabled)),
        "priority" => json!(DEFAULT_PRIORITY),
        "start_window" => json!(WindowBound::open_start()),
        "end_window" => json!(WindowBound::open_end()),
        "content_refs" => json!([]),
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_list_is_wrapped_and_defaulted() {
        let legacy = json!([
            {"id": "a", "name": "Morning", "rrule": "FREQ=WEEKLY;BYDAY=MO;BYHOUR=6;BYMINUTE=0"},
            {"id": "b", "name": "Special", "enabled": false, "run_at": "2025-03-01T10:00:00"}
        ]);
        let (records, report) = migrate_document(legacy).unwrap();
        assert_eq!(report.from_version, 1);

        let a = &records[0];
        assert_eq!(a["enabled"], json!(true));
        assert_eq!(a["priority"], json!(50));
        assert_eq!(a["ui_state"], json!("active"));
        assert_eq!(a["timezone"], json!("UTC"));
        assert_eq!(a["content_refs"], json!([]));
        assert_eq!(a["start_window"]["value"], json!("1970-01-01T00:00:00Z"));
        assert_eq!(a["end_window"]["value"], json!("9999-12-31T23:59:59Z"));
        assert_eq!(a["schedule_spec"]["kind"], json!("rrule"));
        assert!(a.get("rrule").is_none());

        let b = &records[1];
        assert_eq!(b["ui_state"], json!("paused"));
        assert_eq!(
            b["schedule_spec"],
            json!({"kind": "one_off", "run_at": "2025-03-01T10:00:00"})
        );
    }

    #[test]
    fn template_defaults_go_into_overrides() {
        let doc = json!({"schema_version": 2, "schedules": [
            {"id": "t", "name": "Tpl", "template_ref": "weekday", "cron": "0 6 * * 1",
             "overrides": {"priority": 70}}
        ]});
        let (records, _) = migrate_document(doc).unwrap();
        let t = &records[0];
        assert!(t.get("priority").is_none());
        assert!(t.get("timezone").is_none());
        assert_eq!(t["overrides"]["priority"], json!(70));
        assert_eq!(t["overrides"]["timezone"], json!("UTC"));
        assert_eq!(t["overrides"]["schedule_spec"], json!({"kind": "cron", "cron": "0 6 * * 1"}));
    }

    #[test]
    fn current_documents_are_untouched() {
        let doc = json!({"schema_version": 2, "schedules": [{
            "id": "a", "name": "A", "enabled": true, "timezone": "UTC", "ui_state": "draft",
            "priority": 10,
            "start_window": {"value": "2025-01-01T00:00:00Z"},
            "end_window": {"value": "2025-02-01T00:00:00Z"},
            "content_refs": [],
            "schedule_spec": {"kind": "cron", "cron": "0 6 * * 1"}
        }]});
        let (records, report) = migrate_document(doc.clone()).unwrap();
        assert!(report.is_noop(), "{:?}", report.steps);
        assert_eq!(Value::Array(records), doc["schedules"]);
    }

    #[test]
    fn rejects_unusable_documents() {
        assert!(migrate_document(json!({"schema_version": 3, "schedules": []}))
            .unwrap_err()
            .contains("unsupported schema_version 3"));
        assert!(migrate_document(json!("nope")).is_err());
        assert!(migrate_document(json!([{"id": "a", "name": "A", "rrule": "FREQ=WEEKLY", "cron": "0 6 * * 1"}])).is_err());
        assert!(migrate_document(json!([{"id": "a", "name": "A", "cron": "0 6 * * 1",
            "schedule_spec": {"kind": "cron", "cron": "0 7 * * 1"}}])).is_err());
    }
}
