//! Key and type checks on raw JSON, run before typed parsing so that every
//! problem is reported with its record path instead of a single serde error.

use airwave_core::ValidationResult;
use chrono::DateTime;
use serde_json::{Map, Value};

use crate::schema::{SpecKind, MAX_PRIORITY, RUNTIME_FIELDS};

use super::fuzzy::closest;

const RECORD_KEYS: [&str; 5] = ["id", "name", "enabled", "template_ref", "overrides"];
const UI_STATES: [&str; 3] = ["active", "paused", "draft"];

pub(super) fn check_record(value: &Value, path: &str, result: &mut ValidationResult) {
    let Some(obj) = value.as_object() else {
        result.error(path, "schedule record must be an object");
        return;
    };

    let allowed: Vec<&str> = RECORD_KEYS.iter().chain(RUNTIME_FIELDS.iter()).copied().collect();
    unknown_keys(obj, &allowed, path, result);

    for key in ["id", "name"] {
        match obj.get(key) {
            None => result.error(format!("{path}.{key}"), format!("missing required key '{key}'")),
            Some(v) if !v.is_string() => {
                result.error(format!("{path}.{key}"), format!("'{key}' must be a string"))
            }
            Some(_) => {}
        }
    }
    if obj.get("enabled").is_some_and(|v| !v.is_boolean()) {
        result.error(format!("{path}.enabled"), "'enabled' must be a boolean");
    }
    if obj.get("template_ref").is_some_and(|v| !v.is_string()) {
        result.error(format!("{path}.template_ref"), "'template_ref' must be a string");
    }

    check_runtime_values(obj, path, result);

    if let Some(overrides) = obj.get("overrides") {
        let over_path = format!("{path}.overrides");
        match overrides.as_object() {
            Some(over) => {
                unknown_keys(over, &RUNTIME_FIELDS, &over_path, result);
                check_runtime_values(over, &over_path, result);
            }
            None => result.error(over_path, "'overrides' must be an object"),
        }
    }
}

fn unknown_keys(obj: &Map<String, Value>, allowed: &[&str], path: &str, result: &mut ValidationResult) {
    for key in obj.keys() {
        if allowed.contains(&key.as_str()) {
            continue;
        }
        let key_path = format!("{path}.{key}");
        match closest(key, allowed) {
            Some(hint) => result.error_with_suggestion(
                key_path,
                format!("unknown key '{key}'"),
                format!("Did you mean '{hint}'?"),
            ),
            None => result.error(key_path, format!("unknown key '{key}'")),
        }
    }
}

fn check_runtime_values(obj: &Map<String, Value>, path: &str, result: &mut ValidationResult) {
    if let Some(tz) = obj.get("timezone") {
        if !tz.is_string() {
            result.error(format!("{path}.timezone"), "'timezone' must be a string");
        }
    }

    if let Some(state) = obj.get("ui_state") {
        if !state.as_str().is_some_and(|s| UI_STATES.contains(&s)) {
            result.error_with_suggestion(
                format!("{path}.ui_state"),
                format!("invalid ui_state {state}"),
                "Use one of: active, paused, draft",
            );
        }
    }

    if let Some(priority) = obj.get("priority") {
        if !priority
            .as_u64()
            .is_some_and(|p| p <= u64::from(MAX_PRIORITY))
        {
            result.error(
                format!("{path}.priority"),
                format!("priority must be an integer in 0..={MAX_PRIORITY}, got {priority}"),
            );
        }
    }

    for key in ["start_window", "end_window"] {
        if let Some(window) = obj.get(key) {
            check_window(window, &format!("{path}.{key}"), result);
        }
    }

    if let Some(refs) = obj.get("content_refs") {
        let ok = refs
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string));
        if !ok {
            result.error(format!("{path}.content_refs"), "'content_refs' must be a list of strings");
        }
    }

    if let Some(spec) = obj.get("schedule_spec") {
        check_spec(spec, &format!("{path}.schedule_spec"), result);
    }
}

fn check_window(window: &Value, path: &str, result: &mut ValidationResult) {
    let Some(obj) = window.as_object() else {
        result.error(path, "window must be an object like {\"value\": \"<RFC 3339 instant>\"}");
        return;
    };
    unknown_keys(obj, &["value"], path, result);
    match obj.get("value").and_then(Value::as_str) {
        Some(raw) if DateTime::parse_from_rfc3339(raw).is_ok() => {}
        Some(raw) => result.error(
            format!("{path}.value"),
            format!("'{raw}' is not an RFC 3339 instant"),
        ),
        None => result.error(format!("{path}.value"), "window requires a string 'value'"),
    }
}

fn check_spec(spec: &Value, path: &str, result: &mut ValidationResult) {
    let Some(obj) = spec.as_object() else {
        result.error(path, "schedule_spec must be an object");
        return;
    };
    let Some(kind_name) = obj.get("kind").and_then(Value::as_str) else {
        result.error_with_suggestion(
            format!("{path}.kind"),
            "schedule_spec requires a string 'kind'",
            "Use one of: one_off, rrule, cron",
        );
        return;
    };
    let Some(kind) = SpecKind::from_name(kind_name) else {
        result.error_with_suggestion(
            format!("{path}.kind"),
            format!("unknown schedule_spec kind '{kind_name}'"),
            "Use one of: one_off, rrule, cron",
        );
        return;
    };

    let field = kind.field();
    for key in obj.keys().filter(|k| *k != "kind" && *k != field) {
        let foreign = SpecKind::ALL.iter().any(|k| k.field() == key);
        let message = if foreign {
            format!("'{key}' is not allowed in a {kind} schedule_spec")
        } else {
            format!("unknown key '{key}'")
        };
        result.error(format!("{path}.{key}"), message);
    }
    match obj.get(field) {
        Some(Value::String(_)) => {}
        Some(_) => result.error(format!("{path}.{field}"), format!("'{field}' must be a string")),
        None => result.error(
            format!("{path}.{field}"),
            format!("{kind} schedule_spec requires '{field}'"),
        ),
    }
}
