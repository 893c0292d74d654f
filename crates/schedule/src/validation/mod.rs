//! Schedule record validation with path-addressed errors.
//!
//! Two entry points:
//! - [`parse_records`]: raw JSON to typed records, reporting unknown keys and
//!   wrong types per record
//! - [`validate_shape`]: composition and value rules on typed records
//!
//! Semantic contradictions between records are conflicts, not validation
//! errors; see [`crate::conflicts`].

mod fuzzy;
mod raw_checks;
mod spec_checks;

use airwave_core::ValidationResult;
use serde_json::Value;

use crate::schema::{RuntimeFields, ScheduleRecord, MAX_PRIORITY, RUNTIME_FIELDS};

pub use spec_checks::is_iana_timezone;

/// Parse a record list, or an envelope carrying one under `schedules`.
pub fn parse_records(value: &Value) -> Result<Vec<ScheduleRecord>, ValidationResult> {
    let mut result = ValidationResult::new();
    let items = match value {
        Value::Array(items) => items,
        Value::Object(obj) => match obj.get("schedules") {
            Some(Value::Array(items)) => items,
            _ => {
                result.error("schedules", "expected a 'schedules' list");
                return Err(result);
            }
        },
        _ => {
            result.error("", "expected a list of schedules or an object with 'schedules'");
            return Err(result);
        }
    };

    for (i, item) in items.iter().enumerate() {
        raw_checks::check_record(item, &format!("schedules[{i}]"), &mut result);
    }
    if !result.valid {
        return Err(result);
    }

    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match serde_json::from_value::<ScheduleRecord>(item.clone()) {
            Ok(record) => records.push(record),
            Err(e) => result.error(format!("schedules[{i}]"), e.to_string()),
        }
    }
    if result.valid {
        Ok(records)
    } else {
        Err(result)
    }
}

/// Check composition (standalone vs template + overrides) and field values.
pub fn validate_shape(records: &[ScheduleRecord]) -> ValidationResult {
    let mut result = ValidationResult::new();
    for (i, record) in records.iter().enumerate() {
        validate_record(record, &format!("schedules[{i}]"), &mut result);
    }
    result
}

fn validate_record(record: &ScheduleRecord, path: &str, result: &mut ValidationResult) {
    if record.id.trim().is_empty() {
        result.error(format!("{path}.id"), "id must not be empty");
    }
    if record.name.trim().is_empty() {
        result.error(format!("{path}.name"), "name must not be empty");
    }

    match (&record.template_ref, &record.overrides) {
        (None, Some(_)) => result.error_with_suggestion(
            format!("{path}.overrides"),
            "overrides requires template_ref",
            "Set template_ref or move the fields to the top level",
        ),
        (Some(template), _) if template.trim().is_empty() => {
            result.error(format!("{path}.template_ref"), "template_ref must not be empty")
        }
        _ => {}
    }

    let top = record.runtime.present();
    if record.is_template_based() {
        let over = record
            .overrides
            .as_ref()
            .map(RuntimeFields::present)
            .unwrap_or_default();
        for field in RUNTIME_FIELDS {
            if over.contains(&field) {
                continue;
            }
            if top.contains(&field) {
                result.error_with_suggestion(
                    format!("{path}.{field}"),
                    format!("'{field}' must be supplied inside overrides for a template-based record"),
                    format!("Move '{field}' into overrides"),
                );
            } else {
                result.error(
                    format!("{path}.overrides.{field}"),
                    format!("missing runtime field '{field}'"),
                );
            }
        }
    } else {
        for field in RUNTIME_FIELDS.iter().filter(|f| !top.contains(*f)) {
            result.error(
                format!("{path}.{field}"),
                format!("missing runtime field '{field}'"),
            );
        }
    }

    validate_values(&record.runtime, path, result);
    if let Some(overrides) = &record.overrides {
        validate_values(overrides, &format!("{path}.overrides"), result);
    }
}

fn validate_values(fields: &RuntimeFields, path: &str, result: &mut ValidationResult) {
    if let Some(tz) = &fields.timezone {
        spec_checks::validate_timezone(tz, &format!("{path}.timezone"), result);
    }
    if let Some(priority) = fields.priority {
        if priority > MAX_PRIORITY {
            result.error(
                format!("{path}.priority"),
                format!("priority must be in 0..={MAX_PRIORITY}, got {priority}"),
            );
        }
    }
    if let Some(refs) = &fields.content_refs {
        if refs.is_empty() {
            result.warn(format!("{path}.content_refs"), "no content references");
        }
        for (j, r) in refs.iter().enumerate() {
            if r.trim().is_empty() {
                result.error(format!("{path}.content_refs[{j}]"), "content reference must not be empty");
            }
        }
    }
    if let Some(spec) = &fields.schedule_spec {
        spec_checks::validate_spec(spec, &format!("{path}.schedule_spec"), result);
    }
}
