//! Subcommand handlers. Each returns the JSON value to print.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use airwave_core::Config;
use airwave_policy::{AutonomyPolicy, PolicyStore};
use airwave_schedule::schema::{ScheduleRecord, WindowBound};
use airwave_schedule::validation::parse_records;
use airwave_schedule::{PreviewRequest, ScheduleStore, TemplateRequest};

use crate::cli::{AuditCommand, PolicyCommand, ScheduleCommand};

pub fn policy(config: &Config, cmd: PolicyCommand) -> Result<Value> {
    let store = PolicyStore::from_config(config);
    let value = match cmd {
        PolicyCommand::Get => serde_json::to_value(store.load_or_default()?)?,
        PolicyCommand::Put { file } => {
            let document: AutonomyPolicy = serde_json::from_str(&read(&file)?)
                .with_context(|| format!("{} is not a valid policy document", file.display()))?;
            let saved = store.update(document)?;
            info!(path = %store.path().display(), "policy replaced");
            serde_json::to_value(saved)?
        }
        PolicyCommand::Resolve { show, timeslot } => {
            serde_json::to_value(store.resolve_effective(show.as_deref(), timeslot.as_deref())?)?
        }
        PolicyCommand::Audit(AuditCommand::Record {
            decision,
            origin,
            show,
            timeslot,
            notes,
        }) => serde_json::to_value(store.record_audit_event(
            decision,
            origin,
            show.as_deref(),
            timeslot.as_deref(),
            notes.as_deref(),
        )?)?,
        PolicyCommand::Audit(AuditCommand::List { limit }) => {
            serde_json::to_value(store.list_audit_events(limit)?)?
        }
    };
    Ok(value)
}

pub fn schedule(config: &Config, cmd: ScheduleCommand) -> Result<Value> {
    let store = ScheduleStore::from_config(config);
    let value = match cmd {
        ScheduleCommand::State => serde_json::to_value(store.get_ui_state()?)?,
        ScheduleCommand::Put { file } => {
            let envelope = store.update_schedules(load_records(&file)?)?;
            serde_json::to_value(envelope)?
        }
        ScheduleCommand::Validate { file } => {
            let raw = read_json(&file)?;
            match parse_records(&raw) {
                Ok(records) => serde_json::to_value(store.validate_schedules(&records))?,
                Err(validation) => json!({ "valid": false, "validation": validation }),
            }
        }
        ScheduleCommand::Publish { file } => {
            serde_json::to_value(store.publish_schedules(load_records(&file)?)?)?
        }
        ScheduleCommand::Template {
            kind,
            timezone,
            content_refs,
            start,
            end,
        } => {
            let request = TemplateRequest {
                kind,
                timezone,
                content_refs,
                start_window: start.map(WindowBound::new),
                end_window: end.map(WindowBound::new),
            };
            serde_json::to_value(store.apply_template(&request)?)?
        }
        ScheduleCommand::Preview {
            day,
            time,
            timezone,
            start_date,
        } => {
            let request = PreviewRequest {
                day,
                time,
                timezone,
                start_date: start_date.unwrap_or_else(|| Utc::now().date_naive()),
            };
            serde_json::to_value(store.preview_spec(&request)?)?
        }
    };
    Ok(value)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_json(path: &Path) -> Result<Value> {
    serde_json::from_str(&read(path)?).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn load_records(path: &Path) -> Result<Vec<ScheduleRecord>> {
    parse_records(&read_json(path)?).map_err(|validation| {
        anyhow!(
            "{} has invalid schedules: {}",
            path.display(),
            validation.summary(5)
        )
    })
}
