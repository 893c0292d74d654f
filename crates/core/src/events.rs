//! Structured event log for store lifecycle events (saves, backups, migrations).

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::jsonl::{JsonlLog, TailRead};

/// One structured event line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StructuredEvent {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Emitting subsystem, e.g. `"policy"` or `"schedule"`.
    pub component: String,
    pub event_type: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Append-only emitter of [`StructuredEvent`]s.
///
/// Emission is best effort: a failed append is logged and swallowed so that
/// observability never fails the operation being observed.
pub struct EventLog {
    log: JsonlLog<StructuredEvent>,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            log: JsonlLog::new(path),
        }
    }

    pub fn emit(&self, component: &str, event_type: &str, payload: serde_json::Value) {
        let event = StructuredEvent {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            component: component.to_string(),
            event_type: event_type.to_string(),
            payload,
        };
        match self.log.append(&event) {
            Ok(()) => debug!(component, event_type, "emitted event"),
            Err(e) => warn!(
                component,
                event_type,
                path = %self.log.path().display(),
                error = %e,
                "failed to emit event"
            ),
        }
    }

    /// Most recent `limit` events in file order.
    pub fn recent(&self, limit: usize) -> std::io::Result<TailRead<StructuredEvent>> {
        self.log.tail(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let events = EventLog::new(dir.path().join("events.jsonl"));
        events.emit("schedule", "schedules_saved", serde_json::json!({"count": 3}));
        events.emit("policy", "policy_updated", serde_json::Value::Null);

        let read = events.recent(10).unwrap();
        assert_eq!(read.records.len(), 2);
        assert_eq!(read.records[0].event_type, "schedules_saved");
        assert_eq!(read.records[0].payload["count"], 3);
        assert_eq!(read.records[1].component, "policy");
    }

    #[test]
    fn emit_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // The log path is a directory, so every append fails.
        let events = EventLog::new(dir.path());
        events.emit("policy", "policy_updated", serde_json::Value::Null);
    }
}
