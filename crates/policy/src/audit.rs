//! Append-only NDJSON audit trail of resolved policy decisions.

use std::io;
use std::path::{Path, PathBuf};

use airwave_core::{JsonlLog, StoreResult, TailRead};

use crate::schema::PolicyAuditEvent;

/// The autonomy audit log.
pub struct AuditLog {
    log: JsonlLog<PolicyAuditEvent>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            log: JsonlLog::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.log.path()
    }

    pub fn append(&self, event: &PolicyAuditEvent) -> StoreResult<()> {
        self.log.append(event)
    }

    /// Last `limit` events, oldest first. Malformed lines are skipped.
    pub fn recent(&self, limit: usize) -> io::Result<Vec<PolicyAuditEvent>> {
        let TailRead { records, .. } = self.log.tail(limit)?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AutonomyMode, DecisionOrigin, DecisionType, PolicySource};
    use chrono::Utc;
    use std::fs::OpenOptions;
    use std::io::Write;
    use uuid::Uuid;

    fn event(notes: &str) -> PolicyAuditEvent {
        PolicyAuditEvent {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            decision_type: DecisionType::TrackSelection,
            origin: DecisionOrigin::Ai,
            mode: AutonomyMode::Assisted,
            source: PolicySource::StationDefault,
            show_id: None,
            timeslot_id: None,
            notes: Some(notes.to_string()),
        }
    }

    #[test]
    fn recent_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.jsonl"));
        log.append(&event("first")).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(log.path()).unwrap();
            writeln!(file, "{{not json").unwrap();
        }
        log.append(&event("second")).unwrap();

        let events = log.recent(10).unwrap();
        let notes: Vec<_> = events.iter().filter_map(|e| e.notes.as_deref()).collect();
        assert_eq!(notes, vec!["first", "second"]);
    }

    #[test]
    fn missing_log_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("logs").join("audit.jsonl"));
        assert!(log.recent(5).unwrap().is_empty());
    }
}
