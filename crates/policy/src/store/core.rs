//! Core [`PolicyStore`] struct: cached reads, validated writes, resolution and audit.

use std::path::{Path, PathBuf};

use airwave_core::config::AuditConfig;
use airwave_core::document::CacheSlot;
use airwave_core::{Config, DocumentCache, DocumentFile, EventLog, StoreError};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audit::AuditLog;
use crate::conflicts::detect_conflicts;
use crate::resolve::resolve_effective;
use crate::schema::{
    AutonomyPolicy, DecisionOrigin, DecisionType, EffectivePolicyDecision, PolicyAuditEvent,
};
use crate::validation::validate_policy;

use super::error::{PolicyError, PolicySnapshot, Result};

const COMPONENT: &str = "policy";

/// File-backed owner of the autonomy policy document.
///
/// Construct once at startup and share by reference. The cache is keyed by the
/// file's mtime, so edits made by another process are picked up on the next read.
pub struct PolicyStore {
    file: DocumentFile,
    cache: DocumentCache<AutonomyPolicy>,
    audit: AuditLog,
    events: EventLog,
    audit_limits: AuditConfig,
}

impl PolicyStore {
    pub fn new(
        policy_path: impl Into<PathBuf>,
        audit_log_path: impl Into<PathBuf>,
        event_log_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            file: DocumentFile::new(policy_path),
            cache: DocumentCache::new(),
            audit: AuditLog::new(audit_log_path),
            events: EventLog::new(event_log_path),
            audit_limits: AuditConfig::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut store = Self::new(
            &config.paths.policy_path,
            &config.paths.audit_log_path,
            &config.paths.event_log_path,
        );
        store.audit_limits = config.audit.clone();
        store
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Current policy.
    ///
    /// A missing file is created with the built-in defaults. A corrupt file is
    /// backed up and replaced by defaults. A stored policy whose overrides
    /// conflict is an error; see [`load_or_default`](Self::load_or_default).
    pub fn get(&self) -> Result<AutonomyPolicy> {
        let mut slot = self.cache.lock();
        self.load_locked(&mut slot)
    }

    /// Like [`get`](Self::get), but a conflicting stored policy yields the
    /// defaults together with the conflicts instead of an error.
    pub fn load_or_default(&self) -> Result<PolicySnapshot> {
        match self.get() {
            Ok(policy) => Ok(PolicySnapshot {
                policy,
                conflicts: Vec::new(),
                fallback: false,
            }),
            Err(PolicyError::Conflicts { conflicts }) => {
                warn!(
                    path = %self.file.path().display(),
                    conflicts = conflicts.len(),
                    "stored policy has conflicts, falling back to defaults"
                );
                Ok(PolicySnapshot {
                    policy: AutonomyPolicy::defaults(),
                    conflicts,
                    fallback: true,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Replace the whole policy document.
    ///
    /// Re-stamps `updated_at`, rejects invalid or conflicting documents, backs
    /// up the current file and writes the new one. A failed write restores the
    /// backup and returns the error.
    pub fn update(&self, mut policy: AutonomyPolicy) -> Result<AutonomyPolicy> {
        policy.updated_at = Utc::now();

        let validation = validate_policy(&policy);
        if !validation.valid {
            return Err(PolicyError::Validation(validation));
        }
        let conflicts = detect_conflicts(&policy);
        if !conflicts.is_empty() {
            return Err(PolicyError::Conflicts { conflicts });
        }

        let mut slot = self.cache.lock();
        let outcome = match self.file.write_json(&policy) {
            Ok(outcome) => outcome,
            Err(e) => {
                slot.clear();
                if let StoreError::WriteFailed { restored: true, .. } = &e {
                    self.events.emit(
                        COMPONENT,
                        "policy_write_restored",
                        json!({ "path": self.file.path().display().to_string(), "error": e.to_string() }),
                    );
                }
                return Err(e.into());
            }
        };

        if let Some(backup) = &outcome.backup {
            self.events.emit(
                COMPONENT,
                "policy_backup_created",
                json!({ "backup_path": backup.display().to_string() }),
            );
        }
        self.events.emit(
            COMPONENT,
            "policy_updated",
            json!({
                "station_default_mode": policy.station_default_mode,
                "show_overrides": policy.show_overrides.len(),
                "timeslot_overrides": policy.timeslot_overrides.len(),
            }),
        );
        self.refill(&mut slot, &policy);
        info!(path = %self.file.path().display(), "policy updated");
        Ok(policy)
    }

    /// Effective mode and permissions for a `(show, timeslot)` scope.
    pub fn resolve_effective(
        &self,
        show_id: Option<&str>,
        timeslot_id: Option<&str>,
    ) -> Result<EffectivePolicyDecision> {
        let snapshot = self.load_or_default()?;
        Ok(resolve_effective(&snapshot.policy, show_id, timeslot_id))
    }

    /// Resolve the scope, stamp a new audit event and append it to the log.
    pub fn record_audit_event(
        &self,
        decision_type: DecisionType,
        origin: DecisionOrigin,
        show_id: Option<&str>,
        timeslot_id: Option<&str>,
        notes: Option<&str>,
    ) -> Result<PolicyAuditEvent> {
        let decision = self.resolve_effective(show_id, timeslot_id)?;
        let event = PolicyAuditEvent {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            decision_type,
            origin,
            mode: decision.mode,
            source: decision.source,
            show_id: decision.show_id,
            timeslot_id: decision.timeslot_id,
            notes: notes.map(str::to_string),
        };
        self.audit.append(&event)?;
        debug!(
            event_id = %event.event_id,
            decision_type = %event.decision_type,
            mode = %event.mode,
            "recorded audit event"
        );
        Ok(event)
    }

    /// Most recent audit events, oldest first. `None` uses the configured default.
    pub fn list_audit_events(&self, limit: Option<usize>) -> Result<Vec<PolicyAuditEvent>> {
        let limit = self.audit_limits.clamp_limit(limit);
        Ok(self.audit.recent(limit)?)
    }

    // ── Loading ───────────────────────────────────────────────────

    fn load_locked(&self, slot: &mut CacheSlot<AutonomyPolicy>) -> Result<AutonomyPolicy> {
        let Some(modified) = self.file.modified()? else {
            let policy = AutonomyPolicy::defaults();
            self.file.write_json(&policy)?;
            self.events.emit(
                COMPONENT,
                "policy_defaults_created",
                json!({ "path": self.file.path().display().to_string() }),
            );
            info!(path = %self.file.path().display(), "created default policy");
            self.refill(slot, &policy);
            return Ok(policy);
        };

        if let Some(policy) = slot.fresh(modified) {
            return Ok(policy);
        }

        let contents = self.file.read_to_string()?;
        let policy = match parse_policy(&contents) {
            Ok(policy) => policy,
            Err(reason) => return self.regenerate(slot, &reason),
        };

        let conflicts = detect_conflicts(&policy);
        if !conflicts.is_empty() {
            slot.clear();
            return Err(PolicyError::Conflicts { conflicts });
        }

        debug!(path = %self.file.path().display(), "loaded policy from disk");
        slot.fill(policy.clone(), modified);
        Ok(policy)
    }

    /// Replace a corrupt stored document with defaults. The write keeps a
    /// backup of the corrupt file.
    fn regenerate(&self, slot: &mut CacheSlot<AutonomyPolicy>, reason: &str) -> Result<AutonomyPolicy> {
        warn!(path = %self.file.path().display(), error = %reason, "stored policy is corrupt, regenerating defaults");
        let policy = AutonomyPolicy::defaults();
        let outcome = self.file.write_json(&policy)?;
        self.events.emit(
            COMPONENT,
            "policy_regenerated",
            json!({
                "reason": reason,
                "backup_path": outcome.backup.map(|b| b.display().to_string()),
            }),
        );
        self.refill(slot, &policy);
        Ok(policy)
    }

    fn refill(&self, slot: &mut CacheSlot<AutonomyPolicy>, policy: &AutonomyPolicy) {
        match self.file.modified() {
            Ok(Some(modified)) => slot.fill(policy.clone(), modified),
            Ok(None) => slot.clear(),
            Err(e) => {
                warn!(path = %self.file.path().display(), error = %e, "could not stat policy after write");
                slot.clear();
            }
        }
    }
}

/// Parse and shape-check a stored document. The error is a human-readable reason.
fn parse_policy(contents: &str) -> std::result::Result<AutonomyPolicy, String> {
    let policy: AutonomyPolicy =
        serde_json::from_str(contents).map_err(|e| format!("parse error: {e}"))?;
    let validation = validate_policy(&policy);
    if !validation.valid {
        return Err(format!("validation failed: {}", validation.summary(3)));
    }
    Ok(policy)
}
