//! Core [`ScheduleStore`] struct: migrated cached reads, gated writes, templates.

use std::path::{Path, PathBuf};

use airwave_core::document::{to_pretty_json, CacheSlot};
use airwave_core::{Config, DocumentCache, DocumentFile, EventLog, StoreError, ValidationResult};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::conflicts::detect_conflicts;
use crate::migrate::migrate_document;
use crate::preview::{preview_spec, PreviewRequest, SpecPreview};
use crate::recurrence::build_timeline;
use crate::schema::{ScheduleConflict, ScheduleEnvelope, ScheduleRecord};
use crate::templates::{expand_template, TemplateRequest};
use crate::validation::{parse_records, validate_shape};

use super::error::{
    PublishSummary, Result, ScheduleError, ScheduleUiState, ScheduleValidation, TemplateApplication,
};

const COMPONENT: &str = "schedule";

/// File-backed owner of the schedule envelope.
///
/// Construct once at startup and share by reference. Reads migrate legacy
/// documents in place and are cached by the file's mtime.
pub struct ScheduleStore {
    file: DocumentFile,
    cache: DocumentCache<ScheduleEnvelope>,
    events: EventLog,
}

impl ScheduleStore {
    pub fn new(schedule_path: impl Into<PathBuf>, event_log_path: impl Into<PathBuf>) -> Self {
        Self {
            file: DocumentFile::new(schedule_path),
            cache: DocumentCache::new(),
            events: EventLog::new(event_log_path),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.paths.schedule_path, &config.paths.event_log_path)
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// The stored envelope, bootstrapping or migrating it on first access.
    pub fn envelope(&self) -> Result<ScheduleEnvelope> {
        let mut slot = self.cache.lock();
        self.load_locked(&mut slot)
    }

    /// Stored schedules with their timeline and conflicts. Conflicts are
    /// reported, never fatal, on this path.
    pub fn get_ui_state(&self) -> Result<ScheduleUiState> {
        let envelope = self.envelope()?;
        let timeline = build_timeline(&envelope.schedules);
        let conflicts = detect_conflicts(&envelope.schedules, &timeline.blocks);
        if !conflicts.is_empty() {
            debug!(conflicts = conflicts.len(), "stored schedules have conflicts");
        }
        Ok(ScheduleUiState {
            envelope,
            timeline: timeline.blocks,
            skipped: timeline.skipped,
            conflicts,
        })
    }

    /// Check `records` as a save would, without writing anything.
    pub fn validate_schedules(&self, records: &[ScheduleRecord]) -> ScheduleValidation {
        let validation = validate_shape(records);
        let timeline = build_timeline(records);
        let conflicts = detect_conflicts(records, &timeline.blocks);
        ScheduleValidation {
            valid: validation.valid && !conflicts.iter().any(ScheduleConflict::is_hard),
            validation,
            conflicts,
            timeline: timeline.blocks,
            skipped: timeline.skipped,
        }
    }

    /// Replace the stored schedules. Invalid records or any hard conflict
    /// refuse the write and leave the file untouched.
    pub fn update_schedules(&self, records: Vec<ScheduleRecord>) -> Result<ScheduleEnvelope> {
        let envelope = self.save(records)?;
        self.events.emit(
            COMPONENT,
            "schedules_saved",
            json!({ "count": envelope.schedules.len() }),
        );
        info!(count = envelope.schedules.len(), "schedules saved");
        Ok(envelope)
    }

    /// [`update_schedules`](Self::update_schedules) plus a publish summary.
    pub fn publish_schedules(&self, records: Vec<ScheduleRecord>) -> Result<PublishSummary> {
        let envelope = self.save(records)?;
        let summary = PublishSummary {
            published_count: envelope.schedules.len(),
            published_at: Utc::now(),
            envelope,
        };
        self.events.emit(
            COMPONENT,
            "schedules_published",
            json!({
                "count": summary.published_count,
                "published_at": summary.published_at,
            }),
        );
        info!(count = summary.published_count, "schedules published");
        Ok(summary)
    }

    /// Expand a built-in template and report the conflicts its records would
    /// raise against the stored schedules. Nothing is persisted.
    pub fn apply_template(&self, request: &TemplateRequest) -> Result<TemplateApplication> {
        let records = expand_template(request);
        let validation = validate_shape(&records);
        if !validation.valid {
            return Err(ScheduleError::Validation(validation));
        }

        let mut combined = self.envelope()?.schedules;
        combined.extend(records.iter().cloned());
        let timeline = build_timeline(&combined);
        let conflicts: Vec<ScheduleConflict> = detect_conflicts(&combined, &timeline.blocks)
            .into_iter()
            .filter(|c| {
                c.schedule_ids
                    .iter()
                    .any(|id| records.iter().any(|r| &r.id == id))
            })
            .collect();

        self.events.emit(
            COMPONENT,
            "schedule_template_applied",
            json!({
                "template": request.kind,
                "timezone": request.timezone,
                "records": records.len(),
                "conflicts": conflicts.len(),
            }),
        );
        Ok(TemplateApplication { records, conflicts })
    }

    /// The same slot rendered as one-off, RRULE and cron specs.
    pub fn preview_spec(&self, request: &PreviewRequest) -> Result<SpecPreview> {
        preview_spec(request).map_err(ScheduleError::Validation)
    }

    // ── Writing ───────────────────────────────────────────────────

    fn save(&self, records: Vec<ScheduleRecord>) -> Result<ScheduleEnvelope> {
        let validation = validate_shape(&records);
        if !validation.valid {
            return Err(ScheduleError::Validation(validation));
        }

        let timeline = build_timeline(&records);
        let hard: Vec<ScheduleConflict> = detect_conflicts(&records, &timeline.blocks)
            .into_iter()
            .filter(ScheduleConflict::is_hard)
            .collect();
        if !hard.is_empty() {
            let kinds: Vec<&str> = hard.iter().map(|c| c.kind.as_str()).collect();
            self.events.emit(
                COMPONENT,
                "schedule_write_rejected",
                json!({ "conflicts": hard.len(), "kinds": kinds }),
            );
            warn!(conflicts = hard.len(), "schedule write rejected");
            return Err(ScheduleError::rejected(hard));
        }

        let envelope = ScheduleEnvelope::new(records);
        let mut slot = self.cache.lock();
        let outcome = match self.file.write_json(&envelope) {
            Ok(outcome) => outcome,
            Err(e) => {
                slot.clear();
                if let StoreError::WriteFailed { restored: true, .. } = &e {
                    self.events.emit(
                        COMPONENT,
                        "schedule_write_restored",
                        json!({ "path": self.file.path().display().to_string(), "error": e.to_string() }),
                    );
                }
                return Err(e.into());
            }
        };
        if let Some(backup) = &outcome.backup {
            self.events.emit(
                COMPONENT,
                "schedule_backup_created",
                json!({ "backup_path": backup.display().to_string() }),
            );
        }
        self.refill(&mut slot, &envelope);
        Ok(envelope)
    }

    // ── Loading ───────────────────────────────────────────────────

    fn load_locked(&self, slot: &mut CacheSlot<ScheduleEnvelope>) -> Result<ScheduleEnvelope> {
        let Some(modified) = self.file.modified()? else {
            let envelope = ScheduleEnvelope::empty();
            self.file.write_json(&envelope)?;
            self.events.emit(
                COMPONENT,
                "schedule_envelope_bootstrapped",
                json!({ "path": self.file.path().display().to_string() }),
            );
            info!(path = %self.file.path().display(), "created empty schedule envelope");
            self.refill(slot, &envelope);
            return Ok(envelope);
        };

        if let Some(envelope) = slot.fresh(modified) {
            return Ok(envelope);
        }

        let contents = self.file.read_to_string()?;
        let (envelope, steps, from_version) = self.parse_stored(&contents)?;
        let canonical = to_pretty_json(&envelope)?;
        if canonical == contents {
            debug!(path = %self.file.path().display(), "loaded schedules from disk");
            slot.fill(envelope.clone(), modified);
            return Ok(envelope);
        }

        let outcome = self.file.write_with_backup(&canonical)?;
        if let Some(backup) = &outcome.backup {
            self.events.emit(
                COMPONENT,
                "schedule_backup_created",
                json!({ "backup_path": backup.display().to_string() }),
            );
        }
        self.events.emit(
            COMPONENT,
            "schedule_migrated",
            json!({
                "from_version": from_version,
                "steps": steps,
                "records": envelope.schedules.len(),
            }),
        );
        info!(
            path = %self.file.path().display(),
            from_version,
            steps = steps.len(),
            "migrated stored schedules"
        );
        self.refill(slot, &envelope);
        Ok(envelope)
    }

    /// Migrate and check a stored document; anything unusable is `Corrupt`.
    fn parse_stored(&self, contents: &str) -> Result<(ScheduleEnvelope, Vec<String>, u32)> {
        let corrupt = |reason: String| {
            warn!(path = %self.file.path().display(), error = %reason, "stored schedules are corrupt");
            ScheduleError::Corrupt {
                path: self.file.path().to_path_buf(),
                reason,
            }
        };

        let value: Value =
            serde_json::from_str(contents).map_err(|e| corrupt(format!("parse error: {e}")))?;
        let (items, report) = migrate_document(value).map_err(corrupt)?;
        let records = parse_records(&Value::Array(items)).map_err(|v| corrupt(summary(&v)))?;
        let shape = validate_shape(&records);
        if !shape.valid {
            return Err(corrupt(summary(&shape)));
        }
        Ok((ScheduleEnvelope::new(records), report.steps, report.from_version))
    }

    fn refill(&self, slot: &mut CacheSlot<ScheduleEnvelope>, envelope: &ScheduleEnvelope) {
        match self.file.modified() {
            Ok(Some(modified)) => slot.fill(envelope.clone(), modified),
            Ok(None) => slot.clear(),
            Err(e) => {
                warn!(path = %self.file.path().display(), error = %e, "could not stat schedules after write");
                slot.clear();
            }
        }
    }
}

fn summary(result: &ValidationResult) -> String {
    format!("validation failed: {}", result.summary(3))
}
