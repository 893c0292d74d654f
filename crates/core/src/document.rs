//! JSON documents on disk: backed-up writes and an mtime-keyed in-memory cache.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};

/// Serialize a document the way every persisted file is written:
/// pretty-printed with two-space indentation and a trailing newline.
pub fn to_pretty_json<T: Serialize>(value: &T) -> StoreResult<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

/// Outcome of a successful [`DocumentFile::write_with_backup`].
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    /// Copy of the previous file, if one existed.
    pub backup: Option<PathBuf>,
}

/// A single JSON document file with a sibling `backups/` directory.
#[derive(Debug, Clone)]
pub struct DocumentFile {
    path: PathBuf,
    backup_dir: PathBuf,
}

impl DocumentFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let backup_dir = path
            .parent()
            .map(|p| p.join("backups"))
            .unwrap_or_else(|| PathBuf::from("backups"));
        Self { path, backup_dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Modification time of the file, or `None` when it does not exist.
    pub fn modified(&self) -> io::Result<Option<SystemTime>> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(Some(meta.modified()?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn read_to_string(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }

    /// Copy the current file into the backup directory under a timestamped name.
    ///
    /// Returns `None` when there is nothing to back up.
    pub fn backup(&self, label: &str) -> StoreResult<Option<PathBuf>> {
        if !self.exists() {
            return Ok(None);
        }
        fs::create_dir_all(&self.backup_dir)?;

        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document.json");
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%6fZ");
        let mut target = self.backup_dir.join(format!("{file_name}.{label}.{stamp}"));
        let mut attempt = 1;
        while target.exists() {
            target = self
                .backup_dir
                .join(format!("{file_name}.{label}.{stamp}-{attempt}"));
            attempt += 1;
        }

        fs::copy(&self.path, &target)?;
        debug!(path = %self.path.display(), backup = %target.display(), "backed up document");
        Ok(Some(target))
    }

    /// Back up the current file, then replace it with `contents`.
    ///
    /// The new contents go through a temp file and a rename. If that fails the
    /// backup is copied back over the target before the error is returned.
    pub fn write_with_backup(&self, contents: &str) -> StoreResult<WriteOutcome> {
        let backup = self.backup("bak")?;

        if let Err(source) = self.write_atomic(contents) {
            let restored = match &backup {
                Some(b) => match fs::copy(b, &self.path) {
                    Ok(_) => {
                        warn!(path = %self.path.display(), backup = %b.display(), error = %source, "write failed, restored previous version");
                        true
                    }
                    Err(e) => {
                        warn!(path = %self.path.display(), error = %e, "write failed and restore from backup failed");
                        false
                    }
                },
                None => false,
            };
            return Err(StoreError::WriteFailed {
                path: self.path.clone(),
                source,
                restored,
            });
        }

        info!(path = %self.path.display(), "wrote document");
        Ok(WriteOutcome { backup })
    }

    /// Pretty-print `value` and write it with [`write_with_backup`](Self::write_with_backup).
    pub fn write_json<T: Serialize>(&self, value: &T) -> StoreResult<WriteOutcome> {
        let contents = to_pretty_json(value)?;
        self.write_with_backup(&contents)
    }

    fn write_atomic(&self, contents: &str) -> io::Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document.json");
        let tmp_path = parent.join(format!(".{file_name}.tmp"));

        fs::write(&tmp_path, contents)?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        Ok(())
    }
}

/// A cached document paired with the file mtime it was loaded at.
#[derive(Debug, Clone)]
pub struct Cached<T> {
    pub value: T,
    pub modified: SystemTime,
}

/// Contents of a [`DocumentCache`] while its lock is held.
#[derive(Debug)]
pub struct CacheSlot<T>(Option<Cached<T>>);

impl<T: Clone> CacheSlot<T> {
    /// Cached value if it was loaded at exactly `modified`.
    pub fn fresh(&self, modified: SystemTime) -> Option<T> {
        self.0
            .as_ref()
            .filter(|c| c.modified == modified)
            .map(|c| c.value.clone())
    }

    pub fn fill(&mut self, value: T, modified: SystemTime) {
        self.0 = Some(Cached { value, modified });
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

/// Mutex-guarded document cache invalidated by the backing file's mtime.
///
/// Callers hold the guard for the whole read-validate-write sequence so that
/// readers and writers in one process see a consistent snapshot.
#[derive(Debug)]
pub struct DocumentCache<T> {
    slot: Mutex<CacheSlot<T>>,
}

impl<T> DocumentCache<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(CacheSlot(None)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, CacheSlot<T>> {
        self.slot.lock().unwrap_or_else(|poisoned| {
            warn!("document cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl<T> Default for DocumentCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn write_creates_file_without_backup() {
        let dir = tempfile::tempdir().unwrap();
        let doc = DocumentFile::new(dir.path().join("doc.json"));
        let outcome = doc.write_json(&serde_json::json!({"a": 1})).unwrap();
        assert!(outcome.backup.is_none());
        assert_eq!(doc.read_to_string().unwrap(), "{\n  \"a\": 1\n}\n");
    }

    #[test]
    fn second_write_backs_up_previous_version() {
        let dir = tempfile::tempdir().unwrap();
        let doc = DocumentFile::new(dir.path().join("doc.json"));
        doc.write_with_backup("first\n").unwrap();
        let outcome = doc.write_with_backup("second\n").unwrap();

        let backup = outcome.backup.expect("backup path");
        assert!(backup.starts_with(doc.backup_dir()));
        assert_eq!(fs::read_to_string(backup).unwrap(), "first\n");
        assert_eq!(doc.read_to_string().unwrap(), "second\n");
    }

    #[test]
    fn failed_write_restores_previous_version() {
        let dir = tempfile::tempdir().unwrap();
        let doc = DocumentFile::new(dir.path().join("doc.json"));
        doc.write_with_backup("original\n").unwrap();

        // A directory where the temp file should go makes the write fail.
        fs::create_dir(dir.path().join(".doc.json.tmp")).unwrap();

        let err = doc.write_with_backup("replacement\n").unwrap_err();
        match err {
            StoreError::WriteFailed { restored, .. } => assert!(restored),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(doc.read_to_string().unwrap(), "original\n");
    }

    #[test]
    fn modified_is_none_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let doc = DocumentFile::new(dir.path().join("missing.json"));
        assert!(doc.modified().unwrap().is_none());
        assert!(doc.backup("bak").unwrap().is_none());
    }

    #[test]
    fn cache_hits_only_on_matching_mtime() {
        let cache: DocumentCache<String> = DocumentCache::new();
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
        let t1 = t0 + Duration::from_secs(1);

        let mut slot = cache.lock();
        assert!(slot.is_empty());
        slot.fill("v0".to_string(), t0);
        assert_eq!(slot.fresh(t0).as_deref(), Some("v0"));
        assert!(slot.fresh(t1).is_none());
        slot.clear();
        assert!(slot.fresh(t0).is_none());
    }
}
