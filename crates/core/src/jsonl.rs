//! Append-only newline-delimited JSON log with a chunked backward tail reader.
//!
//! Records are appended one per line and never rewritten. Reading the last N
//! lines scans the file backwards in fixed [`TAIL_CHUNK_SIZE`] chunks, so the
//! bytes read are proportional to the tail rather than to the file size.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::StoreResult;

/// Size of each backward read during a tail scan.
pub const TAIL_CHUNK_SIZE: u64 = 8 * 1024;

/// Result of a tail read: the parsed records plus how many lines were malformed.
#[derive(Debug, Clone, PartialEq)]
pub struct TailRead<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

/// File-backed NDJSON log of `T` records.
///
/// Appends within one process are serialized through a mutex so concurrent
/// writers never interleave partial lines.
pub struct JsonlLog<T> {
    path: PathBuf,
    append_lock: Mutex<()>,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonlLog<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append_lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the last `limit` raw lines of the log in file order.
    pub fn tail_lines(&self, limit: usize) -> io::Result<Vec<String>> {
        tail_lines(&self.path, limit)
    }
}

impl<T: Serialize> JsonlLog<T> {
    /// Serialize `record` and append it as a single line.
    pub fn append(&self, record: &T) -> StoreResult<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self
            .append_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

impl<T: DeserializeOwned> JsonlLog<T> {
    /// Parse the last `limit` lines. Malformed lines are skipped and counted.
    pub fn tail(&self, limit: usize) -> io::Result<TailRead<T>> {
        let lines = self.tail_lines(limit)?;
        let mut records = Vec::with_capacity(lines.len());
        let mut skipped = 0usize;
        for line in lines {
            if line.trim().is_empty() {
                skipped += 1;
                continue;
            }
            match serde_json::from_str::<T>(&line) {
                Ok(record) => records.push(record),
                Err(_) => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(
                path = %self.path.display(),
                skipped,
                "skipped malformed lines while reading log tail"
            );
        }
        Ok(TailRead { records, skipped })
    }
}

/// Return the last `limit` lines of the file at `path`, in file order.
///
/// Lines are split on `\n` with a trailing `\r` stripped, matching what a
/// whole-file `lines()` would yield. A missing file reads as empty.
pub fn tail_lines(path: &Path, limit: usize) -> io::Result<Vec<String>> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let len = file.metadata()?.len();
    let mut pos = len;
    // Newest chunk first; stitched once after the loop.
    let mut chunks: Vec<Vec<u8>> = Vec::new();
    let mut newlines = 0usize;

    // One newline more than `limit` guarantees the oldest wanted line is complete.
    while pos > 0 && newlines <= limit {
        let read = TAIL_CHUNK_SIZE.min(pos);
        pos -= read;
        file.seek(SeekFrom::Start(pos))?;
        let mut chunk = vec![0u8; read as usize];
        file.read_exact(&mut chunk)?;
        newlines += chunk.iter().filter(|b| **b == b'\n').count();
        chunks.push(chunk);
    }
    let buf: Vec<u8> = chunks.into_iter().rev().flatten().collect();

    let mut segments: Vec<&[u8]> = buf.split(|b| *b == b'\n').collect();
    if buf.last() == Some(&b'\n') {
        segments.pop();
    }
    if pos > 0 && !segments.is_empty() {
        // Partial first line cut by the chunk boundary.
        segments.remove(0);
    }

    let start = segments.len().saturating_sub(limit);
    Ok(segments[start..]
        .iter()
        .map(|seg| {
            let seg: &[u8] = seg;
            let seg = seg.strip_suffix(b"\r").unwrap_or(seg);
            String::from_utf8_lossy(seg).into_owned()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Entry {
        seq: u32,
        note: String,
    }

    fn temp_log() -> (tempfile::TempDir, JsonlLog<Entry>) {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonlLog::new(dir.path().join("logs").join("events.jsonl"));
        (dir, log)
    }

    #[test]
    fn append_creates_parent_and_writes_lines() {
        let (_dir, log) = temp_log();
        log.append(&Entry { seq: 1, note: "a".into() }).unwrap();
        log.append(&Entry { seq: 2, note: "b".into() }).unwrap();

        let raw = fs::read_to_string(log.path()).unwrap();
        assert_eq!(raw.lines().count(), 2);
        assert!(raw.ends_with('\n'));
    }

    #[test]
    fn tail_of_missing_file_is_empty() {
        let (_dir, log) = temp_log();
        assert!(log.tail_lines(10).unwrap().is_empty());
        assert!(log.tail(10).unwrap().records.is_empty());
    }

    #[test]
    fn tail_returns_last_records_in_file_order() {
        let (_dir, log) = temp_log();
        for seq in 0..20 {
            log.append(&Entry { seq, note: format!("n{seq}") }).unwrap();
        }
        let read = log.tail(3).unwrap();
        let seqs: Vec<u32> = read.records.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![17, 18, 19]);
        assert_eq!(read.skipped, 0);
    }

    #[test]
    fn tail_skips_malformed_lines() {
        let (_dir, log) = temp_log();
        log.append(&Entry { seq: 1, note: "ok".into() }).unwrap();
        {
            let mut f = OpenOptions::new().append(true).open(log.path()).unwrap();
            f.write_all(b"{not json\n").unwrap();
        }
        log.append(&Entry { seq: 2, note: "ok".into() }).unwrap();

        let read = log.tail(10).unwrap();
        assert_eq!(read.records.len(), 2);
        assert_eq!(read.skipped, 1);
    }

    #[test]
    fn tail_limit_larger_than_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.jsonl");
        fs::write(&path, "a\nb\nc\n").unwrap();
        assert_eq!(tail_lines(&path, 100).unwrap(), vec!["a", "b", "c"]);
        assert!(tail_lines(&path, 0).unwrap().is_empty());
    }

    #[test]
    fn tail_without_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("open.jsonl");
        fs::write(&path, "a\nb\nc").unwrap();
        assert_eq!(tail_lines(&path, 2).unwrap(), vec!["b", "c"]);
    }

    #[test]
    fn tail_line_longer_than_several_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.jsonl");
        let wide = "w".repeat(3 * TAIL_CHUNK_SIZE as usize + 11);
        fs::write(&path, format!("first\n{wide}\nlast\n")).unwrap();

        assert_eq!(tail_lines(&path, 2).unwrap(), vec![wide.clone(), "last".to_string()]);
        assert_eq!(tail_lines(&path, 3).unwrap(), vec!["first".to_string(), wide, "last".to_string()]);
    }

    #[test]
    fn tail_spanning_many_chunks_matches_full_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.jsonl");
        let mut content = String::new();
        for i in 0..5_000 {
            // Varying widths so lines straddle chunk boundaries.
            content.push_str(&format!("{{\"seq\":{i},\"pad\":\"{}\"}}\n", "x".repeat(i % 37)));
        }
        fs::write(&path, &content).unwrap();

        let expected: Vec<&str> = content.lines().collect();
        for limit in [1usize, 7, 250, 4_999, 5_000, 6_000] {
            let got = tail_lines(&path, limit).unwrap();
            let start = expected.len().saturating_sub(limit);
            assert_eq!(got, expected[start..].to_vec(), "limit {limit}");
        }
    }
}
