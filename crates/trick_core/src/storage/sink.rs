//! Where records go after judging.
//!
//! A sink receives every row of a judged attempt: the session (written when
//! capture starts and again with the verdict), the sampled keypoints, the
//! feature window and the verdict. Sinks are append-only; a later session row
//! with the same id supersedes an earlier one.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use super::records::{FeatureRecord, KeypointRecord, SessionRecord, StoredRecord, ValidationRecord};
use crate::error::{ArbitrationError, Result};

pub trait RecordSink {
    fn store(&mut self, record: StoredRecord) -> Result<()>;

    fn save_session(&mut self, session: &SessionRecord) -> Result<()> {
        self.store(StoredRecord::Session(session.clone()))
    }

    fn save_keypoints(&mut self, keypoints: &[KeypointRecord]) -> Result<()> {
        for record in keypoints {
            self.store(StoredRecord::Keypoints(record.clone()))?;
        }
        Ok(())
    }

    fn save_features(&mut self, features: &FeatureRecord) -> Result<()> {
        self.store(StoredRecord::Features(features.clone()))
    }

    fn save_validation(&mut self, validation: &ValidationRecord) -> Result<()> {
        self.store(StoredRecord::Validation(validation.clone()))
    }
}

/// Keeps records in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Vec<StoredRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything stored, oldest first.
    pub fn records(&self) -> &[StoredRecord] {
        &self.records
    }

    pub fn validations(&self) -> impl Iterator<Item = &ValidationRecord> {
        self.records.iter().filter_map(|r| match r {
            StoredRecord::Validation(v) => Some(v),
            _ => None,
        })
    }

    /// Most recent row for a session.
    pub fn session(&self, id: Uuid) -> Option<&SessionRecord> {
        latest_session(&self.records, id)
    }
}

impl RecordSink for MemorySink {
    fn store(&mut self, record: StoredRecord) -> Result<()> {
        self.records.push(record);
        Ok(())
    }
}

/// Most recent session row with `id` in an append-only log.
pub fn latest_session(records: &[StoredRecord], id: Uuid) -> Option<&SessionRecord> {
    records.iter().rev().find_map(|r| match r {
        StoredRecord::Session(s) if s.id == id => Some(s),
        _ => None,
    })
}

/// Appends one JSON object per line, tagged with its table.
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    /// Creates missing parent directories; the file itself is created on
    /// first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record back, oldest first.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<StoredRecord>> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let mut records = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line)
                .map_err(|e| ArbitrationError::Storage(format!("line {}: {}", line_no + 1, e)))?;
            records.push(record);
        }
        Ok(records)
    }
}

impl RecordSink for JsonLinesSink {
    fn store(&mut self, record: StoredRecord) -> Result<()> {
        let line = serde_json::to_string(&record)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", line)?;
        debug!(path = %self.path.display(), table = record.table(), session = %record.session_id(), "record stored");
        Ok(())
    }

    fn save_keypoints(&mut self, keypoints: &[KeypointRecord]) -> Result<()> {
        if keypoints.is_empty() {
            return Ok(());
        }
        let mut buf = String::new();
        for record in keypoints {
            buf.push_str(&serde_json::to_string(&StoredRecord::Keypoints(record.clone()))?);
            buf.push('\n');
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(buf.as_bytes())?;
        debug!(path = %self.path.display(), frames = keypoints.len(), "keypoints stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::SessionState;
    use crate::models::{FrameSample, TrickValidation};
    use tempfile::tempdir;

    fn verdict(session_id: Uuid, trick: &str) -> ValidationRecord {
        ValidationRecord::from_validation(session_id, trick, &TrickValidation::insufficient_data("short"))
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let mut sink = MemorySink::new();
        sink.save_validation(&verdict(Uuid::new_v4(), "ollie")).unwrap();
        sink.save_validation(&verdict(Uuid::new_v4(), "kickflip")).unwrap();
        let tricks: Vec<_> = sink.validations().map(|r| r.trick_requested.as_str()).collect();
        assert_eq!(tricks, vec!["ollie", "kickflip"]);
    }

    #[test]
    fn test_memory_sink_latest_session_row_wins() {
        let mut sink = MemorySink::new();
        let mut session = SessionRecord::new("heelflip");
        sink.save_session(&session).unwrap();
        session.complete(&TrickValidation::insufficient_data("short"));
        sink.save_session(&session).unwrap();

        assert_eq!(sink.records().len(), 2);
        assert_eq!(sink.session(session.id).map(|s| s.state), Some(SessionState::Failed));
        assert!(sink.session(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_json_lines_stores_every_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/attempts.jsonl");

        let mut session = SessionRecord::new("ollie");
        let frames = vec![FrameSample::new(0, 0.0), FrameSample::new(1, 66.0)];
        let keypoints: Vec<_> = frames.iter().map(|f| KeypointRecord::from_frame(session.id, f)).collect();
        let window = crate::features::FeatureWindow::from_sequence(&frames).unwrap();
        let features = FeatureRecord::from_window(session.id, &window);
        let validation = verdict(session.id, "ollie");

        let mut sink = JsonLinesSink::open(&path).unwrap();
        sink.save_session(&session).unwrap();
        sink.save_keypoints(&keypoints).unwrap();
        sink.save_features(&features).unwrap();
        session.complete(&TrickValidation::insufficient_data("short"));
        sink.save_session(&session).unwrap();
        sink.save_validation(&validation).unwrap();

        let back = JsonLinesSink::read_all(&path).unwrap();
        let tables: Vec<_> = back.iter().map(StoredRecord::table).collect();
        assert_eq!(tables, vec!["session", "keypoints", "keypoints", "features", "session", "validation"]);
        assert!(back.iter().all(|r| r.session_id() == session.id));
        assert_eq!(latest_session(&back, session.id).map(|s| s.state), Some(SessionState::Failed));
        assert_eq!(back[5], StoredRecord::Validation(validation));
    }

    #[test]
    fn test_json_lines_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("validations.jsonl");

        let first = verdict(Uuid::new_v4(), "ollie");
        let second = verdict(Uuid::new_v4(), "heelflip");
        let mut sink = JsonLinesSink::open(&path).unwrap();
        sink.save_validation(&first).unwrap();
        sink.save_validation(&second).unwrap();

        // A second sink on the same file keeps appending
        let mut again = JsonLinesSink::open(&path).unwrap();
        again.save_validation(&first).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);

        let back = JsonLinesSink::read_all(&path).unwrap();
        assert_eq!(
            back,
            vec![
                StoredRecord::Validation(first.clone()),
                StoredRecord::Validation(second),
                StoredRecord::Validation(first)
            ]
        );
    }

    #[test]
    fn test_corrupt_line_is_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        fs::write(&path, "{\"not\": \"a record\"}\n").unwrap();

        let err = JsonLinesSink::read_all(&path).unwrap_err();
        assert!(matches!(err, ArbitrationError::Storage(ref msg) if msg.starts_with("line 1")));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = JsonLinesSink::read_all(dir.path().join("absent.jsonl")).unwrap_err();
        assert!(matches!(err, ArbitrationError::Io(_)));
    }
}
