//! JSONL journal writer - append-only, one file per day

use crate::error::EventError;
use crate::event::ClearanceEvent;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only JSONL journal
pub struct EventStore {
    base_path: PathBuf,
    current_file: Option<BufWriter<File>>,
    current_date: Option<String>,
}

impl EventStore {
    /// Open a journal directory, creating it if needed
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self, EventError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;

        Ok(Self {
            base_path,
            current_file: None,
            current_date: None,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Append one event; the line is flushed before returning
    pub fn append(&mut self, event: &ClearanceEvent) -> Result<(), EventError> {
        let date = event.timestamp().format("%Y-%m-%d").to_string();

        if self.current_date.as_ref() != Some(&date) {
            self.rotate_file(&date)?;
        }

        if let Some(ref mut writer) = self.current_file {
            let json = serde_json::to_string(event)?;
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }

        tracing::debug!(
            kind = event.kind(),
            subject_id = event.subject_id(),
            "Journal event appended"
        );
        Ok(())
    }

    fn rotate_file(&mut self, date: &str) -> Result<(), EventError> {
        if let Some(ref mut writer) = self.current_file {
            writer.flush()?;
        }

        let file_path = self.base_path.join(format!("{}.jsonl", date));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)?;

        self.current_file = Some(BufWriter::new(file));
        self.current_date = Some(date.to_string());

        Ok(())
    }

    /// Journal files, oldest first
    pub fn list_files(&self) -> Result<Vec<PathBuf>, EventError> {
        let mut files = Vec::new();

        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "jsonl") {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Flush and close the current file
    pub fn close(&mut self) -> Result<(), EventError> {
        if let Some(ref mut writer) = self.current_file {
            writer.flush()?;
        }
        self.current_file = None;
        self.current_date = None;
        Ok(())
    }
}

impl Drop for EventStore {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use clearance_core::{DecisionRequest, Department, Subject};
    use tempfile::TempDir;

    #[test]
    fn test_append_creates_daily_file() {
        let dir = TempDir::new().unwrap();
        let mut store = EventStore::new(dir.path().join("journal")).unwrap();

        let event = ClearanceEvent::subject_registered(Subject::new("S1", "Ada", "ada@x.edu"));
        store.append(&event).unwrap();

        let files = store.list_files().unwrap();
        assert_eq!(files.len(), 1);
        let expected = format!("{}.jsonl", event.timestamp().format("%Y-%m-%d"));
        assert!(files[0].ends_with(expected));

        let content = fs::read_to_string(&files[0]).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_rotates_on_date_change() {
        let dir = TempDir::new().unwrap();
        let mut store = EventStore::new(dir.path()).unwrap();

        for day in [1, 1, 2] {
            let event = ClearanceEvent::RequestSubmitted {
                timestamp: Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap(),
                request: DecisionRequest::new("S1", Department::Finance),
            };
            store.append(&event).unwrap();
        }

        let files = store.list_files().unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("2024-03-01.jsonl"));
        assert!(files[1].ends_with("2024-03-02.jsonl"));
    }

    #[test]
    fn test_reopen_appends() {
        let dir = TempDir::new().unwrap();
        let event = ClearanceEvent::subject_registered(Subject::new("S1", "Ada", "ada@x.edu"));

        {
            let mut store = EventStore::new(dir.path()).unwrap();
            store.append(&event).unwrap();
        }
        let mut store = EventStore::new(dir.path()).unwrap();
        store.append(&event).unwrap();

        let files = store.list_files().unwrap();
        let content = fs::read_to_string(&files[0]).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
