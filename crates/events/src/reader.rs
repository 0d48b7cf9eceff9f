//! JSONL journal reader - sequential reader for replay

use crate::error::EventError;
use crate::event::ClearanceEvent;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Reads journal files in date order
pub struct EventReader {
    files: Vec<PathBuf>,
}

impl EventReader {
    /// Collect the journal files of a directory (a missing directory is empty)
    pub fn from_directory(path: impl AsRef<Path>) -> Result<Self, EventError> {
        let path = path.as_ref();
        let mut files = Vec::new();

        if path.exists() {
            for entry in std::fs::read_dir(path)? {
                let file_path = entry?.path();
                if file_path.extension().map_or(false, |ext| ext == "jsonl") {
                    files.push(file_path);
                }
            }
        }

        files.sort();

        Ok(Self { files })
    }

    /// Every event, oldest file first, in append order within a file
    pub fn read_all(&self) -> Result<Vec<ClearanceEvent>, EventError> {
        let mut events = Vec::new();

        for file_path in &self.files {
            let reader = BufReader::new(File::open(file_path)?);

            for (index, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let event = serde_json::from_str(&line).map_err(|e| EventError::CorruptLine {
                    file: file_path.display().to_string(),
                    line: index + 1,
                    reason: e.to_string(),
                })?;
                events.push(event);
            }
        }

        tracing::debug!(files = self.files.len(), events = events.len(), "Journal read");
        Ok(events)
    }

    /// Number of non-empty lines across all files
    pub fn count(&self) -> Result<usize, EventError> {
        let mut count = 0;

        for file_path in &self.files {
            let reader = BufReader::new(File::open(file_path)?);
            for line in reader.lines() {
                if !line?.trim().is_empty() {
                    count += 1;
                }
            }
        }

        Ok(count)
    }
}
