//! JSONL journal store - append-only writer

use crate::error::EventError;
use crate::event::AccountEvent;
use crate::reader::EventReader;
use crate::record::JournalRecord;
use chrono::Utc;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only, hash-chained JSONL journal
///
/// One file per UTC day (`YYYY-MM-DD.jsonl`). Reopening a directory resumes
/// the chain from its last record.
pub struct EventStore {
    base_path: PathBuf,
    current_file: Option<BufWriter<File>>,
    current_date: Option<String>,
    last: Option<JournalRecord>,
}

impl EventStore {
    /// Open (or create) a journal directory
    pub fn open(base_path: impl AsRef<Path>) -> Result<Self, EventError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;

        let last = EventReader::from_directory(&base_path)?.last_record()?;

        Ok(Self {
            base_path,
            current_file: None,
            current_date: None,
            last,
        })
    }

    /// Seal an event onto the chain and persist it
    pub fn append(&mut self, event: AccountEvent) -> Result<JournalRecord, EventError> {
        let record = JournalRecord::seal(self.last.as_ref(), event, Utc::now())?;
        let date = record.timestamp.format("%Y-%m-%d").to_string();

        if self.current_date.as_ref() != Some(&date) {
            self.rotate_file(&date)?;
        }

        if let Some(ref mut writer) = self.current_file {
            let json = serde_json::to_string(&record)?;
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }

        tracing::debug!(
            sequence = record.sequence,
            kind = record.event.kind(),
            "Journal record appended"
        );

        self.last = Some(record.clone());
        Ok(record)
    }

    /// Rotate to a new file for the given date
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

    /// Sequence of the last record, 0 when empty
    pub fn last_sequence(&self) -> u64 {
        self.last.as_ref().map_or(0, |r| r.sequence)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
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
