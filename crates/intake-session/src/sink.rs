//! Persistence sinks
//!
//! A sink receives the two writes of a final submission: one beneficiary
//! row, then one row per member. Every write carries the session's
//! [`SubmissionKey`] so a sink can drop replays.

use crate::error::SinkError;
use crate::submit::{SubmissionKey, SubmissionPhase};
use intake_engine::{EntryId, SheetRow};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Destination for submitted rows
#[async_trait::async_trait]
pub trait PersistenceSink: Send + Sync {
    /// Append the beneficiary row
    async fn append_beneficiary(&self, key: &SubmissionKey, row: SheetRow) -> Result<(), SinkError>;

    /// Append every member row of one visit
    async fn append_member_records(
        &self,
        key: &SubmissionKey,
        entry_id: EntryId,
        rows: Vec<SheetRow>,
    ) -> Result<(), SinkError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    beneficiaries: Vec<SheetRow>,
    members: Vec<SheetRow>,
    seen: HashSet<(SubmissionPhase, SubmissionKey)>,
    failures: HashMap<SubmissionPhase, usize>,
}

impl MemoryState {
    /// Consume one injected failure for `phase`
    fn take_failure(&mut self, phase: SubmissionPhase) -> Result<(), SinkError> {
        match self.failures.get_mut(&phase) {
            Some(n) if *n > 0 => {
                *n -= 1;
                Err(SinkError::Rejected(format!("injected {phase} failure")))
            }
            _ => Ok(()),
        }
    }
}

/// In-memory sink; deduplicates by key per phase
#[derive(Debug, Default)]
pub struct MemorySink {
    state: Mutex<MemoryState>,
}

impl MemorySink {
    /// Empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `times` writes of `phase` fail
    pub fn fail_next(&self, phase: SubmissionPhase, times: usize) {
        self.state.lock().failures.insert(phase, times);
    }

    /// Stored beneficiary rows
    #[must_use]
    pub fn beneficiary_rows(&self) -> Vec<SheetRow> {
        self.state.lock().beneficiaries.clone()
    }

    /// Stored member rows
    #[must_use]
    pub fn member_rows(&self) -> Vec<SheetRow> {
        self.state.lock().members.clone()
    }
}

#[async_trait::async_trait]
impl PersistenceSink for MemorySink {
    async fn append_beneficiary(&self, key: &SubmissionKey, row: SheetRow) -> Result<(), SinkError> {
        let mut state = self.state.lock();
        state.take_failure(SubmissionPhase::Beneficiary)?;
        if !state.seen.insert((SubmissionPhase::Beneficiary, key.clone())) {
            tracing::debug!("Dropped duplicate beneficiary write for {}", key);
            return Ok(());
        }
        state.beneficiaries.push(row);
        Ok(())
    }

    async fn append_member_records(
        &self,
        key: &SubmissionKey,
        _entry_id: EntryId,
        rows: Vec<SheetRow>,
    ) -> Result<(), SinkError> {
        let mut state = self.state.lock();
        state.take_failure(SubmissionPhase::Members)?;
        if !state.seen.insert((SubmissionPhase::Members, key.clone())) {
            tracing::debug!("Dropped duplicate member write for {}", key);
            return Ok(());
        }
        state.members.extend(rows);
        Ok(())
    }
}

/// Beneficiary sheet file name
pub const BENEFICIARY_SHEET: &str = "beneficiaries.jsonl";
/// Member sheet file name
pub const MEMBER_SHEET: &str = "family-members.jsonl";

#[derive(Serialize)]
struct Line<'a> {
    #[serde(rename = "submissionKey")]
    key: &'a SubmissionKey,
    #[serde(flatten)]
    row: &'a SheetRow,
}

/// JSON-lines sink writing one file per sheet under a directory
#[derive(Debug, Clone)]
pub struct JsonlSink {
    dir: PathBuf,
}

impl JsonlSink {
    /// Sink rooted at `dir`; created on first write
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn append(&self, sheet: &str, key: &SubmissionKey, rows: &[SheetRow]) -> Result<(), SinkError> {
        let mut buf = String::new();
        for row in rows {
            buf.push_str(&serde_json::to_string(&Line { key, row })?);
            buf.push('\n');
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(sheet);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!("Appended {} rows to {}", rows.len(), path.display());
        Ok(())
    }
}

#[async_trait::async_trait]
impl PersistenceSink for JsonlSink {
    async fn append_beneficiary(&self, key: &SubmissionKey, row: SheetRow) -> Result<(), SinkError> {
        self.append(BENEFICIARY_SHEET, key, std::slice::from_ref(&row)).await
    }

    async fn append_member_records(
        &self,
        key: &SubmissionKey,
        _entry_id: EntryId,
        rows: Vec<SheetRow>,
    ) -> Result<(), SinkError> {
        self.append(MEMBER_SHEET, key, &rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SubmissionKey {
        SubmissionKey::for_entry(EntryId::new_v4())
    }

    #[tokio::test]
    async fn memory_sink_drops_replays() {
        let sink = MemorySink::new();
        let key = key();
        let row = SheetRow::new().with("a", "1");
        sink.append_beneficiary(&key, row.clone()).await.unwrap();
        sink.append_beneficiary(&key, row).await.unwrap();
        assert_eq!(sink.beneficiary_rows().len(), 1);
    }

    #[tokio::test]
    async fn memory_sink_injected_failures_run_out() {
        let sink = MemorySink::new();
        sink.fail_next(SubmissionPhase::Members, 1);
        let key = key();
        let rows = vec![SheetRow::new().with("a", "1")];
        let entry = EntryId::new_v4();
        assert!(sink.append_member_records(&key, entry, rows.clone()).await.is_err());
        sink.append_member_records(&key, entry, rows).await.unwrap();
        assert_eq!(sink.member_rows().len(), 1);
    }

    #[tokio::test]
    async fn jsonl_sink_writes_one_line_per_row() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlSink::new(dir.path().join("out"));
        let key = key();
        let rows = vec![SheetRow::new().with("name", "علي"), SheetRow::new().with("name", "سارة")];
        sink.append_member_records(&key, EntryId::new_v4(), rows).await.unwrap();

        let text = std::fs::read_to_string(dir.path().join("out").join(MEMBER_SHEET)).unwrap();
        let lines: Vec<serde_json::Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["name"], "سارة");
        assert_eq!(lines[0]["submissionKey"], key.as_str());
    }
}
