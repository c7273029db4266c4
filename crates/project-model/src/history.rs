//! Append-only record of pipeline runs.
//!
//! A run never reads or writes shared files for bookkeeping; the caller
//! passes a ledger by reference and the run appends exactly one record.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use shortsmith_common::error::Stage;

use crate::layout::VideoMode;

/// Outcome of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed,
}

/// What happened during one video-generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub game_name: String,
    pub safe_name: String,
    pub steam_url: Option<String>,
    pub mode: VideoMode,
    pub status: RunStatus,
    /// Final video path (completed runs only).
    pub output: Option<PathBuf>,
    /// Stage at which a failed run aborted.
    pub failed_stage: Option<Stage>,
    pub message: Option<String>,
    pub word_count: Option<usize>,
    pub duration_secs: Option<f64>,
    /// RFC 3339 timestamp.
    pub recorded_at: String,
}

/// Append-only store of run records.
pub trait RunLedger {
    /// Append a record. Records are never modified or removed.
    fn append(&mut self, record: RunRecord);

    /// All records in append order.
    fn records(&self) -> &[RunRecord];
}

/// In-memory ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunHistory {
    records: Vec<RunRecord>,
}

impl RunHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.status == RunStatus::Completed)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.status == RunStatus::Failed)
            .count()
    }

    /// Most recent record for a game.
    pub fn latest_for(&self, game_name: &str) -> Option<&RunRecord> {
        self.records.iter().rev().find(|r| r.game_name == game_name)
    }
}

impl RunLedger for RunHistory {
    fn append(&mut self, record: RunRecord) {
        tracing::debug!(
            game = %record.game_name,
            status = ?record.status,
            "Run recorded"
        );
        self.records.push(record);
    }

    fn records(&self) -> &[RunRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(game: &str, status: RunStatus) -> RunRecord {
        RunRecord {
            game_name: game.to_string(),
            safe_name: game.to_lowercase(),
            steam_url: None,
            mode: VideoMode::Standard,
            status,
            output: None,
            failed_stage: None,
            message: None,
            word_count: None,
            duration_secs: None,
            recorded_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_history_counts_and_latest() {
        let mut history = RunHistory::new();
        history.append(record("Satisfactory", RunStatus::Failed));
        history.append(record("Stellaris", RunStatus::Completed));
        history.append(record("Satisfactory", RunStatus::Completed));

        assert_eq!(history.len(), 3);
        assert_eq!(history.completed_count(), 2);
        assert_eq!(history.failed_count(), 1);
        assert_eq!(
            history.latest_for("Satisfactory").map(|r| r.status),
            Some(RunStatus::Completed)
        );
        assert!(history.latest_for("Factorio").is_none());
        assert_eq!(history.records()[0].status, RunStatus::Failed);
    }
}
