use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::app_dirs::AppDirs;
use crate::error::StoreResult;
use crate::metrics::mean;
use crate::session::StatsSnapshot;

/// One completed test.
///
/// The stats are flattened so a bare stats object (the older stored shape)
/// still parses; the extra fields are then `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub stats: StatsSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Local>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<String>,
}

impl HistoryEntry {
    pub fn new(stats: StatsSnapshot, lesson_id: Option<String>) -> Self {
        Self {
            stats,
            completed_at: Some(Local::now()),
            lesson_id,
        }
    }
}

/// Aggregate figures over a history.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HistorySummary {
    pub tests: usize,
    pub average_wpm: f64,
    pub best_wpm: u32,
    pub average_accuracy: f64,
    pub total_secs: u64,
}

pub fn summarize(entries: &[HistoryEntry]) -> HistorySummary {
    let wpms: Vec<f64> = entries.iter().map(|e| e.stats.wpm as f64).collect();
    let accuracies: Vec<f64> = entries.iter().map(|e| e.stats.accuracy as f64).collect();

    HistorySummary {
        tests: entries.len(),
        average_wpm: mean(&wpms).unwrap_or(0.0),
        best_wpm: entries.iter().map(|e| e.stats.wpm).max().unwrap_or(0),
        average_accuracy: mean(&accuracies).unwrap_or(0.0),
        total_secs: entries.iter().map(|e| e.stats.time).sum(),
    }
}

/// Append-only record of completed tests.
pub trait HistoryStore {
    fn load(&self) -> Vec<HistoryEntry>;
    fn append(&self, entry: HistoryEntry) -> StoreResult<Vec<HistoryEntry>>;
    fn clear(&self) -> StoreResult<()>;
}

#[derive(Debug, Clone)]
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::history_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, entries: &[HistoryEntry]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(entries)?)?;
        Ok(())
    }
}

impl Default for JsonHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore for JsonHistoryStore {
    fn load(&self) -> Vec<HistoryEntry> {
        let Ok(bytes) = fs::read(&self.path) else {
            return Vec::new();
        };
        match serde_json::from_slice::<Vec<HistoryEntry>>(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "discarding unreadable history");
                Vec::new()
            }
        }
    }

    /// Returns the full history including the new entry.
    fn append(&self, entry: HistoryEntry) -> StoreResult<Vec<HistoryEntry>> {
        let mut entries = self.load();
        entries.push(entry);
        self.write(&entries)?;
        debug!(entries = entries.len(), "history saved");
        Ok(entries)
    }

    fn clear(&self) -> StoreResult<()> {
        self.write(&[])
    }
}
