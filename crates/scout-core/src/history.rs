// SPDX-License-Identifier: Apache-2.0

//! Discovery history.
//!
//! Stores every emitted issue in `~/.local/share/scout/history.json`, keyed
//! by `owner/name/number`. Recording is best-effort: failures are logged by
//! the scheduler and never fail a run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ScoutError;
use crate::scoring::ScoredIssue;
use crate::storage::{read_json, write_json_atomic};

/// A single discovered issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRecord {
    /// Seen key of the issue, `owner/name/number`.
    pub id: String,
    /// Issue title.
    pub title: String,
    /// Browser URL.
    pub url: String,
    /// Repository in "owner/name" format.
    pub project: String,
    /// Project category.
    pub category: String,
    /// Score at discovery time.
    pub score: f64,
    /// Comment count at discovery time.
    pub comments: u32,
    /// Label names.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Issue creation time.
    pub created_at: DateTime<Utc>,
    /// When Scout first emitted the issue.
    pub discovered_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// Builds a record for an issue discovered at `discovered_at`.
    #[must_use]
    pub fn from_issue(issue: &ScoredIssue, discovered_at: DateTime<Utc>) -> Self {
        Self {
            id: issue.seen_key().to_string(),
            title: issue.title.clone(),
            url: issue.url.clone(),
            project: issue.project.full_name(),
            category: issue.category.clone(),
            score: issue.score,
            comments: issue.comments,
            labels: issue.labels.clone(),
            created_at: issue.created_at,
            discovered_at,
        }
    }
}

/// Container for all history records.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct HistoryData {
    /// Records in insertion order.
    pub records: Vec<HistoryRecord>,
}

/// Durable storage for discovery history.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Adds `record` unless one with the same id exists.
    ///
    /// Returns `true` if the record was added.
    async fn insert_if_absent(&self, record: HistoryRecord) -> Result<bool, ScoutError>;

    /// Adds every record whose id is not stored yet.
    ///
    /// Returns the number of records added.
    async fn insert_all(&self, records: Vec<HistoryRecord>) -> Result<usize, ScoutError> {
        let mut added = 0;
        for record in records {
            if self.insert_if_absent(record).await? {
                added += 1;
            }
        }
        Ok(added)
    }
}

/// [`HistoryStore`] backed by a JSON file.
#[derive(Debug)]
pub struct JsonHistoryStore {
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl JsonHistoryStore {
    /// File name inside the data directory.
    pub const FILE_NAME: &'static str = "history.json";

    /// Store at an explicit path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Store at `history.json` inside `data_dir`.
    #[must_use]
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(Self::FILE_NAME))
    }

    /// Loads all records.
    ///
    /// # Errors
    ///
    /// Returns `ScoutError::Storage` if the file cannot be read or parsed.
    pub async fn load(&self) -> Result<HistoryData, ScoutError> {
        let _guard = self.lock.lock().await;
        read_json(&self.path).await
    }

    /// The `limit` highest-scored records, best first.
    ///
    /// # Errors
    ///
    /// Returns `ScoutError::Storage` if the file cannot be read or parsed.
    pub async fn top(&self, limit: usize) -> Result<Vec<HistoryRecord>, ScoutError> {
        let mut records = self.load().await?.records;
        records.sort_by(|a, b| b.score.total_cmp(&a.score));
        records.truncate(limit);
        Ok(records)
    }
}

#[async_trait]
impl HistoryStore for JsonHistoryStore {
    async fn insert_if_absent(&self, record: HistoryRecord) -> Result<bool, ScoutError> {
        let _guard = self.lock.lock().await;
        let mut data: HistoryData = read_json(&self.path).await?;

        if data.records.iter().any(|r| r.id == record.id) {
            debug!(id = %record.id, "History record already present");
            return Ok(false);
        }

        data.records.push(record);
        write_json_atomic(&self.path, &data).await?;
        Ok(true)
    }

    async fn insert_all(&self, records: Vec<HistoryRecord>) -> Result<usize, ScoutError> {
        if records.is_empty() {
            return Ok(0);
        }
        let _guard = self.lock.lock().await;
        let mut data: HistoryData = read_json(&self.path).await?;

        let mut ids: HashSet<String> = data.records.iter().map(|r| r.id.clone()).collect();
        let before = data.records.len();
        data.records
            .extend(records.into_iter().filter(|r| ids.insert(r.id.clone())));
        let added = data.records.len() - before;

        if added > 0 {
            write_json_atomic(&self.path, &data).await?;
        }
        debug!(added, "Recorded history");
        Ok(added)
    }
}
