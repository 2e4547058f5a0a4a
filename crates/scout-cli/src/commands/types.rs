// SPDX-License-Identifier: Apache-2.0

//! Result types returned by command handlers.
//!
//! Command handlers return data; rendering lives in `output`.

use scout_core::{HistoryRecord, Project, RateLimitStatus, ScanReport, ScoredIssue};
use serde::Serialize;

/// Result from the find command.
#[derive(Debug, Clone, Serialize)]
pub struct FindResult {
    /// Ranked issues, best first.
    pub issues: Vec<ScoredIssue>,
    /// Projects whose fetch completed.
    pub projects_scanned: usize,
    /// Projects whose fetch failed.
    pub projects_failed: usize,
    /// Issues skipped because they were shown before.
    pub issues_seen: usize,
    /// The scan was interrupted.
    pub cancelled: bool,
}

impl FindResult {
    /// Builds the result from a scan report and its ranked issues.
    pub fn new(report: &ScanReport, issues: Vec<ScoredIssue>) -> Self {
        Self {
            issues,
            projects_scanned: report.projects_scanned,
            projects_failed: report.projects_failed,
            issues_seen: report.issues_seen,
            cancelled: report.cancelled,
        }
    }
}

/// Result from the projects command.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectsResult {
    /// Matching catalog projects, most starred first.
    pub projects: Vec<Project>,
}

/// A recorded issue with its project's current star count.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    /// The stored record.
    #[serde(flatten)]
    pub record: HistoryRecord,
    /// Stars from the catalog; `None` once the project is no longer listed.
    pub stars: Option<u32>,
}

/// Result from the history command.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResult {
    /// Recorded issues, best first.
    pub records: Vec<HistoryEntry>,
}

/// Result from the rate-limit command.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitResult {
    /// Current budget.
    #[serde(flatten)]
    pub status: RateLimitStatus,
    /// Below the warning threshold.
    pub low: bool,
}
