// SPDX-License-Identifier: Apache-2.0

//! Batched fetch, filter and score across many projects.
//!
//! Projects are processed in strictly sequential batches. Within a batch
//! every project is fetched concurrently through the shared
//! [`RateGovernor`]; survivors are scored and sent over a bounded queue to a
//! single collector task. The queue closes once every producer is done, and
//! the collector is awaited before results are read. Emitted issues are
//! written to history in one batch, and pending seen keys are flushed,
//! before [`BatchScheduler::run`] returns.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::catalog::Project;
use crate::config::SchedulerConfig;
use crate::error::ScoutError;
use crate::github::issues::{IssueSource, ListOptions};
use crate::governor::{RateGovernor, sleep_or_cancel};
use crate::history::{HistoryRecord, HistoryStore};
use crate::scoring::{ScoredIssue, ScoringEngine};
use crate::search::SearchConstraints;
use crate::seen::{SeenKey, SeenSetDeduper};

/// Outcome of a scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Emitted issues, unsorted.
    pub issues: Vec<ScoredIssue>,
    /// Projects whose fetch completed.
    pub projects_scanned: usize,
    /// Projects whose fetch failed.
    pub projects_failed: usize,
    /// Issues returned by successful fetches.
    pub issues_fetched: usize,
    /// Pull requests, assigned, closed and keyword-filtered issues.
    pub issues_filtered: usize,
    /// Issues skipped because their key was already seen.
    pub issues_seen: usize,
    /// Issues sent to the collector.
    pub issues_emitted: usize,
    /// The run stopped early because it was cancelled.
    pub cancelled: bool,
}

#[derive(Debug, Default)]
struct ProjectOutcome {
    failed: bool,
    cancelled: bool,
    fetched: usize,
    filtered: usize,
    seen: usize,
    emitted: usize,
}

impl ScanReport {
    fn record(&mut self, outcome: &ProjectOutcome) {
        if outcome.cancelled {
            self.cancelled = true;
            return;
        }
        if outcome.failed {
            self.projects_failed += 1;
        } else {
            self.projects_scanned += 1;
        }
        self.issues_fetched += outcome.fetched;
        self.issues_filtered += outcome.filtered;
        self.issues_seen += outcome.seen;
        self.issues_emitted += outcome.emitted;
    }
}

/// Per-run inputs shared by every project task.
struct RunContext<'a> {
    cancel: &'a CancellationToken,
    constraints: &'a SearchConstraints,
    options: ListOptions,
    now: DateTime<Utc>,
    tx: mpsc::Sender<ScoredIssue>,
}

/// Concurrent, rate-governed project scanner.
pub struct BatchScheduler {
    source: Arc<dyn IssueSource>,
    governor: Arc<RateGovernor>,
    seen: Arc<SeenSetDeduper>,
    engine: ScoringEngine,
    history: Option<Arc<dyn HistoryStore>>,
    batch_pause: Duration,
    queue_capacity: usize,
}

impl std::fmt::Debug for BatchScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchScheduler")
            .field("governor", &self.governor)
            .field("seen", &self.seen)
            .field("batch_pause", &self.batch_pause)
            .field("queue_capacity", &self.queue_capacity)
            .finish_non_exhaustive()
    }
}

impl BatchScheduler {
    /// Creates a scheduler without history recording.
    #[must_use]
    pub fn new(
        source: Arc<dyn IssueSource>,
        governor: Arc<RateGovernor>,
        seen: Arc<SeenSetDeduper>,
        engine: ScoringEngine,
        config: &SchedulerConfig,
    ) -> Self {
        Self {
            source,
            governor,
            seen,
            engine,
            history: None,
            batch_pause: Duration::from_millis(config.batch_pause_ms),
            queue_capacity: config.queue_capacity.max(1),
        }
    }

    /// Records every emitted issue in `history`.
    #[must_use]
    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    /// The shared seen set.
    #[must_use]
    pub fn seen(&self) -> &Arc<SeenSetDeduper> {
        &self.seen
    }

    /// The shared governor.
    #[must_use]
    pub fn governor(&self) -> &Arc<RateGovernor> {
        &self.governor
    }

    /// Scans up to `constraints.max_projects` of `projects`, in order.
    ///
    /// Never fails: fetch errors are logged and counted, and cancellation
    /// stops new batches while keeping what was already emitted. Returns
    /// once emitted issues are recorded and their seen keys persisted.
    #[instrument(skip_all, fields(projects = projects.len()))]
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        projects: &[Project],
        constraints: &SearchConstraints,
    ) -> ScanReport {
        let projects = &projects[..projects.len().min(constraints.max_projects)];
        let batch_size = constraints.batch_size.max(1);

        let (tx, mut rx) = mpsc::channel::<ScoredIssue>(self.queue_capacity);
        let collected: Arc<Mutex<Vec<ScoredIssue>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&collected);
        let collector = tokio::spawn(async move {
            while let Some(issue) = rx.recv().await {
                sink.lock().unwrap_or_else(PoisonError::into_inner).push(issue);
            }
        });

        let now = Utc::now();
        let ctx = RunContext {
            cancel,
            constraints,
            options: constraints.list_options(),
            now,
            tx,
        };

        let mut report = ScanReport::default();
        for (index, batch) in projects.chunks(batch_size).enumerate() {
            if index > 0 && sleep_or_cancel(self.batch_pause, cancel).await.is_err() {
                report.cancelled = true;
            }
            if report.cancelled || cancel.is_cancelled() {
                report.cancelled = true;
                info!(batch = index + 1, "Cancelled, not starting further batches");
                break;
            }

            info!(
                batch = index + 1,
                size = batch.len(),
                "Scanning batch"
            );
            let outcomes = join_all(batch.iter().map(|p| self.scan_project(&ctx, p))).await;
            for outcome in &outcomes {
                report.record(outcome);
            }
        }

        drop(ctx);
        if let Err(e) = collector.await {
            warn!(error = %e, "Result collector failed");
        }
        report.issues = std::mem::take(&mut *collected.lock().unwrap_or_else(PoisonError::into_inner));

        self.record_history(&report.issues, now).await;
        self.seen.flush().await;

        info!(
            scanned = report.projects_scanned,
            failed = report.projects_failed,
            fetched = report.issues_fetched,
            emitted = report.issues_emitted,
            cancelled = report.cancelled,
            "Scan finished"
        );
        report
    }

    async fn scan_project(&self, ctx: &RunContext<'_>, project: &Project) -> ProjectOutcome {
        let full_name = project.full_name();
        let operation = format!("list issues for {full_name}");

        let fetched = self
            .governor
            .execute_with_retry(ctx.cancel, &operation, || {
                self.source
                    .list_open_issues(&project.owner, &project.name, &ctx.options)
            })
            .await;

        let issues = match fetched {
            Ok(issues) => issues,
            Err(ScoutError::Cancelled) => {
                return ProjectOutcome {
                    cancelled: true,
                    ..ProjectOutcome::default()
                };
            }
            Err(e) => {
                warn!(project = %full_name, error = %e, "Failed to fetch issues");
                return ProjectOutcome {
                    failed: true,
                    ..ProjectOutcome::default()
                };
            }
        };

        let mut outcome = ProjectOutcome {
            fetched: issues.len(),
            ..ProjectOutcome::default()
        };

        for issue in issues {
            if !issue.is_claimable() || !ctx.constraints.matches_keywords(&issue) {
                outcome.filtered += 1;
                continue;
            }

            let key = SeenKey::for_repo(&project.owner, &project.name, issue.number);
            if self.seen.contains(&key) {
                outcome.seen += 1;
                continue;
            }

            let scored =
                self.engine
                    .score_issue(&issue, project, ctx.now, ctx.constraints.score_boost);

            // Another task may have claimed the key since the check above.
            if !self.seen.mark_seen(key) {
                outcome.seen += 1;
                continue;
            }

            if ctx.tx.send(scored).await.is_err() {
                warn!(project = %full_name, "Result queue closed");
                break;
            }
            outcome.emitted += 1;
        }

        debug!(
            project = %full_name,
            fetched = outcome.fetched,
            emitted = outcome.emitted,
            "Project scanned"
        );
        outcome
    }

    async fn record_history(&self, issues: &[ScoredIssue], now: DateTime<Utc>) {
        let Some(history) = &self.history else {
            return;
        };
        let records = issues
            .iter()
            .map(|issue| HistoryRecord::from_issue(issue, now))
            .collect();
        if let Err(e) = history.insert_all(records).await {
            warn!(count = issues.len(), error = %e, "Failed to record history");
        }
    }
}
