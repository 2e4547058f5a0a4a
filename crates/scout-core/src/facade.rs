// SPDX-License-Identifier: Apache-2.0

//! High-level entry points for front ends.
//!
//! [`IssueFinder`] wires an injected catalog and scheduler together. The
//! free functions build everything from configuration and a
//! [`TokenProvider`], so a front end only supplies credentials.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::aggregate::rank;
use crate::auth::TokenProvider;
use crate::catalog::{Catalog, Project};
use crate::config::{AppConfig, load_config};
use crate::error::ScoutError;
use crate::github::auth::create_client_with_token;
use crate::github::issues::{GitHubIssueSource, IssueSource};
use crate::github::ratelimit::{RateLimitStatus, check_rate_limit};
use crate::governor::RateGovernor;
use crate::history::{HistoryRecord, JsonHistoryStore};
use crate::scheduler::{BatchScheduler, ScanReport};
use crate::scoring::{ScoredIssue, ScoringEngine};
use crate::search::SearchConstraints;
use crate::seen::{JsonSeenStore, SeenSetDeduper};

/// Finds, scores and ranks issues across a catalog.
#[derive(Debug)]
pub struct IssueFinder {
    catalog: Catalog,
    scheduler: BatchScheduler,
}

impl IssueFinder {
    /// Creates a finder from its parts.
    #[must_use]
    pub fn new(catalog: Catalog, scheduler: BatchScheduler) -> Self {
        Self { catalog, scheduler }
    }

    /// A finder with an in-memory seen set and no history, configured from
    /// `config`.
    #[must_use]
    pub fn in_memory(source: Arc<dyn IssueSource>, catalog: Catalog, config: &AppConfig) -> Self {
        let scheduler = BatchScheduler::new(
            source,
            Arc::new(RateGovernor::new(&config.governor)),
            Arc::new(SeenSetDeduper::new()),
            ScoringEngine::new(config.scoring.clone()),
            &config.scheduler,
        );
        Self::new(catalog, scheduler)
    }

    /// The project catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &BatchScheduler {
        &self.scheduler
    }

    /// Scans the catalog and returns the unsorted report.
    pub async fn scan(
        &self,
        cancel: &CancellationToken,
        constraints: &SearchConstraints,
    ) -> ScanReport {
        let projects = self.catalog.filter_categories(&constraints.categories);
        self.scheduler.run(cancel, &projects, constraints).await
    }

    /// Scans the catalog and returns the ranked issues.
    ///
    /// A cancelled run still returns whatever was emitted before
    /// cancellation; those issues are already marked seen.
    ///
    /// # Errors
    ///
    /// Currently infallible once constructed; the `Result` leaves room for
    /// sources that fail before scanning.
    #[instrument(skip_all, fields(limit = ?constraints.limit))]
    pub async fn find_issues(
        &self,
        cancel: &CancellationToken,
        constraints: &SearchConstraints,
    ) -> Result<Vec<ScoredIssue>, ScoutError> {
        let report = self.scan(cancel, constraints).await;
        Ok(rank(report.issues, constraints.limit))
    }
}

fn github_client(
    provider: &dyn TokenProvider,
    config: &AppConfig,
) -> Result<octocrab::Octocrab, ScoutError> {
    let token = provider
        .github_token()
        .ok_or(ScoutError::NotAuthenticated)?;
    create_client_with_token(
        &token,
        Duration::from_secs(config.github.api_timeout_seconds),
    )
    .map_err(|e| ScoutError::GitHub {
        message: e.to_string(),
    })
}

/// Builds a finder backed by GitHub and the JSON stores in the data
/// directory.
///
/// Refreshes the governor from `/rate_limit` before returning.
///
/// # Errors
///
/// Returns an error if no token is available, the client cannot be built,
/// or the project catalog is invalid.
pub async fn github_finder(
    provider: &dyn TokenProvider,
    config: &AppConfig,
) -> Result<IssueFinder, ScoutError> {
    let client = github_client(provider, config)?;

    let governor = Arc::new(RateGovernor::new(&config.governor));
    governor.refresh(&client).await;

    let data_dir = config.storage.resolved_data_dir();
    let seen = Arc::new(SeenSetDeduper::load(Arc::new(JsonSeenStore::in_dir(&data_dir))).await);
    let history = Arc::new(JsonHistoryStore::in_dir(&data_dir));

    let scheduler = BatchScheduler::new(
        Arc::new(GitHubIssueSource::new(client)),
        governor,
        seen,
        ScoringEngine::new(config.scoring.clone()),
        &config.scheduler,
    )
    .with_history(history);

    Ok(IssueFinder::new(Catalog::load()?, scheduler))
}

/// Finds ranked issues using configuration from the environment.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, no token is
/// available, or the project catalog is invalid.
#[instrument(skip(provider, cancel))]
pub async fn find_issues(
    provider: &dyn TokenProvider,
    cancel: &CancellationToken,
    constraints: &SearchConstraints,
) -> crate::Result<Vec<ScoredIssue>> {
    let config = load_config()?;
    let finder = github_finder(provider, &config).await?;
    let issues = finder.find_issues(cancel, constraints).await?;
    info!(count = issues.len(), "Found issues");
    Ok(issues)
}

/// Current GitHub rate limit status.
///
/// # Errors
///
/// Returns an error if no token is available or the request fails.
pub async fn rate_limit(provider: &dyn TokenProvider) -> crate::Result<RateLimitStatus> {
    let config = load_config()?;
    let client = github_client(provider, &config)?;
    check_rate_limit(&client)
        .await
        .map_err(|e| ScoutError::GitHub {
            message: e.to_string(),
        })
}

/// Catalog projects in the given categories (all when empty).
///
/// # Errors
///
/// Returns an error if the catalog or the custom projects file is invalid.
pub fn list_projects(categories: &[String]) -> crate::Result<Vec<Project>> {
    Ok(Catalog::load()?.filter_categories(categories))
}

/// The highest-scored issues discovered so far.
///
/// # Errors
///
/// Returns an error if configuration or the history file cannot be read.
pub async fn top_history(limit: usize) -> crate::Result<Vec<HistoryRecord>> {
    let config = load_config()?;
    JsonHistoryStore::in_dir(&config.storage.resolved_data_dir())
        .top(limit)
        .await
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use secrecy::SecretString;

    use super::*;
    use crate::github::issues::{CandidateIssue, ListOptions};
    use crate::governor::RemoteCall;

    struct NoToken;

    impl TokenProvider for NoToken {
        fn github_token(&self) -> Option<SecretString> {
            None
        }
    }

    struct OneIssuePerRepo;

    #[async_trait]
    impl IssueSource for OneIssuePerRepo {
        async fn list_open_issues(
            &self,
            owner: &str,
            repo: &str,
            _options: &ListOptions,
        ) -> RemoteCall<Vec<CandidateIssue>> {
            let stars_hint = u64::try_from(repo.len()).unwrap_or(0);
            RemoteCall::ok(
                vec![CandidateIssue {
                    number: stars_hint,
                    title: format!("Issue in {owner}/{repo}"),
                    body: String::new(),
                    labels: vec!["bug".to_string()],
                    comments: 0,
                    created_at: Utc::now(),
                    url: format!("https://github.com/{owner}/{repo}/issues/{stars_hint}"),
                    has_assignee: false,
                    is_pull_request: false,
                    state: "open".to_string(),
                }],
                None,
            )
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_projects(vec![
            Project {
                owner: "big".to_string(),
                name: "big".to_string(),
                category: "Kubernetes".to_string(),
                stars: 100_000,
            },
            Project {
                owner: "small".to_string(),
                name: "small".to_string(),
                category: "Go Tools".to_string(),
                stars: 10,
            },
        ])
    }

    #[tokio::test]
    async fn test_github_finder_requires_token() {
        let result = github_finder(&NoToken, &AppConfig::default()).await;
        assert!(matches!(result, Err(ScoutError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_find_issues_ranks_and_limits() {
        let finder = IssueFinder::in_memory(Arc::new(OneIssuePerRepo), catalog(), &AppConfig::default());
        let constraints = SearchConstraints::builder().limit(1).build();

        let issues = finder
            .find_issues(&CancellationToken::new(), &constraints)
            .await
            .unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].project.name, "big");
    }

    #[tokio::test]
    async fn test_find_issues_respects_categories() {
        let finder = IssueFinder::in_memory(Arc::new(OneIssuePerRepo), catalog(), &AppConfig::default());
        let constraints = SearchConstraints::builder()
            .categories(vec!["go tools".to_string()])
            .build();

        let issues = finder
            .find_issues(&CancellationToken::new(), &constraints)
            .await
            .unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].project.name, "small");
    }

    #[tokio::test]
    async fn test_second_run_emits_nothing_new() {
        let finder = IssueFinder::in_memory(Arc::new(OneIssuePerRepo), catalog(), &AppConfig::default());
        let cancel = CancellationToken::new();
        let constraints = SearchConstraints::standard();

        let first = finder.scan(&cancel, &constraints).await;
        let second = finder.scan(&cancel, &constraints).await;
        assert_eq!(first.issues_emitted, 2);
        assert_eq!(second.issues_emitted, 0);
        assert_eq!(second.issues_seen, 2);
    }
}
