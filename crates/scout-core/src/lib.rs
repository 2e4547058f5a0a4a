// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # Scout Core
//!
//! Core library for Scout, a contributor-focused GitHub issue finder.
//!
//! This crate provides reusable components for:
//! - A curated catalog of open source projects
//! - Rate-governed, retrying GitHub issue listing
//! - Heuristic issue scoring with explainable modifiers
//! - Batched concurrent scanning with cross-run de-duplication
//! - Discovery history
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scout_core::{SearchConstraints, TokenProvider, find_issues};
//! use secrecy::SecretString;
//! use tokio_util::sync::CancellationToken;
//!
//! struct EnvToken;
//!
//! impl TokenProvider for EnvToken {
//!     fn github_token(&self) -> Option<SecretString> {
//!         std::env::var("GH_TOKEN").ok().map(|t| SecretString::new(t.into()))
//!     }
//! }
//!
//! # async fn example() -> scout_core::Result<()> {
//! let constraints = SearchConstraints::good_first(vec!["Kubernetes".to_string()]);
//! let issues = find_issues(&EnvToken, &CancellationToken::new(), &constraints).await?;
//! for issue in issues.iter().take(5) {
//!     println!("{:.2} {}", issue.score, issue.url);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`catalog`] - Curated project list
//! - [`governor`] - Shared rate limit budget and governed retries
//! - [`scoring`] - Issue scoring engine
//! - [`scheduler`] - Batched concurrent scanning
//! - [`seen`] - Cross-run de-duplication
//! - [`history`] - Discovery history

// ============================================================================
// Authentication
// ============================================================================

pub use auth::TokenProvider;

// ============================================================================
// Error Handling
// ============================================================================

pub use error::{RemoteError, RemoteErrorKind, ScoutError};

/// Convenience Result type for Scout operations.
///
/// This is equivalent to `std::result::Result<T, ScoutError>`.
pub type Result<T> = std::result::Result<T, ScoutError>;

// ============================================================================
// Configuration
// ============================================================================

pub use config::{
    AppConfig, GitHubConfig, GovernorConfig, SchedulerConfig, ScoringConfig, StorageConfig,
    config_dir, config_file_path, data_dir, load_config,
};

// ============================================================================
// GitHub Integration
// ============================================================================

pub use github::auth::TokenSource;
pub use github::issues::{CandidateIssue, GitHubIssueSource, IssueSource, ListOptions};
pub use github::ratelimit::{RateLimitStatus, ResponseMeta, check_rate_limit};

// ============================================================================
// Catalog
// ============================================================================

pub use catalog::{Catalog, Project};

// ============================================================================
// Rate Governing and Retries
// ============================================================================

pub use governor::{RateGovernor, RemoteCall};
pub use retry::{RetryPolicy, RetryState, retry_backoff};

// ============================================================================
// Scoring and Scanning
// ============================================================================

pub use aggregate::rank;
pub use scheduler::{BatchScheduler, ScanReport};
pub use scoring::{ScoreBreakdown, ScoredIssue, ScoringEngine};
pub use search::SearchConstraints;
pub use seen::{JsonSeenStore, SeenKey, SeenSetDeduper, SeenStore};

// ============================================================================
// History Tracking
// ============================================================================

pub use history::{HistoryData, HistoryRecord, HistoryStore, JsonHistoryStore};

// ============================================================================
// Platform-Agnostic Facade
// ============================================================================

pub use facade::{IssueFinder, find_issues, github_finder, list_projects, rate_limit, top_history};

// ============================================================================
// Modules
// ============================================================================

pub mod aggregate;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod facade;
pub mod github;
pub mod governor;
pub mod history;
pub mod retry;
pub mod scheduler;
pub mod scoring;
pub mod search;
pub mod seen;
pub mod storage;
