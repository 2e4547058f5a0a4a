// SPDX-License-Identifier: Apache-2.0

//! GitHub API rate limit status.
//!
//! Provides the call-budget snapshot shared by the governor, parsing of the
//! `x-ratelimit-*` response headers, and an explicit `/rate_limit` query.

use anyhow::Result;
use backon::Retryable;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::retry::{is_retryable_octocrab, retry_backoff};

/// GitHub API rate limit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    /// Number of API calls remaining in the current rate limit window.
    pub remaining: u32,
    /// Total number of API calls allowed in the rate limit window.
    pub limit: u32,
    /// When the rate limit window resets.
    pub reset_at: DateTime<Utc>,
}

impl RateLimitStatus {
    /// Returns true if fewer than `threshold` calls remain.
    ///
    /// Pass [`GovernorConfig::min_remaining`](crate::GovernorConfig) to match
    /// the point at which the governor starts waiting.
    #[must_use]
    pub fn is_low(&self, threshold: u32) -> bool {
        self.remaining < threshold
    }

    /// Returns a human-readable status message.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "GitHub API: {}/{} calls remaining, resets at {}",
            self.remaining,
            self.limit,
            self.reset_at.format("%H:%M:%S")
        )
    }
}

/// Rate limit fields reported alongside a single response.
///
/// Any field may be missing; zero values are treated as missing by the
/// governor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    /// `x-ratelimit-limit`.
    pub limit: Option<u32>,
    /// `x-ratelimit-remaining`.
    pub remaining: Option<u32>,
    /// `x-ratelimit-reset`.
    pub reset_at: Option<DateTime<Utc>>,
}

impl ResponseMeta {
    /// Parses the `x-ratelimit-*` headers of a GitHub response.
    ///
    /// Returns `None` when none of the headers are present.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let number = |name: &str| -> Option<u64> {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
        };

        let meta = Self {
            limit: number("x-ratelimit-limit").and_then(|v| u32::try_from(v).ok()),
            remaining: number("x-ratelimit-remaining").and_then(|v| u32::try_from(v).ok()),
            reset_at: number("x-ratelimit-reset")
                .and_then(|v| i64::try_from(v).ok())
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        };

        if meta == Self::default() {
            None
        } else {
            Some(meta)
        }
    }

    /// True when the response reports an exhausted budget.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

impl From<RateLimitStatus> for ResponseMeta {
    fn from(status: RateLimitStatus) -> Self {
        Self {
            limit: Some(status.limit),
            remaining: Some(status.remaining),
            reset_at: Some(status.reset_at),
        }
    }
}

/// Checks the GitHub API rate limit status.
///
/// The `/rate_limit` endpoint does not count against the budget, so this is
/// safe to call before every run. Transient failures are retried with
/// [`retry_backoff`].
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn check_rate_limit(client: &octocrab::Octocrab) -> Result<RateLimitStatus> {
    debug!("Checking GitHub API rate limit");

    let rate_limit = (|| async { client.ratelimit().get().await })
        .retry(retry_backoff())
        .when(is_retryable_octocrab)
        .notify(|err, dur| {
            warn!(error = %err, retry_after = ?dur, "Retrying rate limit check");
        })
        .await?;
    let core = rate_limit.resources.core;

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let status = RateLimitStatus {
        remaining: core.remaining as u32,
        limit: core.limit as u32,
        reset_at: DateTime::from_timestamp(core.reset as i64, 0).unwrap_or_else(Utc::now),
    };

    debug!(
        remaining = status.remaining,
        limit = status.limit,
        "GitHub rate limit status"
    );

    Ok(status)
}
