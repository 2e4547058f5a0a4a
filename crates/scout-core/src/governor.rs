// SPDX-License-Identifier: Apache-2.0

//! Shared call-budget governor.
//!
//! One [`RateGovernor`] is shared by every fetch task of a run. It tracks the
//! most recent rate limit snapshot reported by GitHub, blocks new calls when
//! the budget runs low, and retries throttled calls with exponential backoff.
//! Every sleep races a [`CancellationToken`].

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::GovernorConfig;
use crate::error::{RemoteError, ScoutError};
use crate::github::ratelimit::{RateLimitStatus, ResponseMeta, check_rate_limit};
use crate::retry::{FailReason, RetryEvent, RetryPolicy, RetryState};

/// Outcome of one remote call plus whatever rate limit metadata came back
/// with it, on success or failure.
#[derive(Debug)]
pub struct RemoteCall<T> {
    /// Value or classified failure.
    pub outcome: Result<T, RemoteError>,
    /// Rate limit headers of the response, if any.
    pub meta: Option<ResponseMeta>,
}

impl<T> RemoteCall<T> {
    /// Successful call.
    pub fn ok(value: T, meta: Option<ResponseMeta>) -> Self {
        Self {
            outcome: Ok(value),
            meta,
        }
    }

    /// Failed call.
    pub fn err(error: RemoteError, meta: Option<ResponseMeta>) -> Self {
        Self {
            outcome: Err(error),
            meta,
        }
    }
}

/// Call-budget governor shared across concurrent fetches.
#[derive(Debug)]
pub struct RateGovernor {
    status: Mutex<RateLimitStatus>,
    min_remaining: u32,
    fallback_wait: Duration,
    policy: RetryPolicy,
}

impl RateGovernor {
    /// Creates a governor with a full default budget of 5000 calls that
    /// resets in one hour. The first real response corrects it.
    #[must_use]
    pub fn new(config: &GovernorConfig) -> Self {
        let initial = RateLimitStatus {
            remaining: 5000,
            limit: 5000,
            reset_at: Utc::now() + chrono::Duration::hours(1),
        };
        Self::with_status(config, initial)
    }

    /// Creates a governor seeded with a known status.
    #[must_use]
    pub fn with_status(config: &GovernorConfig, status: RateLimitStatus) -> Self {
        Self {
            status: Mutex::new(status),
            min_remaining: config.min_remaining,
            fallback_wait: config.fallback_wait(),
            policy: RetryPolicy::new(config.max_attempts, config.base_delay()),
        }
    }

    /// Retry policy applied by [`execute_with_retry`](Self::execute_with_retry).
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Snapshot of the current status.
    #[must_use]
    pub fn status(&self) -> RateLimitStatus {
        *self.lock()
    }

    fn lock(&self) -> MutexGuard<'_, RateLimitStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Folds response metadata into the status.
    ///
    /// Only present, non-zero fields overwrite the snapshot, so a partial or
    /// malformed header set never zeroes the budget.
    pub fn observe(&self, meta: &ResponseMeta) {
        let mut status = self.lock();
        if let Some(limit) = meta.limit.filter(|v| *v > 0) {
            status.limit = limit;
        }
        if let Some(remaining) = meta.remaining.filter(|v| *v > 0) {
            status.remaining = remaining;
        }
        if let Some(reset_at) = meta.reset_at.filter(|t| t.timestamp() > 0) {
            status.reset_at = reset_at;
        }
    }

    /// Seeds the status from the `/rate_limit` endpoint.
    ///
    /// Failure is logged and leaves the current snapshot in place.
    pub async fn refresh(&self, client: &octocrab::Octocrab) {
        match check_rate_limit(client).await {
            Ok(status) => {
                info!("{}", status.message());
                self.observe(&ResponseMeta::from(status));
                // Zero is skipped by observe, but an exhausted budget is real here.
                if status.remaining == 0 {
                    self.lock().remaining = 0;
                }
            }
            Err(e) => warn!(error = %e, "Could not refresh rate limit status"),
        }
    }

    /// Blocks while the remaining budget is below the threshold.
    ///
    /// Sleeps until the reported reset time, or for the fallback wait when
    /// that time has already passed. After waking, `remaining` is assumed to
    /// be back at `limit` until the next response says otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ScoutError::Cancelled` if `cancel` fires during the wait.
    pub async fn wait_if_needed(&self, cancel: &CancellationToken) -> Result<(), ScoutError> {
        let wait = {
            let status = self.lock();
            if status.remaining >= self.min_remaining {
                return Ok(());
            }
            let until_reset = (status.reset_at - Utc::now())
                .to_std()
                .ok()
                .filter(|d| !d.is_zero());
            let wait = until_reset.unwrap_or(self.fallback_wait);
            info!(
                remaining = status.remaining,
                threshold = self.min_remaining,
                wait_secs = wait.as_secs(),
                "Rate limit low, waiting for reset"
            );
            wait
        };

        sleep_or_cancel(wait, cancel).await?;

        let mut status = self.lock();
        status.remaining = status.limit;
        Ok(())
    }

    /// Runs `call` under the governor with retry on throttling.
    ///
    /// Each attempt first waits for budget, then calls, then records the
    /// response metadata. Throttled attempts back off exponentially up to the
    /// policy's attempt ceiling; any other failure is returned at once.
    ///
    /// # Errors
    ///
    /// - `ScoutError::Cancelled` if `cancel` fires while waiting or calling
    /// - `ScoutError::Remote` for a non-throttling failure
    /// - `ScoutError::MaxRetriesExceeded` if every attempt was throttled
    #[instrument(skip(self, cancel, call))]
    pub async fn execute_with_retry<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        operation: &str,
        mut call: F,
    ) -> Result<T, ScoutError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RemoteCall<T>>,
    {
        let mut state = self.policy.start();
        let mut value: Option<T> = None;
        let mut last_error: Option<RemoteError> = None;

        loop {
            state = match state {
                RetryState::Waiting { .. } => {
                    self.wait_if_needed(cancel).await?;
                    self.policy.step(state, RetryEvent::Ready)
                }
                RetryState::Calling { attempt } => {
                    let response = tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(ScoutError::Cancelled),
                        response = call() => response,
                    };
                    if let Some(meta) = &response.meta {
                        self.observe(meta);
                    }
                    match response.outcome {
                        Ok(v) => {
                            value = Some(v);
                            self.policy.step(state, RetryEvent::Succeeded)
                        }
                        Err(e) if e.is_throttling() => {
                            warn!(attempt, error = %e, "Throttled");
                            last_error = Some(e);
                            self.policy.step(state, RetryEvent::Throttled)
                        }
                        Err(e) => {
                            last_error = Some(e);
                            self.policy.step(state, RetryEvent::Rejected)
                        }
                    }
                }
                RetryState::BackingOff { attempt, delay } => {
                    debug!(attempt, delay_ms = delay.as_millis(), "Backing off");
                    sleep_or_cancel(delay, cancel).await?;
                    self.policy.step(state, RetryEvent::Ready)
                }
                RetryState::Succeeded { attempts } => {
                    debug!(attempts, "Call succeeded");
                    return value.ok_or_else(|| ScoutError::Remote {
                        operation: operation.to_string(),
                        attempts,
                        source: RemoteError::permanent("call completed without a value"),
                    });
                }
                RetryState::Failed {
                    attempts,
                    reason: FailReason::Exhausted,
                } => {
                    return Err(ScoutError::MaxRetriesExceeded {
                        operation: operation.to_string(),
                        attempts,
                    });
                }
                RetryState::Failed {
                    attempts,
                    reason: FailReason::Permanent,
                } => {
                    return Err(ScoutError::Remote {
                        operation: operation.to_string(),
                        attempts,
                        source: last_error
                            .take()
                            .unwrap_or_else(|| RemoteError::permanent("unknown failure")),
                    });
                }
            };
        }
    }
}

/// Sleeps for `duration` unless `cancel` fires first.
pub(crate) async fn sleep_or_cancel(
    duration: Duration,
    cancel: &CancellationToken,
) -> Result<(), ScoutError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ScoutError::Cancelled),
        () = tokio::time::sleep(duration) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use chrono::DateTime;
    use tokio::time::Instant;

    use super::*;

    fn config() -> GovernorConfig {
        GovernorConfig::default()
    }

    fn status(remaining: u32, reset_in_secs: i64) -> RateLimitStatus {
        RateLimitStatus {
            remaining,
            limit: 5000,
            reset_at: Utc::now() + chrono::Duration::seconds(reset_in_secs),
        }
    }

    #[test]
    fn test_observe_overwrites_present_fields() {
        let governor = RateGovernor::with_status(&config(), status(4000, 3600));
        let reset = DateTime::from_timestamp(1_900_000_000, 0).unwrap();
        governor.observe(&ResponseMeta {
            limit: Some(15000),
            remaining: Some(42),
            reset_at: Some(reset),
        });
        let s = governor.status();
        assert_eq!(s.limit, 15000);
        assert_eq!(s.remaining, 42);
        assert_eq!(s.reset_at, reset);
    }

    #[test]
    fn test_observe_ignores_zero_and_missing_fields() {
        let governor = RateGovernor::with_status(&config(), status(4000, 3600));
        governor.observe(&ResponseMeta {
            limit: Some(0),
            remaining: Some(0),
            reset_at: None,
        });
        let s = governor.status();
        assert_eq!(s.limit, 5000);
        assert_eq!(s.remaining, 4000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_if_needed_returns_immediately_with_budget() {
        let governor = RateGovernor::with_status(&config(), status(100, 600));
        let start = Instant::now();
        governor
            .wait_if_needed(&CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_if_needed_blocks_until_reset_when_low() {
        let governor = RateGovernor::with_status(&config(), status(99, 30));
        let start = Instant::now();
        governor
            .wait_if_needed(&CancellationToken::new())
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_secs(28));
        assert_eq!(governor.status().remaining, 5000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_if_needed_uses_fallback_when_reset_passed() {
        let governor = RateGovernor::with_status(&config(), status(0, -10));
        let start = Instant::now();
        governor
            .wait_if_needed(&CancellationToken::new())
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_if_needed_cancelled() {
        let governor = RateGovernor::with_status(&config(), status(0, 3600));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let result = governor.wait_if_needed(&cancel).await;
        assert!(matches!(result, Err(ScoutError::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(governor.status().remaining, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_with_retry_success_observes_meta() {
        let governor = RateGovernor::with_status(&config(), status(5000, 3600));
        let result = governor
            .execute_with_retry(&CancellationToken::new(), "list", || async {
                RemoteCall::ok(
                    7,
                    Some(ResponseMeta {
                        remaining: Some(4999),
                        ..ResponseMeta::default()
                    }),
                )
            })
            .await
            .unwrap();
        assert_eq!(result, 7);
        assert_eq!(governor.status().remaining, 4999);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_with_retry_permanent_error_is_not_retried() {
        let governor = RateGovernor::with_status(&config(), status(5000, 3600));
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<(), _> = governor
            .execute_with_retry(&CancellationToken::new(), "fetch rust-lang/rust", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { RemoteCall::err(RemoteError::permanent("Not Found").with_status(404), None) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        match result {
            Err(ScoutError::Remote {
                operation,
                attempts,
                source,
            }) => {
                assert_eq!(operation, "fetch rust-lang/rust");
                assert_eq!(attempts, 1);
                assert_eq!(source.status, Some(404));
            }
            other => panic!("expected Remote error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_with_retry_recovers_after_throttling() {
        let governor = RateGovernor::with_status(&config(), status(5000, 3600));
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let start = Instant::now();
        let result = governor
            .execute_with_retry(&CancellationToken::new(), "list", || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        RemoteCall::err(RemoteError::throttled("rate limit").with_status(429), None)
                    } else {
                        RemoteCall::ok("done", None)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result, "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s + 2s of backoff
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_with_retry_exhaustion_names_operation_and_attempts() {
        let governor = RateGovernor::with_status(&config(), status(5000, 3600));
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<(), _> = governor
            .execute_with_retry(&CancellationToken::new(), "fetch cilium/cilium", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { RemoteCall::err(RemoteError::throttled("API rate limit exceeded"), None) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            ScoutError::MaxRetriesExceeded { attempts: 5, .. }
        ));
        let msg = err.to_string();
        assert!(msg.contains("fetch cilium/cilium"));
        assert!(msg.contains('5'));
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_with_retry_cancelled_during_backoff() {
        let governor = RateGovernor::with_status(&config(), status(5000, 3600));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            trigger.cancel();
        });

        let result: Result<(), _> = governor
            .execute_with_retry(&cancel, "list", || async {
                RemoteCall::err(RemoteError::throttled("slow down"), None)
            })
            .await;
        assert!(matches!(result, Err(ScoutError::Cancelled)));
    }
}
