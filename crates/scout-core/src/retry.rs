// SPDX-License-Identifier: Apache-2.0

//! Retry logic for throttled GitHub calls.
//!
//! Governed calls follow an explicit state machine:
//!
//! ```text
//! Waiting ──Ready──▶ Calling ──Succeeded──▶ Succeeded
//!    ▲                  │ ──Rejected───▶ Failed(Permanent)
//!    │                  │ ──Throttled──▶ BackingOff      (attempt < max)
//!    │                  │ ──Throttled──▶ Failed(Exhausted) (attempt = max)
//!    └────Ready──── BackingOff
//! ```
//!
//! [`RetryPolicy::step`] is the transition table; the governor drives it.
//! Ungoverned helper calls (such as the `/rate_limit` refresh) use the
//! `backon` exponential builder instead.

use std::time::Duration;

use backon::ExponentialBuilder;

use crate::error::RemoteErrorKind;
use crate::github::ratelimit::ResponseMeta;

/// Why a governed call stopped retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailReason {
    /// A non-throttling error; never retried.
    Permanent,
    /// Throttled on every allowed attempt.
    Exhausted,
}

/// State of a governed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// About to consult the governor before `attempt`.
    Waiting {
        /// 1-based attempt number.
        attempt: u32,
    },
    /// Remote call for `attempt` in flight.
    Calling {
        /// 1-based attempt number.
        attempt: u32,
    },
    /// Sleeping `delay` after a throttled `attempt`.
    BackingOff {
        /// Attempt that was throttled.
        attempt: u32,
        /// Time to sleep before the next attempt.
        delay: Duration,
    },
    /// Terminal: the call returned a value.
    Succeeded {
        /// Attempts used.
        attempts: u32,
    },
    /// Terminal: the call gave up.
    Failed {
        /// Attempts used.
        attempts: u32,
        /// Why it gave up.
        reason: FailReason,
    },
}

impl RetryState {
    /// True for `Succeeded` and `Failed`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, RetryState::Succeeded { .. } | RetryState::Failed { .. })
    }
}

/// Input to the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryEvent {
    /// The governor wait or the backoff sleep finished.
    Ready,
    /// The remote call returned a value.
    Succeeded,
    /// The remote call reported throttling.
    Throttled,
    /// The remote call failed for any other reason.
    Rejected,
}

/// Retry ceiling and backoff growth for governed calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of calls, including the first.
    pub max_attempts: u32,
    /// Delay after the first throttled attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy. A zero `max_attempts` is raised to one.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Initial state of every governed call.
    #[must_use]
    pub fn start(&self) -> RetryState {
        RetryState::Waiting { attempt: 1 }
    }

    /// Backoff after the throttled `attempt`: `base_delay * 2^(attempt - 1)`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }

    /// Transition table. Events that do not apply to `state` leave it
    /// unchanged.
    #[must_use]
    pub fn step(&self, state: RetryState, event: RetryEvent) -> RetryState {
        match (state, event) {
            (RetryState::Waiting { attempt }, RetryEvent::Ready) => RetryState::Calling { attempt },
            (RetryState::Calling { attempt }, RetryEvent::Succeeded) => {
                RetryState::Succeeded { attempts: attempt }
            }
            (RetryState::Calling { attempt }, RetryEvent::Rejected) => RetryState::Failed {
                attempts: attempt,
                reason: FailReason::Permanent,
            },
            (RetryState::Calling { attempt }, RetryEvent::Throttled) => {
                if attempt < self.max_attempts {
                    RetryState::BackingOff {
                        attempt,
                        delay: self.delay_for(attempt),
                    }
                } else {
                    RetryState::Failed {
                        attempts: attempt,
                        reason: FailReason::Exhausted,
                    }
                }
            }
            (RetryState::BackingOff { attempt, .. }, RetryEvent::Ready) => RetryState::Waiting {
                attempt: attempt + 1,
            },
            (state, _) => state,
        }
    }
}

/// Classifies a failed GitHub response.
///
/// 429 is always throttling. 403 is throttling when GitHub says so in the
/// message (primary and secondary rate limits) or the response reports an
/// exhausted budget. Everything else is permanent.
#[must_use]
pub fn classify_status(status: u16, message: &str, meta: Option<&ResponseMeta>) -> RemoteErrorKind {
    let mentions_limit = message.to_lowercase().contains("rate limit");
    let exhausted = meta.is_some_and(ResponseMeta::is_exhausted);

    match status {
        429 => RemoteErrorKind::Throttled,
        403 if mentions_limit || exhausted => RemoteErrorKind::Throttled,
        _ => RemoteErrorKind::Permanent,
    }
}

/// Determines if an octocrab error is worth retrying outside the governor.
///
/// Used for ungoverned helper calls only.
#[must_use]
pub fn is_retryable_octocrab(e: &octocrab::Error) -> bool {
    match e {
        octocrab::Error::GitHub { source, .. } => {
            matches!(
                source.status_code.as_u16(),
                429 | 500 | 502 | 503 | 504 | 403
            )
        }
        octocrab::Error::Service { .. } | octocrab::Error::Hyper { .. } => true,
        _ => false,
    }
}

/// Creates a configured exponential backoff builder for ungoverned retries.
///
/// - Factor: 2 (exponential growth)
/// - Min delay: 1 second
/// - Max times: 3
/// - Jitter: enabled
#[must_use]
pub fn retry_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_factor(2.0)
        .with_min_delay(Duration::from_secs(1))
        .with_max_times(3)
        .with_jitter()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(100))
    }

    #[test]
    fn test_start_is_waiting_on_first_attempt() {
        assert_eq!(policy().start(), RetryState::Waiting { attempt: 1 });
    }

    #[test]
    fn test_happy_path() {
        let p = policy();
        let s = p.step(p.start(), RetryEvent::Ready);
        assert_eq!(s, RetryState::Calling { attempt: 1 });
        let s = p.step(s, RetryEvent::Succeeded);
        assert_eq!(s, RetryState::Succeeded { attempts: 1 });
        assert!(s.is_terminal());
    }

    #[test]
    fn test_rejected_fails_without_retry() {
        let p = policy();
        let s = p.step(RetryState::Calling { attempt: 1 }, RetryEvent::Rejected);
        assert_eq!(
            s,
            RetryState::Failed {
                attempts: 1,
                reason: FailReason::Permanent
            }
        );
    }

    #[test]
    fn test_throttled_backs_off_then_waits_for_next_attempt() {
        let p = policy();
        let s = p.step(RetryState::Calling { attempt: 1 }, RetryEvent::Throttled);
        assert_eq!(
            s,
            RetryState::BackingOff {
                attempt: 1,
                delay: Duration::from_millis(100)
            }
        );
        let s = p.step(s, RetryEvent::Ready);
        assert_eq!(s, RetryState::Waiting { attempt: 2 });
    }

    #[test]
    fn test_throttled_on_last_attempt_is_exhausted() {
        let p = policy();
        let s = p.step(RetryState::Calling { attempt: 3 }, RetryEvent::Throttled);
        assert_eq!(
            s,
            RetryState::Failed {
                attempts: 3,
                reason: FailReason::Exhausted
            }
        );
    }

    #[test]
    fn test_always_throttled_visits_exactly_max_attempts_calls() {
        let p = RetryPolicy::new(5, Duration::from_secs(1));
        let mut state = p.start();
        let mut calls = 0;
        while !state.is_terminal() {
            let event = match state {
                RetryState::Calling { .. } => {
                    calls += 1;
                    RetryEvent::Throttled
                }
                _ => RetryEvent::Ready,
            };
            state = p.step(state, event);
        }
        assert_eq!(calls, 5);
        assert!(matches!(
            state,
            RetryState::Failed {
                attempts: 5,
                reason: FailReason::Exhausted
            }
        ));
    }

    #[test]
    fn test_delay_doubles_each_attempt() {
        let p = RetryPolicy::new(5, Duration::from_secs(1));
        assert_eq!(p.delay_for(1), Duration::from_secs(1));
        assert_eq!(p.delay_for(2), Duration::from_secs(2));
        assert_eq!(p.delay_for(3), Duration::from_secs(4));
        assert_eq!(p.delay_for(4), Duration::from_secs(8));
    }

    #[test]
    fn test_irrelevant_events_leave_state_unchanged() {
        let p = policy();
        let waiting = RetryState::Waiting { attempt: 2 };
        assert_eq!(p.step(waiting, RetryEvent::Throttled), waiting);
        let done = RetryState::Succeeded { attempts: 1 };
        assert_eq!(p.step(done, RetryEvent::Ready), done);
    }

    #[test]
    fn test_zero_max_attempts_still_calls_once() {
        let p = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(p.max_attempts, 1);
        let s = p.step(RetryState::Calling { attempt: 1 }, RetryEvent::Throttled);
        assert!(matches!(
            s,
            RetryState::Failed {
                reason: FailReason::Exhausted,
                ..
            }
        ));
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(429, "", None), RemoteErrorKind::Throttled);
        assert_eq!(
            classify_status(403, "API rate limit exceeded for user", None),
            RemoteErrorKind::Throttled
        );
        assert_eq!(
            classify_status(403, "Resource not accessible", None),
            RemoteErrorKind::Permanent
        );
        assert_eq!(classify_status(404, "Not Found", None), RemoteErrorKind::Permanent);
        assert_eq!(classify_status(502, "Bad Gateway", None), RemoteErrorKind::Permanent);
    }

    #[test]
    fn test_classify_forbidden_with_exhausted_budget() {
        let meta = ResponseMeta {
            remaining: Some(0),
            ..ResponseMeta::default()
        };
        assert_eq!(
            classify_status(403, "Forbidden", Some(&meta)),
            RemoteErrorKind::Throttled
        );
    }
}
