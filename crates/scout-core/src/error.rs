// SPDX-License-Identifier: Apache-2.0

//! Error types for Scout.
//!
//! Uses `thiserror` for deriving `std::error::Error` implementations.
//! Application code should use `anyhow::Result` for top-level error handling.

use thiserror::Error;

/// Errors that can occur during Scout operations.
#[derive(Error, Debug)]
pub enum ScoutError {
    /// GitHub API error from octocrab outside of a governed call.
    #[error("GitHub API error: {message}")]
    GitHub {
        /// Error message.
        message: String,
    },

    /// A governed remote call failed with a non-retryable error.
    #[error("{operation} failed after {attempts} attempt(s): {source}")]
    Remote {
        /// Name of the operation that failed.
        operation: String,
        /// Number of attempts made before giving up.
        attempts: u32,
        /// The remote failure.
        #[source]
        source: RemoteError,
    },

    /// Throttling persisted through every retry attempt.
    #[error("max retries exceeded for {operation} after {attempts} attempts")]
    MaxRetriesExceeded {
        /// Name of the operation that was retried.
        operation: String,
        /// Number of attempts made.
        attempts: u32,
    },

    /// The governing cancellation token fired.
    #[error("Operation cancelled")]
    Cancelled,

    /// No GitHub token available.
    #[error(
        "Authentication required - set GH_TOKEN or GITHUB_TOKEN, or log in with the GitHub CLI"
    )]
    NotAuthenticated,

    /// Configuration file error.
    #[error("Configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },

    /// Seen-key or history persistence error.
    #[error("Storage error: {message}")]
    Storage {
        /// Error message.
        message: String,
    },
}

impl ScoutError {
    /// Returns true if this error is a cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ScoutError::Cancelled)
    }
}

impl From<octocrab::Error> for ScoutError {
    fn from(err: octocrab::Error) -> Self {
        ScoutError::GitHub {
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for ScoutError {
    fn from(err: config::ConfigError) -> Self {
        ScoutError::Config {
            message: err.to_string(),
        }
    }
}

/// Classification of a remote failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// The call budget for the current window is exhausted.
    Throttled,
    /// Any other non-2xx or transport failure.
    Permanent,
}

/// A failure reported by a single remote call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}{message}", status_prefix(.status))]
pub struct RemoteError {
    /// Whether the failure is recoverable by waiting.
    pub kind: RemoteErrorKind,
    /// HTTP status, when the failure came from a response.
    pub status: Option<u16>,
    /// Error message.
    pub message: String,
}

impl RemoteError {
    /// Creates a throttling error.
    pub fn throttled(message: impl Into<String>) -> Self {
        Self {
            kind: RemoteErrorKind::Throttled,
            status: None,
            message: message.into(),
        }
    }

    /// Creates a non-retryable error.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: RemoteErrorKind::Permanent,
            status: None,
            message: message.into(),
        }
    }

    /// Attaches an HTTP status code.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns true if the call may succeed after backing off.
    #[must_use]
    pub fn is_throttling(&self) -> bool {
        self.kind == RemoteErrorKind::Throttled
    }
}

#[allow(clippy::ref_option)]
fn status_prefix(status: &Option<u16>) -> String {
    status.map(|s| format!("HTTP {s}: ")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_retries_message_names_operation_and_attempts() {
        let err = ScoutError::MaxRetriesExceeded {
            operation: "fetch issues for kubernetes/kubernetes".to_string(),
            attempts: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("fetch issues for kubernetes/kubernetes"));
        assert!(msg.contains('5'));
    }

    #[test]
    fn test_remote_error_display_with_status() {
        let err = RemoteError::permanent("Not Found").with_status(404);
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
        assert!(!err.is_throttling());
    }

    #[test]
    fn test_remote_error_display_without_status() {
        let err = RemoteError::throttled("secondary rate limit");
        assert_eq!(err.to_string(), "secondary rate limit");
        assert!(err.is_throttling());
    }

    #[test]
    fn test_remote_wraps_attempt_count() {
        let err = ScoutError::Remote {
            operation: "list".to_string(),
            attempts: 1,
            source: RemoteError::permanent("boom"),
        };
        assert_eq!(err.to_string(), "list failed after 1 attempt(s): boom");
    }
}
