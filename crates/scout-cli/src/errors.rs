// SPDX-License-Identifier: Apache-2.0

//! CLI-specific error formatting with user-friendly hints.
//!
//! Downcasts `anyhow::Error` to `ScoutError` and adds a hint where one helps.

use anyhow::Error;
use scout_core::ScoutError;

/// Formats an error for CLI display with helpful hints.
pub fn format_error(error: &Error) -> String {
    let Some(scout_err) = error.downcast_ref::<ScoutError>() else {
        return format!("{error:#}");
    };

    match scout_err {
        ScoutError::NotAuthenticated => {
            "GitHub token required - set GH_TOKEN or run `gh auth login`".to_string()
        }
        ScoutError::Config { .. } => format!(
            "{scout_err}\n\nTip: Check your config file at {}",
            scout_core::config_file_path().display()
        ),
        ScoutError::MaxRetriesExceeded { .. } => format!(
            "{scout_err}\n\nTip: Check the budget with `scout rate-limit` and try again after it resets."
        ),
        ScoutError::GitHub { .. } | ScoutError::Remote { .. } => {
            format!("{scout_err}\n\nTip: Check your internet connection and GitHub token.")
        }
        ScoutError::Storage { .. } => format!(
            "{scout_err}\n\nTip: Scout keeps its state in {}",
            scout_core::data_dir().display()
        ),
        ScoutError::Cancelled => scout_err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_not_authenticated_error() {
        let formatted = format_error(&anyhow::Error::new(ScoutError::NotAuthenticated));
        assert!(formatted.contains("GH_TOKEN"));
    }

    #[test]
    fn test_format_retries_exceeded_error() {
        let error = ScoutError::MaxRetriesExceeded {
            operation: "list issues for a/b".to_string(),
            attempts: 5,
        };
        let formatted = format_error(&anyhow::Error::new(error));
        assert!(formatted.contains("scout rate-limit"));
    }

    #[test]
    fn test_format_non_scout_error() {
        let error = anyhow::anyhow!("Some generic error");
        assert_eq!(format_error(&error), "Some generic error");
    }
}
