// SPDX-License-Identifier: Apache-2.0

//! GitHub rate limit command.

use anyhow::Result;
use scout_core::{GovernorConfig, RateLimitStatus};

use super::types::RateLimitResult;
use crate::provider::CliTokenProvider;

/// Queries the current budget.
pub async fn run(governor: &GovernorConfig) -> Result<RateLimitResult> {
    let status = scout_core::rate_limit(&CliTokenProvider).await?;
    Ok(result(status, governor))
}

/// Flags the budget as low at the same threshold the governor waits at.
fn result(status: RateLimitStatus, governor: &GovernorConfig) -> RateLimitResult {
    RateLimitResult {
        low: status.is_low(governor.min_remaining),
        status,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn status(remaining: u32) -> RateLimitStatus {
        RateLimitStatus {
            remaining,
            limit: 5000,
            reset_at: Utc::now(),
        }
    }

    #[test]
    fn test_low_follows_governor_threshold() {
        let governor = GovernorConfig {
            min_remaining: 500,
            ..GovernorConfig::default()
        };
        assert!(result(status(300), &governor).low);
        assert!(!result(status(300), &GovernorConfig::default()).low);
    }
}
