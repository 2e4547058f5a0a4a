// SPDX-License-Identifier: Apache-2.0

//! Ranking of scored issues.

use crate::scoring::ScoredIssue;

/// Sorts issues by score, best first, and keeps at most `limit`.
///
/// Ties keep no particular order. NaN scores sort below every number.
#[must_use]
pub fn rank(mut issues: Vec<ScoredIssue>, limit: Option<usize>) -> Vec<ScoredIssue> {
    issues.sort_unstable_by(|a, b| {
        let a = if a.score.is_nan() { f64::NEG_INFINITY } else { a.score };
        let b = if b.score.is_nan() { f64::NEG_INFINITY } else { b.score };
        b.total_cmp(&a)
    });
    if let Some(limit) = limit {
        issues.truncate(limit);
    }
    issues
}
