// SPDX-License-Identifier: Apache-2.0

//! Search constraints for a discovery run.

use bon::Builder;
use serde::Serialize;

use crate::config::SchedulerConfig;
use crate::github::issues::{CandidateIssue, ListOptions};

/// Label requested by the good-first-issue preset.
pub const GOOD_FIRST_ISSUE_LABEL: &str = "good first issue";

/// What to scan and how to filter it.
///
/// ```
/// use scout_core::SearchConstraints;
///
/// let constraints = SearchConstraints::builder()
///     .batch_size(5)
///     .exclude_keywords(vec!["flaky".to_string()])
///     .limit(10)
///     .build();
/// assert_eq!(constraints.max_projects, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Builder)]
pub struct SearchConstraints {
    /// Projects fetched concurrently per batch.
    #[builder(default = 20)]
    pub batch_size: usize,
    /// Upper bound on projects visited.
    #[builder(default = 50)]
    pub max_projects: usize,
    /// Newest open issues requested per project.
    #[builder(default = 10)]
    pub issues_per_repo: u8,
    /// Only fetch issues with this label.
    #[builder(into)]
    pub label: Option<String>,
    /// Only scan projects in these categories (case-insensitive). Empty
    /// means all.
    #[builder(default)]
    pub categories: Vec<String>,
    /// Keep only issues mentioning at least one of these.
    #[builder(default)]
    pub include_keywords: Vec<String>,
    /// Drop issues mentioning any of these.
    #[builder(default)]
    pub exclude_keywords: Vec<String>,
    /// Added to every score before the final clamp.
    #[builder(default)]
    pub score_boost: f64,
    /// Truncate the ranked list to this many issues.
    pub limit: Option<usize>,
}

impl Default for SearchConstraints {
    fn default() -> Self {
        Self::standard()
    }
}

impl SearchConstraints {
    /// Every category, 20 projects per batch, 50 projects, 10 issues each.
    #[must_use]
    pub fn standard() -> Self {
        Self::builder().build()
    }

    /// Standard sizing taken from configuration.
    #[must_use]
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::builder()
            .batch_size(config.batch_size)
            .max_projects(config.max_projects)
            .issues_per_repo(config.issues_per_repo)
            .build()
    }

    /// Issues labelled "good first issue" in the given categories, with a
    /// +0.3 score boost. Smaller batches over fewer projects, more issues per
    /// project.
    #[must_use]
    pub fn good_first(categories: Vec<String>) -> Self {
        Self::builder()
            .batch_size(10)
            .max_projects(30)
            .issues_per_repo(20)
            .label(GOOD_FIRST_ISSUE_LABEL)
            .categories(categories)
            .score_boost(0.3)
            .build()
    }

    /// Issues mentioning at least one of `include`.
    #[must_use]
    pub fn keyword(include: Vec<String>) -> Self {
        Self::builder().include_keywords(include).build()
    }

    /// Issues mentioning none of `exclude`.
    #[must_use]
    pub fn excluding(exclude: Vec<String>) -> Self {
        Self::builder().exclude_keywords(exclude).build()
    }

    /// Listing parameters for one project.
    #[must_use]
    pub fn list_options(&self) -> ListOptions {
        ListOptions {
            per_page: self.issues_per_repo,
            label: self.label.clone(),
        }
    }

    /// Applies the keyword filters to the lower-cased title and body.
    #[must_use]
    pub fn matches_keywords(&self, issue: &CandidateIssue) -> bool {
        if self.include_keywords.is_empty() && self.exclude_keywords.is_empty() {
            return true;
        }
        let text = format!("{} {}", issue.title, issue.body).to_lowercase();
        let mentions = |k: &String| text.contains(&k.to_lowercase());

        (self.include_keywords.is_empty() || self.include_keywords.iter().any(mentions))
            && !self.exclude_keywords.iter().any(mentions)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn issue(title: &str, body: &str) -> CandidateIssue {
        CandidateIssue {
            number: 1,
            title: title.to_string(),
            body: body.to_string(),
            labels: Vec::new(),
            comments: 0,
            created_at: Utc::now(),
            url: String::new(),
            has_assignee: false,
            is_pull_request: false,
            state: "open".to_string(),
        }
    }

    #[test]
    fn test_standard_defaults() {
        let c = SearchConstraints::standard();
        assert_eq!(c.batch_size, 20);
        assert_eq!(c.max_projects, 50);
        assert_eq!(c.issues_per_repo, 10);
        assert!(c.label.is_none());
        assert!(c.score_boost.abs() < f64::EPSILON);
        assert_eq!(c, SearchConstraints::default());
    }

    #[test]
    fn test_good_first_preset() {
        let c = SearchConstraints::good_first(vec!["Kubernetes".to_string()]);
        assert_eq!(c.batch_size, 10);
        assert_eq!(c.max_projects, 30);
        assert_eq!(c.list_options().per_page, 20);
        assert_eq!(c.list_options().label.as_deref(), Some("good first issue"));
        assert!((c.score_boost - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_config() {
        let config = SchedulerConfig {
            batch_size: 3,
            ..SchedulerConfig::default()
        };
        assert_eq!(SearchConstraints::from_config(&config).batch_size, 3);
    }

    #[test]
    fn test_include_keywords() {
        let c = SearchConstraints::keyword(vec!["Go.mod".to_string()]);
        assert!(c.matches_keywords(&issue("Bump go.mod", "")));
        assert!(!c.matches_keywords(&issue("Fix crash", "")));
    }

    #[test]
    fn test_exclude_keywords() {
        let c = SearchConstraints::excluding(vec!["flaky".to_string()]);
        assert!(c.matches_keywords(&issue("Fix crash", "")));
        assert!(!c.matches_keywords(&issue("Test", "This is FLAKY on CI")));
    }

    #[test]
    fn test_no_keywords_matches_everything() {
        assert!(SearchConstraints::standard().matches_keywords(&issue("", "")));
    }
}
