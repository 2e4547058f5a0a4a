// SPDX-License-Identifier: Apache-2.0

//! Issue scoring.
//!
//! A score is a weighted sum of five normalized factors plus the signed
//! weights of every matching rule in [`rules::MODIFIERS`], clamped to
//! `[0, max_score]`. Scoring is a pure function of the issue, its project and
//! the supplied `now`.

pub mod rules;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Project;
use crate::config::ScoringConfig;
use crate::github::issues::CandidateIssue;
use crate::seen::SeenKey;
use rules::{IssueView, MODIFIERS};

/// A scored issue ready for ranking and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredIssue {
    /// Project the issue belongs to.
    pub project: Project,
    /// Issue number.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Browser URL.
    pub url: String,
    /// Final score in `[0, max_score]`.
    pub score: f64,
    /// Number of comments.
    pub comments: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Label names.
    pub labels: Vec<String>,
    /// Project category.
    pub category: String,
    /// Carries a good-first-issue or beginner label.
    pub is_entry_level: bool,
}

impl ScoredIssue {
    /// Deduplication key of this issue.
    #[must_use]
    pub fn seen_key(&self) -> SeenKey {
        SeenKey::for_repo(&self.project.owner, &self.project.name, self.number)
    }
}

/// The five normalized factors, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorScores {
    /// From project stars.
    pub popularity: f64,
    /// From comment count; quieter issues score higher.
    pub engagement: f64,
    /// From issue age.
    pub recency: f64,
    /// From label names.
    pub label: f64,
    /// From entry-level labels and body wording.
    pub difficulty: f64,
}

/// A modifier that matched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AppliedModifier {
    /// Rule name.
    pub name: &'static str,
    /// Signed weight added to the score.
    pub weight: f64,
}

/// Every contribution to a score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Raw factor values.
    pub factors: FactorScores,
    /// Weighted sum of the factors.
    pub base: f64,
    /// Matching modifiers in table order.
    pub modifiers: Vec<AppliedModifier>,
    /// `base + Σ modifiers`, clamped.
    pub total: f64,
}

/// Popularity factor from a star count.
#[must_use]
pub fn popularity(stars: u32) -> f64 {
    match stars {
        0..=1_000 => 0.3,
        1_001..=10_000 => 0.6,
        10_001..=50_000 => 0.8,
        _ => 1.0,
    }
}

/// Engagement factor from a comment count.
#[must_use]
pub fn engagement(comments: u32) -> f64 {
    match comments {
        0..=2 => 0.7,
        3..=5 => 0.5,
        6..=10 => 0.3,
        _ => 0.1,
    }
}

/// Recency factor from an age in hours.
#[must_use]
pub fn recency(age_hours: f64) -> f64 {
    if age_hours <= 24.0 {
        1.0
    } else if age_hours <= 72.0 {
        0.8
    } else if age_hours <= 168.0 {
        0.6
    } else if age_hours <= 720.0 {
        0.4
    } else {
        0.2
    }
}

/// Label factor.
///
/// Favorable labels add to a running sum; any unfavorable label (complex,
/// hard, refactor) disables the 1.0 shortcut.
#[must_use]
pub fn label_factor(labels: &[String]) -> f64 {
    let mut sum = 0.0;
    let mut favorable = false;
    let mut unfavorable = false;

    for label in labels.iter().map(|l| l.to_lowercase()) {
        if ["good first issue", "help wanted", "bug", "enhancement"]
            .iter()
            .any(|k| label.contains(k))
        {
            sum += 0.3;
            favorable = true;
        }
        if label.contains("documentation") {
            sum += 0.2;
            favorable = true;
        }
        if ["complex", "hard", "refactor"].iter().any(|k| label.contains(k)) {
            unfavorable = true;
        }
    }

    if favorable && !unfavorable {
        1.0
    } else {
        f64::min(sum, 1.0)
    }
}

/// Difficulty factor.
#[must_use]
pub fn difficulty(labels: &[String], body: &str) -> f64 {
    if labels
        .iter()
        .any(|l| l.to_lowercase().contains("good first issue"))
    {
        return 0.7;
    }
    let body = body.to_lowercase();
    if ["simple", "basic", "small"].iter().any(|k| body.contains(k)) {
        0.6
    } else if ["complex", "difficult", "challenging"]
        .iter()
        .any(|k| body.contains(k))
    {
        0.2
    } else {
        0.4
    }
}

/// Stateless scorer holding the configured weights.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    /// Creates an engine with the given weights.
    #[must_use]
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// The configured weights.
    #[must_use]
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores an issue.
    #[must_use]
    pub fn score(&self, issue: &CandidateIssue, project: &Project, now: DateTime<Utc>) -> f64 {
        self.score_with_breakdown(issue, project, now).total
    }

    /// Scores an issue and reports every contribution.
    #[must_use]
    pub fn score_with_breakdown(
        &self,
        issue: &CandidateIssue,
        project: &Project,
        now: DateTime<Utc>,
    ) -> ScoreBreakdown {
        let view = view_of(issue, project, now);
        let w = &self.config;

        let factors = FactorScores {
            popularity: popularity(project.stars),
            engagement: engagement(issue.comments),
            recency: recency(view.age_hours),
            label: label_factor(&issue.labels),
            difficulty: difficulty(&issue.labels, &issue.body),
        };
        let base = factors.popularity * w.popularity_weight
            + factors.engagement * w.engagement_weight
            + factors.recency * w.recency_weight
            + factors.label * w.label_weight
            + factors.difficulty * w.difficulty_weight;

        let modifiers: Vec<AppliedModifier> = MODIFIERS
            .iter()
            .filter(|m| m.condition.matches(&view))
            .map(|m| AppliedModifier {
                name: m.name,
                weight: m.weight,
            })
            .collect();
        let adjustment: f64 = modifiers.iter().map(|m| m.weight).sum();

        ScoreBreakdown {
            factors,
            base,
            modifiers,
            total: (base + adjustment).clamp(0.0, w.max_score.max(0.0)),
        }
    }

    /// Scores an issue into a [`ScoredIssue`], adding `boost` before the
    /// final clamp.
    #[must_use]
    pub fn score_issue(
        &self,
        issue: &CandidateIssue,
        project: &Project,
        now: DateTime<Utc>,
        boost: f64,
    ) -> ScoredIssue {
        let view = view_of(issue, project, now);
        let score = (self.score(issue, project, now) + boost).clamp(0.0, self.config.max_score.max(0.0));

        ScoredIssue {
            project: project.clone(),
            number: issue.number,
            title: issue.title.clone(),
            url: issue.url.clone(),
            score,
            comments: issue.comments,
            created_at: issue.created_at,
            labels: issue.labels.clone(),
            category: project.category.clone(),
            is_entry_level: rules::is_entry_level(&view),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn view_of(issue: &CandidateIssue, project: &Project, now: DateTime<Utc>) -> IssueView {
    let age_hours = (now - issue.created_at).num_seconds() as f64 / 3600.0;
    IssueView::new(
        &issue.title,
        &issue.body,
        &issue.labels,
        &project.name,
        &project.category,
        issue.comments,
        age_hours,
    )
}
