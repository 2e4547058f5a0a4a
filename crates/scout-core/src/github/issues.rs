// SPDX-License-Identifier: Apache-2.0

//! Open issue listing.
//!
//! [`IssueSource`] is the seam between the scheduler and GitHub. The REST
//! implementation reads the raw response so the `x-ratelimit-*` headers can
//! be handed to the governor on success and on failure.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::ratelimit::ResponseMeta;
use crate::error::RemoteError;
use crate::governor::RemoteCall;
use crate::retry::classify_status;

/// An issue as returned by the listing endpoint, before filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateIssue {
    /// Issue number.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Issue body (empty when GitHub returns none).
    pub body: String,
    /// Label names in the order GitHub returned them.
    pub labels: Vec<String>,
    /// Number of comments.
    pub comments: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Browser URL.
    pub url: String,
    /// Whether anyone is assigned.
    pub has_assignee: bool,
    /// The issues endpoint also returns pull requests.
    pub is_pull_request: bool,
    /// `open` or `closed`.
    pub state: String,
}

impl CandidateIssue {
    /// True for open, unassigned issues that are not pull requests.
    #[must_use]
    pub fn is_claimable(&self) -> bool {
        !self.is_pull_request && !self.has_assignee && self.state.eq_ignore_ascii_case("open")
    }
}

/// Listing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// Page size, capped by GitHub at 100.
    pub per_page: u8,
    /// Only return issues carrying this label.
    pub label: Option<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            per_page: 10,
            label: None,
        }
    }
}

/// Source of open issues for a repository.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Lists the newest open issues of `owner/repo`.
    ///
    /// Never fails outright: the outcome and any rate limit metadata travel
    /// together in the returned [`RemoteCall`].
    async fn list_open_issues(
        &self,
        owner: &str,
        repo: &str,
        options: &ListOptions,
    ) -> RemoteCall<Vec<CandidateIssue>>;
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    labels: Vec<RawLabel>,
    #[serde(default)]
    comments: u32,
    created_at: DateTime<Utc>,
    html_url: String,
    #[serde(default)]
    assignee: Option<serde_json::Value>,
    #[serde(default)]
    assignees: Vec<serde_json::Value>,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
    state: String,
}

impl From<RawIssue> for CandidateIssue {
    fn from(raw: RawIssue) -> Self {
        Self {
            number: raw.number,
            title: raw.title,
            body: raw.body.unwrap_or_default(),
            labels: raw.labels.into_iter().map(|l| l.name).collect(),
            comments: raw.comments,
            created_at: raw.created_at,
            url: raw.html_url,
            has_assignee: raw.assignee.is_some() || !raw.assignees.is_empty(),
            is_pull_request: raw.pull_request.is_some(),
            state: raw.state,
        }
    }
}

/// Builds the REST route for listing open issues, newest first.
#[must_use]
pub fn issues_route(owner: &str, repo: &str, options: &ListOptions) -> String {
    let mut route = format!(
        "/repos/{owner}/{repo}/issues?state=open&sort=created&direction=desc&per_page={}",
        options.per_page.clamp(1, 100)
    );
    if let Some(label) = options.label.as_deref() {
        route.push_str("&labels=");
        route.push_str(&utf8_percent_encode(label, NON_ALPHANUMERIC).to_string());
    }
    route
}

fn classify_octocrab(err: &octocrab::Error, meta: Option<&ResponseMeta>) -> RemoteError {
    match err {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code.as_u16();
            RemoteError {
                kind: classify_status(status, &source.message, meta),
                status: Some(status),
                message: source.message.clone(),
            }
        }
        other => RemoteError::permanent(other.to_string()),
    }
}

/// [`IssueSource`] backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubIssueSource {
    client: Octocrab,
}

impl GitHubIssueSource {
    /// Wraps an authenticated client.
    #[must_use]
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// The underlying client.
    #[must_use]
    pub fn client(&self) -> &Octocrab {
        &self.client
    }
}

#[async_trait]
impl IssueSource for GitHubIssueSource {
    #[instrument(skip(self, options), fields(owner = %owner, repo = %repo))]
    async fn list_open_issues(
        &self,
        owner: &str,
        repo: &str,
        options: &ListOptions,
    ) -> RemoteCall<Vec<CandidateIssue>> {
        let route = issues_route(owner, repo, options);
        debug!(route = %route, "Listing open issues");

        let response = match self.client._get(route.as_str()).await {
            Ok(response) => response,
            Err(e) => return RemoteCall::err(classify_octocrab(&e, None), None),
        };
        let meta = ResponseMeta::from_headers(response.headers());

        let response = match octocrab::map_github_error(response).await {
            Ok(response) => response,
            Err(e) => return RemoteCall::err(classify_octocrab(&e, meta.as_ref()), meta),
        };

        let body = match self.client.body_to_string(response).await {
            Ok(body) => body,
            Err(e) => return RemoteCall::err(RemoteError::permanent(e.to_string()), meta),
        };

        match serde_json::from_str::<Vec<RawIssue>>(&body) {
            Ok(raw) => {
                let issues: Vec<CandidateIssue> = raw.into_iter().map(CandidateIssue::from).collect();
                debug!(count = issues.len(), "Fetched open issues");
                RemoteCall::ok(issues, meta)
            }
            Err(e) => RemoteCall::err(
                RemoteError::permanent(format!("Failed to parse issues response: {e}")),
                meta,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
      {
        "number": 42,
        "title": "Fix typo in README",
        "body": null,
        "labels": [{"name": "good first issue"}, {"name": "documentation"}],
        "comments": 1,
        "created_at": "2026-01-15T10:00:00Z",
        "html_url": "https://github.com/prometheus/prometheus/issues/42",
        "assignee": null,
        "assignees": [],
        "state": "open"
      },
      {
        "number": 43,
        "title": "Add metrics endpoint",
        "body": "See handler.go",
        "labels": [],
        "comments": 3,
        "created_at": "2026-01-14T10:00:00Z",
        "html_url": "https://github.com/prometheus/prometheus/pull/43",
        "pull_request": {"url": "https://api.github.com/repos/prometheus/prometheus/pulls/43"},
        "state": "open"
      },
      {
        "number": 44,
        "title": "Taken",
        "labels": [],
        "comments": 0,
        "created_at": "2026-01-13T10:00:00Z",
        "html_url": "https://github.com/prometheus/prometheus/issues/44",
        "assignees": [{"login": "someone"}],
        "state": "open"
      }
    ]"#;

    fn parse() -> Vec<CandidateIssue> {
        serde_json::from_str::<Vec<RawIssue>>(SAMPLE)
            .unwrap()
            .into_iter()
            .map(CandidateIssue::from)
            .collect()
    }

    #[test]
    fn test_raw_issue_conversion() {
        let issues = parse();
        assert_eq!(issues.len(), 3);

        let first = &issues[0];
        assert_eq!(first.number, 42);
        assert_eq!(first.body, "");
        assert_eq!(first.labels, vec!["good first issue", "documentation"]);
        assert!(first.is_claimable());
    }

    #[test]
    fn test_pull_requests_and_assigned_are_not_claimable() {
        let issues = parse();
        assert!(issues[1].is_pull_request);
        assert!(!issues[1].is_claimable());
        assert!(issues[2].has_assignee);
        assert!(!issues[2].is_claimable());
    }

    #[test]
    fn test_closed_is_not_claimable() {
        let mut issue = parse().remove(0);
        issue.state = "closed".to_string();
        assert!(!issue.is_claimable());
    }

    #[test]
    fn test_issues_route_without_label() {
        let route = issues_route("helm", "helm", &ListOptions::default());
        assert_eq!(
            route,
            "/repos/helm/helm/issues?state=open&sort=created&direction=desc&per_page=10"
        );
    }

    #[test]
    fn test_issues_route_encodes_label() {
        let options = ListOptions {
            per_page: 20,
            label: Some("good first issue".to_string()),
        };
        let route = issues_route("helm", "helm", &options);
        assert!(route.contains("per_page=20"));
        assert!(route.ends_with("&labels=good%20first%20issue"));
    }

    #[test]
    fn test_issues_route_caps_page_size() {
        let options = ListOptions {
            per_page: 250,
            label: None,
        };
        assert!(issues_route("a", "b", &options).ends_with("per_page=100"));
    }
}
