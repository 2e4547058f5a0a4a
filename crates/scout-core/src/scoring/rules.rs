// SPDX-License-Identifier: Apache-2.0

//! Bonus and penalty table applied after the weighted factors.
//!
//! Every rule is data: a name, a [`Condition`] and a signed weight. The
//! engine evaluates the whole table uniformly and sums the weights of the
//! rules that match.

/// A normalized view of an issue for rule evaluation.
///
/// All strings are lower-cased once up front.
#[derive(Debug, Clone)]
pub struct IssueView {
    /// Lower-cased title.
    pub title: String,
    /// Lower-cased body.
    pub body: String,
    /// Lower-cased `title + " " + body`.
    pub text: String,
    /// Lower-cased label names.
    pub labels: Vec<String>,
    /// Lower-cased repository name.
    pub project: String,
    /// Lower-cased project category.
    pub category: String,
    /// Comment count.
    pub comments: u32,
    /// Hours since creation. Negative for timestamps in the future.
    pub age_hours: f64,
}

impl IssueView {
    /// Builds a view from raw parts.
    #[must_use]
    pub fn new(
        title: &str,
        body: &str,
        labels: &[String],
        project: &str,
        category: &str,
        comments: u32,
        age_hours: f64,
    ) -> Self {
        let title = title.to_lowercase();
        let body = body.to_lowercase();
        let text = format!("{title} {body}");
        Self {
            title,
            body,
            text,
            labels: labels.iter().map(|l| l.to_lowercase()).collect(),
            project: project.to_lowercase(),
            category: category.to_lowercase(),
            comments,
            age_hours,
        }
    }

    /// True if any label contains `needle` (GitHub label names vary, so
    /// this is a substring match).
    #[must_use]
    pub fn has_label(&self, needle: &str) -> bool {
        self.labels.iter().any(|l| l.contains(needle))
    }
}

/// Predicate over an [`IssueView`].
#[derive(Debug, Clone, Copy)]
pub enum Condition {
    /// Title or body mentions any keyword.
    TextAny(&'static [&'static str]),
    /// Title mentions any keyword.
    TitleAny(&'static [&'static str]),
    /// Body mentions any keyword.
    BodyAny(&'static [&'static str]),
    /// Some label contains any keyword.
    LabelAny(&'static [&'static str]),
    /// Project category contains any keyword.
    CategoryAny(&'static [&'static str]),
    /// Repository name contains any keyword.
    ProjectAny(&'static [&'static str]),
    /// Title or body mentions at least `at_least` distinct keywords.
    TextCount {
        /// Keywords to count.
        keywords: &'static [&'static str],
        /// Minimum number of distinct matches.
        at_least: usize,
    },
    /// Open strictly between `min_hours` and `max_hours` with few comments.
    Stale {
        /// Lower age bound, exclusive.
        min_hours: f64,
        /// Upper age bound, exclusive.
        max_hours: f64,
        /// Maximum comment count, inclusive.
        max_comments: u32,
    },
    /// Any nested condition holds.
    AnyOf(&'static [Condition]),
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(*k))
}

impl Condition {
    /// Evaluates the condition.
    #[must_use]
    pub fn matches(&self, view: &IssueView) -> bool {
        match *self {
            Condition::TextAny(keywords) => contains_any(&view.text, keywords),
            Condition::TitleAny(keywords) => contains_any(&view.title, keywords),
            Condition::BodyAny(keywords) => contains_any(&view.body, keywords),
            Condition::LabelAny(keywords) => keywords.iter().any(|k| view.has_label(k)),
            Condition::CategoryAny(keywords) => contains_any(&view.category, keywords),
            Condition::ProjectAny(keywords) => contains_any(&view.project, keywords),
            Condition::TextCount { keywords, at_least } => {
                keywords.iter().filter(|k| view.text.contains(**k)).count() >= at_least
            }
            Condition::Stale {
                min_hours,
                max_hours,
                max_comments,
            } => {
                view.age_hours > min_hours
                    && view.age_hours < max_hours
                    && view.comments <= max_comments
            }
            Condition::AnyOf(conditions) => conditions.iter().any(|c| c.matches(view)),
        }
    }
}

/// A named, weighted rule.
#[derive(Debug, Clone, Copy)]
pub struct Modifier {
    /// Stable identifier, shown in score breakdowns.
    pub name: &'static str,
    /// When the rule applies.
    pub condition: Condition,
    /// Added to the score when the rule applies. Negative for penalties.
    pub weight: f64,
}

const GOOD_FIRST_LABELS: &[&str] = &["good first issue", "good-first-issue"];
const HELP_WANTED_LABELS: &[&str] = &["help wanted", "help-wanted"];

/// Beginner labels that mark an issue as entry level.
pub const BEGINNER_LABELS: &[&str] = &[
    "beginner",
    "starter",
    "easy",
    "newcomer",
    "first-timers-only",
];

/// Cloud-native project names.
pub const CLOUD_NATIVE_PROJECTS: &[&str] = &[
    "kubernetes",
    "prometheus",
    "etcd",
    "istio",
    "cilium",
    "containerd",
    "grpc",
    "helm",
    "dapr",
    "keda",
    "argo",
    "rancher",
    "velero",
    "traefik",
    "flux",
    "knative",
    "opa",
    "cni",
    "cri-o",
    "runc",
    "coredns",
    "envoy",
    "linkerd",
    "crossplane",
    "keptn",
    "openfeature",
    "backstage",
    "dragonfly",
    "vineyard",
];

const CLOUD_KEYWORDS: &[&str] = &[
    "gcp",
    "google cloud",
    "compute engine",
    "gke",
    "cloud sql",
    "bigquery",
    "pubsub",
    "aws",
    "amazon web",
    "ec2",
    "s3 bucket",
    "lambda",
    "eks",
    "rds",
    "dynamodb",
    "azure",
    "microsoft azure",
    "aks",
    "azure functions",
    "azure storage",
];

/// The modifier table, in evaluation order.
pub static MODIFIERS: &[Modifier] = &[
    // Bonuses
    Modifier {
        name: "good_first_issue_mention",
        condition: Condition::AnyOf(&[
            Condition::TextAny(&["good first issue"]),
            Condition::LabelAny(&["good first issue"]),
        ]),
        weight: 0.20,
    },
    Modifier {
        name: "help_wanted_mention",
        condition: Condition::AnyOf(&[
            Condition::TextAny(&["help wanted"]),
            Condition::LabelAny(&["help wanted"]),
        ]),
        weight: 0.15,
    },
    Modifier {
        name: "security_category",
        condition: Condition::CategoryAny(&["tls", "security"]),
        weight: 0.10,
    },
    Modifier {
        name: "security_text",
        condition: Condition::TextAny(&["tls", "ssl", "certificate", "https"]),
        weight: 0.10,
    },
    Modifier {
        name: "cloud_native_project",
        condition: Condition::ProjectAny(CLOUD_NATIVE_PROJECTS),
        weight: 0.15,
    },
    Modifier {
        name: "good_first_issue_label",
        condition: Condition::LabelAny(GOOD_FIRST_LABELS),
        weight: 0.25,
    },
    Modifier {
        name: "help_wanted_label",
        condition: Condition::LabelAny(HELP_WANTED_LABELS),
        weight: 0.20,
    },
    Modifier {
        name: "beginner_label",
        condition: Condition::LabelAny(BEGINNER_LABELS),
        weight: 0.15,
    },
    Modifier {
        name: "documentation",
        condition: Condition::AnyOf(&[
            Condition::TextAny(&["documentation", "docs"]),
            Condition::TitleAny(&["doc:"]),
            Condition::LabelAny(&["documentation"]),
        ]),
        weight: 0.15,
    },
    Modifier {
        name: "clear_scope",
        condition: Condition::TextCount {
            keywords: &[
                "file:",
                "func:",
                "in ",
                "method",
                "struct",
                "interface",
                "package",
            ],
            at_least: 2,
        },
        weight: 0.10,
    },
    Modifier {
        name: "reproduction_steps",
        condition: Condition::BodyAny(&["```", "steps to reproduce", "reproduc"]),
        weight: 0.10,
    },
    Modifier {
        name: "easy_fix",
        condition: Condition::TextAny(&[
            "quick", "easy", "simple", "trivial", "small", "minor", "typo", "spelling",
        ]),
        weight: 0.05,
    },
    Modifier {
        name: "stale_low_engagement",
        condition: Condition::Stale {
            min_hours: 720.0,
            max_hours: 4320.0,
            max_comments: 3,
        },
        weight: 0.10,
    },
    // Penalties
    Modifier {
        name: "cloud_provider_text",
        condition: Condition::TextAny(CLOUD_KEYWORDS),
        weight: -0.50,
    },
    Modifier {
        name: "cloud_provider_label",
        condition: Condition::LabelAny(&[
            "provider:google",
            "provider:aws",
            "provider:azure",
            "area/gcp",
            "area/aws",
            "area/azure",
        ]),
        weight: -0.50,
    },
    Modifier {
        name: "needs_triage",
        condition: Condition::LabelAny(&["needs-triage"]),
        weight: -0.15,
    },
    Modifier {
        name: "blocked",
        condition: Condition::TextAny(&[
            "blocked",
            "waiting for",
            "needs approval",
            "on hold",
            "pending",
        ]),
        weight: -0.20,
    },
    Modifier {
        name: "wont_fix",
        condition: Condition::LabelAny(&["wontfix", "invalid", "duplicate", "wont-fix"]),
        weight: -0.50,
    },
    Modifier {
        name: "needs_info",
        condition: Condition::LabelAny(&["needs info", "needs-information", "waitingforinfo"]),
        weight: -0.15,
    },
];

/// True if the labels mark the issue as suitable for a first contribution.
#[must_use]
pub fn is_entry_level(view: &IssueView) -> bool {
    Condition::LabelAny(GOOD_FIRST_LABELS).matches(view)
        || Condition::LabelAny(BEGINNER_LABELS).matches(view)
}
