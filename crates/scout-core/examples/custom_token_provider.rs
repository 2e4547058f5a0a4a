// SPDX-License-Identifier: Apache-2.0

//! Implement a custom `TokenProvider` and run a small good-first-issue scan.
//!
//! Run with: `GH_TOKEN=... cargo run --example custom_token_provider -p scout-core`

use scout_core::{SearchConstraints, TokenProvider, find_issues};
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

/// Reads the token from a single environment variable.
struct EnvProvider {
    var: &'static str,
}

impl TokenProvider for EnvProvider {
    fn github_token(&self) -> Option<SecretString> {
        std::env::var(self.var).ok().map(SecretString::from)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let provider = EnvProvider { var: "GH_TOKEN" };

    let mut constraints = SearchConstraints::good_first(vec!["Go Tools".to_string()]);
    constraints.max_projects = 5;
    constraints.limit = Some(10);

    let issues = find_issues(&provider, &CancellationToken::new(), &constraints).await?;
    for issue in &issues {
        println!("{:.2}  {}  {}", issue.score, issue.project.full_name(), issue.title);
    }

    Ok(())
}
