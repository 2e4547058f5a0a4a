// SPDX-License-Identifier: Apache-2.0

//! CLI-specific `TokenProvider` implementation.
//!
//! Resolves the GitHub token from `GH_TOKEN`, `GITHUB_TOKEN`, or the GitHub
//! CLI, in that order.

use scout_core::TokenProvider;
use scout_core::github::auth::resolve_token;
use secrecy::SecretString;
use tracing::debug;

/// CLI implementation of `TokenProvider`.
pub struct CliTokenProvider;

impl TokenProvider for CliTokenProvider {
    fn github_token(&self) -> Option<SecretString> {
        if let Some((token, source)) = resolve_token() {
            debug!(%source, "Resolved GitHub token");
            Some(token)
        } else {
            debug!("No GitHub token found");
            None
        }
    }
}
