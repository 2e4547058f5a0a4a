// SPDX-License-Identifier: Apache-2.0

//! Scan the catalog for issues.

use anyhow::Result;
use scout_core::{AppConfig, SearchConstraints, github_finder, rank};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::types::FindResult;
use crate::cli::FindArgs;
use crate::provider::CliTokenProvider;

/// Search constraints for the given arguments.
///
/// `--good-first` starts from the good-first-issue preset; otherwise sizing
/// comes from configuration. Explicit flags override either.
pub fn constraints(args: &FindArgs, config: &AppConfig) -> SearchConstraints {
    let mut constraints = if args.good_first {
        SearchConstraints::good_first(args.category.clone())
    } else {
        let mut constraints = SearchConstraints::from_config(&config.scheduler);
        constraints.categories.clone_from(&args.category);
        constraints.label.clone_from(&args.label);
        constraints
    };

    constraints.include_keywords.clone_from(&args.include);
    constraints.exclude_keywords.clone_from(&args.exclude);
    constraints.limit = Some(args.limit);
    if let Some(max_projects) = args.max_projects {
        constraints.max_projects = max_projects;
    }
    if let Some(batch_size) = args.batch_size {
        constraints.batch_size = batch_size;
    }
    constraints
}

/// A token cancelled on Ctrl+C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, finishing current batch");
                on_signal.cancel();
            }
            Err(e) => warn!(error = %e, "Failed to install Ctrl+C handler"),
        }
    });
    cancel
}

/// Scan and rank.
pub async fn run(args: &FindArgs, config: &AppConfig) -> Result<FindResult> {
    let constraints = constraints(args, config);
    let finder = github_finder(&CliTokenProvider, config).await?;

    let mut report = finder.scan(&cancel_on_ctrl_c(), &constraints).await;
    let issues = rank(std::mem::take(&mut report.issues), constraints.limit);
    Ok(FindResult::new(&report, issues))
}
