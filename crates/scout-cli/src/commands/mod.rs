// SPDX-License-Identifier: Apache-2.0

//! Command handlers for the Scout CLI.

pub mod find;
pub mod history;
pub mod projects;
pub mod rate_limit;
pub mod types;

use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use scout_core::AppConfig;

use crate::cli::{Commands, OutputContext};
use crate::output;

/// Creates a styled spinner (only if interactive).
fn maybe_spinner(ctx: &OutputContext, message: &str) -> Option<ProgressBar> {
    if !ctx.is_interactive() {
        return None;
    }
    let s = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        s.set_style(style);
    }
    s.set_message(message.to_string());
    s.enable_steady_tick(Duration::from_millis(100));
    Some(s)
}

/// Dispatch to the appropriate command handler.
pub async fn run(command: Commands, ctx: OutputContext, config: &AppConfig) -> Result<()> {
    match command {
        Commands::Find(args) => {
            let spinner = maybe_spinner(&ctx, "Scanning projects...");
            let result = find::run(&args, config).await;
            if let Some(s) = spinner {
                s.finish_and_clear();
            }
            output::render(&result?, &ctx)
        }
        Commands::Projects { category } => output::render(&projects::run(&category)?, &ctx),
        Commands::History { limit } => output::render(&history::run(limit).await?, &ctx),
        Commands::RateLimit => {
            let spinner = maybe_spinner(&ctx, "Checking rate limit...");
            let result = rate_limit::run(&config.governor).await;
            if let Some(s) = spinner {
                s.finish_and_clear();
            }
            output::render(&result?, &ctx)
        }
    }
}
