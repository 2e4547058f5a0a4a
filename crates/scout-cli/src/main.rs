// SPDX-License-Identifier: Apache-2.0

//! Scout - find contributor-friendly GitHub issues.
//!
//! Scans a curated catalog of open source projects under a shared GitHub rate
//! budget, scores every open issue and prints the best ones not shown before.

mod cli;
mod commands;
mod errors;
mod logging;
mod output;
mod provider;

use anyhow::{Context, Result};
use clap::Parser;
use scout_core::load_config;
use tracing::debug;

use crate::cli::{Cli, OutputContext};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.output, cli.quiet, cli.verbose);

    let output_ctx = OutputContext::from_cli(cli.output, cli.quiet);

    let config = load_config().context("Failed to load configuration")?;
    debug!("Configuration loaded successfully");

    match commands::run(cli.command, output_ctx, &config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            let formatted = errors::format_error(&e);
            eprintln!("Error: {formatted}");
            Err(e)
        }
    }
}
