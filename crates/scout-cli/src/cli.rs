// SPDX-License-Identifier: Apache-2.0

//! Command-line interface definition for Scout.
//!
//! Uses clap's derive API for declarative CLI parsing.

use std::io::IsTerminal;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with colors (default)
    #[default]
    Text,
    /// JSON output for programmatic consumption
    Json,
}

/// Global output configuration passed to commands.
#[derive(Debug, Clone)]
pub struct OutputContext {
    /// Output format (text, json)
    pub format: OutputFormat,
    /// Suppress non-essential output (spinners, progress)
    pub quiet: bool,
    /// Whether stdout is a terminal (TTY)
    pub is_tty: bool,
}

impl OutputContext {
    /// Creates an `OutputContext` from CLI arguments.
    pub fn from_cli(format: OutputFormat, quiet: bool) -> Self {
        Self {
            format,
            quiet,
            is_tty: std::io::stdout().is_terminal(),
        }
    }

    /// Returns true if interactive elements (spinners, colors) should be shown.
    pub fn is_interactive(&self) -> bool {
        self.is_tty && !self.quiet && matches!(self.format, OutputFormat::Text)
    }
}

/// Scout - find contributor-friendly GitHub issues.
///
/// Scans a curated catalog of open source projects, scores every open issue
/// for approachability and prints a ranked list of issues not shown before.
#[derive(Parser)]
#[command(name = "scout")]
#[command(version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Output format (text, json)
    #[arg(long, short = 'o', global = true, default_value = "text", value_enum)]
    pub output: OutputFormat,

    /// Suppress non-essential output (spinners, progress)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable debug-level logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Scan the catalog and print ranked issues
    Find(FindArgs),

    /// List catalog projects
    Projects {
        /// Only list projects in these categories
        #[arg(long, short = 'c', value_delimiter = ',')]
        category: Vec<String>,
    },

    /// Show the highest-scored issues discovered so far
    History {
        /// Number of issues to show
        #[arg(long, short = 'n', default_value_t = 20)]
        limit: usize,
    },

    /// Show the current GitHub API rate limit
    RateLimit,
}

/// Arguments for `scout find`.
#[derive(Debug, Args)]
pub struct FindArgs {
    /// Only issues labelled "good first issue", with a score boost
    #[arg(long)]
    pub good_first: bool,

    /// Only scan projects in these categories
    #[arg(long, short = 'c', value_delimiter = ',')]
    pub category: Vec<String>,

    /// Keep only issues mentioning one of these keywords
    #[arg(long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Drop issues mentioning any of these keywords
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Only fetch issues carrying this label
    #[arg(long, conflicts_with = "good_first")]
    pub label: Option<String>,

    /// Maximum number of issues to print
    #[arg(long, short = 'n', default_value_t = 20)]
    pub limit: usize,

    /// Override the number of projects scanned
    #[arg(long)]
    pub max_projects: Option<usize>,

    /// Override the number of projects fetched concurrently
    #[arg(long)]
    pub batch_size: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_find_parses_lists() {
        let cli = Cli::parse_from([
            "scout",
            "find",
            "--category",
            "Kubernetes,Go Tools",
            "--exclude",
            "flaky",
            "-n",
            "5",
        ]);
        let Commands::Find(args) = cli.command else {
            panic!("expected find");
        };
        assert_eq!(args.category, vec!["Kubernetes", "Go Tools"]);
        assert_eq!(args.exclude, vec!["flaky"]);
        assert_eq!(args.limit, 5);
        assert!(!args.good_first);
    }

    #[test]
    fn test_good_first_conflicts_with_label() {
        let result = Cli::try_parse_from(["scout", "find", "--good-first", "--label", "bug"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_non_interactive_when_json() {
        let ctx = OutputContext {
            format: OutputFormat::Json,
            quiet: false,
            is_tty: true,
        };
        assert!(!ctx.is_interactive());
    }
}
