// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for the Scout CLI.
//!
//! Uses `tracing` with `tracing-subscriber` for structured logging to stderr.
//! `RUST_LOG` overrides the defaults below.
//!
//! # Examples
//!
//! ```bash
//! # Default: info level for scout, errors only for octocrab
//! scout find
//!
//! # Debug output for troubleshooting
//! scout -v find
//!
//! # Trace the governor only
//! RUST_LOG=scout_core::governor=trace scout find
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::OutputFormat;

/// Default filter for the given flags.
///
/// Structured output keeps stderr quiet unless something goes wrong.
fn default_filter(format: OutputFormat, quiet: bool, verbose: bool) -> &'static str {
    if verbose {
        "scout=debug,octocrab=error,reqwest=error"
    } else if quiet || format == OutputFormat::Json {
        "scout=warn,octocrab=error,reqwest=error"
    } else {
        "scout=info,octocrab=error,reqwest=error"
    }
}

/// Initialize the logging subsystem.
pub fn init_logging(format: OutputFormat, quiet: bool, verbose: bool) {
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(format, quiet, verbose)));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_wins() {
        assert!(default_filter(OutputFormat::Json, true, true).starts_with("scout=debug"));
    }

    #[test]
    fn test_json_is_quiet() {
        assert!(default_filter(OutputFormat::Json, false, false).starts_with("scout=warn"));
        assert!(default_filter(OutputFormat::Text, true, false).starts_with("scout=warn"));
    }

    #[test]
    fn test_text_default_is_info() {
        assert!(default_filter(OutputFormat::Text, false, false).starts_with("scout=info"));
    }
}
