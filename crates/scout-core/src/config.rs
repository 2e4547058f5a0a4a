// SPDX-License-Identifier: Apache-2.0

//! Configuration management for Scout.
//!
//! Provides layered configuration from files and environment variables.
//! Uses XDG-compliant paths with environment variable support.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables (prefix: `SCOUT_`)
//! 2. Config file: `~/.config/scout/config.toml`
//! 3. Built-in defaults
//!
//! # Examples
//!
//! ```bash
//! # Smaller batches for a slow connection
//! SCOUT_SCHEDULER__BATCH_SIZE=5 scout find
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::ScoutError;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// GitHub API settings.
    pub github: GitHubConfig,
    /// Call-budget governor settings.
    pub governor: GovernorConfig,
    /// Batch scheduler settings.
    pub scheduler: SchedulerConfig,
    /// Scoring weights and ceiling.
    pub scoring: ScoringConfig,
    /// Persistence settings.
    pub storage: StorageConfig,
}

/// GitHub API settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// API request timeout in seconds.
    pub api_timeout_seconds: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_timeout_seconds: 10,
        }
    }
}

/// Call-budget governor settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GovernorConfig {
    /// Block new calls once fewer than this many remain in the window.
    pub min_remaining: u32,
    /// Maximum attempts per call when throttled.
    pub max_attempts: u32,
    /// Backoff before the second attempt, doubled for each later one.
    pub base_delay_ms: u64,
    /// Wait used when the reported reset time has already passed.
    pub fallback_wait_secs: u64,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            min_remaining: 100,
            max_attempts: 5,
            base_delay_ms: 1000,
            fallback_wait_secs: 60,
        }
    }
}

impl GovernorConfig {
    /// Base retry delay as a `Duration`.
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Fallback wait as a `Duration`.
    #[must_use]
    pub fn fallback_wait(&self) -> Duration {
        Duration::from_secs(self.fallback_wait_secs)
    }
}

/// Batch scheduler settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Projects fetched concurrently per batch.
    pub batch_size: usize,
    /// Upper bound on projects visited per run.
    pub max_projects: usize,
    /// Newest open issues requested per project.
    pub issues_per_repo: u8,
    /// Pause between batches in milliseconds.
    pub batch_pause_ms: u64,
    /// Capacity of the scored-issue queue.
    pub queue_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            max_projects: 50,
            issues_per_repo: 10,
            batch_pause_ms: 500,
            queue_capacity: 100,
        }
    }
}

/// Scoring weights. The five factor weights should sum to 1.0.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight of the project popularity factor.
    pub popularity_weight: f64,
    /// Weight of the comment engagement factor.
    pub engagement_weight: f64,
    /// Weight of the issue recency factor.
    pub recency_weight: f64,
    /// Weight of the label factor.
    pub label_weight: f64,
    /// Weight of the difficulty factor.
    pub difficulty_weight: f64,
    /// Ceiling applied after bonuses and penalties.
    pub max_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            popularity_weight: 0.10,
            engagement_weight: 0.25,
            recency_weight: 0.25,
            label_weight: 0.25,
            difficulty_weight: 0.15,
            max_score: 1.5,
        }
    }
}

impl ScoringConfig {
    /// Sum of the five factor weights.
    #[must_use]
    pub fn weight_sum(&self) -> f64 {
        self.popularity_weight
            + self.engagement_weight
            + self.recency_weight
            + self.label_weight
            + self.difficulty_weight
    }

    /// Checks that no weight is negative and that the weights sum to 1.0.
    ///
    /// # Errors
    ///
    /// Returns `ScoutError::Config` naming the offending sum or weight.
    pub fn validate(&self) -> Result<(), ScoutError> {
        let weights = [
            ("popularity_weight", self.popularity_weight),
            ("engagement_weight", self.engagement_weight),
            ("recency_weight", self.recency_weight),
            ("label_weight", self.label_weight),
            ("difficulty_weight", self.difficulty_weight),
        ];
        if let Some((name, value)) = weights.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
            return Err(ScoutError::Config {
                message: format!("scoring.{name} must be a non-negative number, got {value}"),
            });
        }

        let sum = self.weight_sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoutError::Config {
                message: format!("scoring weights must sum to 1.0, got {sum:.4}"),
            });
        }
        Ok(())
    }
}

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Persistence settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the data directory for `seen.json` and `history.json`.
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolved data directory.
    #[must_use]
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(data_dir)
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the Scout configuration directory.
///
/// Respects the `XDG_CONFIG_HOME` environment variable if set,
/// otherwise defaults to `~/.config/scout`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg_config.is_empty() {
            return PathBuf::from(xdg_config).join("scout");
        }
    }
    home_dir().join(".config").join("scout")
}

/// Returns the Scout data directory.
///
/// Respects the `XDG_DATA_HOME` environment variable if set,
/// otherwise defaults to `~/.local/share/scout`.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        if !xdg_data.is_empty() {
            return PathBuf::from(xdg_data).join("scout");
        }
    }
    home_dir().join(".local").join("share").join("scout")
}

/// Returns the path to the configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load application configuration.
///
/// Loads from config file (if exists) and environment variables.
/// Environment variables use the prefix `SCOUT_` and double underscore
/// for nested keys (e.g., `SCOUT_GOVERNOR__MIN_REMAINING`).
///
/// # Errors
///
/// Returns `ScoutError::Config` if the config file exists but is invalid,
/// or if the scoring weights do not sum to 1.0.
pub fn load_config() -> Result<AppConfig, ScoutError> {
    let config_path = config_file_path();

    let config = Config::builder()
        .add_source(File::with_name(config_path.to_string_lossy().as_ref()).required(false))
        .add_source(
            Environment::with_prefix("SCOUT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    app_config.scoring.validate()?;

    Ok(app_config)
}
