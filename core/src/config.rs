//! Run configuration.
//!
//! Loaded from `~/.config/issue-stats/config.toml` (or the path in
//! `ISSUE_STATS_CONFIG`). Every field has a default matching the production
//! job, so the tool runs with no config file at all. Verbosity is a CLI
//! concern; there is no global debug switch here.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{Result, StatsError};
use crate::window::DEFAULT_MAX_WINDOWS;

/// Configuration for one reporting run.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsConfig {
    /// Repository queried, `owner/name`.
    #[serde(default = "default_repo")]
    pub repo: String,

    /// Component labels defining the team's issue surface. Priority labels
    /// (`p0`/`p1`/`p2`) are appended per query on top of this list.
    #[serde(default = "default_core_labels")]
    pub core_labels: Vec<String>,

    /// First date ever processed; resume point when no archive exists.
    #[serde(default = "default_epoch")]
    pub epoch: NaiveDate,

    /// Cap on windows processed in a single run.
    #[serde(default = "default_max_windows")]
    pub max_windows: usize,

    /// Summary archive path.
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,

    /// Rendered markdown report path.
    #[serde(default = "default_report_file")]
    pub report_file: PathBuf,

    /// Report title (rendered as a level-1 heading).
    #[serde(default = "default_report_title")]
    pub report_title: String,

    /// Environment variable holding the API token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Search API base URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_repo() -> String {
    "aws/aws-cdk".to_string()
}

fn default_core_labels() -> Vec<String> {
    [
        "cli",
        "toolkit/migrate",
        "package/tools",
        "package/cfn",
        "hotswap",
        "@aws-cdk/triggers",
        "@aws-cdk/region-info",
        "@aws-cdk/pipelines",
        "@aws-cdk/integ-tests",
        "@aws-cdk/integ-runner",
        "@aws-cdk/cx-api",
        "@aws-cdk/core",
        "@aws-cdk/cloudformation-diff",
        "@aws-cdk/cloud-assembly-schema",
        "@aws-cdk/cfnspec",
        "@aws-cdk/assets",
        "@aws-cdk/assert",
        "@aws-cdk/assertions",
    ]
    .map(String::from)
    .to_vec()
}

fn default_epoch() -> NaiveDate {
    // First week the production job ever covered.
    NaiveDate::from_ymd_opt(2023, 4, 15).unwrap_or_default()
}

fn default_max_windows() -> usize {
    DEFAULT_MAX_WINDOWS
}

fn default_cache_file() -> PathBuf {
    PathBuf::from("core-summaries.json")
}

fn default_report_file() -> PathBuf {
    PathBuf::from("core-summaries.md")
}

fn default_report_title() -> String {
    "Core Team Issue Statistics".to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_api_base_url() -> String {
    crate::search::GITHUB_API_URL.to_string()
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            repo: default_repo(),
            core_labels: default_core_labels(),
            epoch: default_epoch(),
            max_windows: default_max_windows(),
            cache_file: default_cache_file(),
            report_file: default_report_file(),
            report_title: default_report_title(),
            token_env: default_token_env(),
            api_base_url: default_api_base_url(),
        }
    }
}

impl StatsConfig {
    /// Environment variable for config path override.
    pub const ENV_CONFIG_PATH: &'static str = "ISSUE_STATS_CONFIG";

    /// Default config filename.
    pub const DEFAULT_CONFIG_FILENAME: &'static str = "config.toml";

    /// Load configuration.
    ///
    /// Resolution order:
    /// 1. `ISSUE_STATS_CONFIG` environment variable
    /// 2. `~/.config/issue-stats/config.toml`
    ///
    /// A missing file is not an error; defaults are used.
    pub fn load() -> Result<Self> {
        let path = Self::resolve_config_path();
        if !path.exists() {
            tracing::info!(path = %path.display(), "config not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| StatsError::FileRead {
            path: path.clone(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: StatsConfig = toml::from_str(contents)
            .map_err(|e| StatsError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn resolve_config_path() -> PathBuf {
        if let Ok(path) = std::env::var(Self::ENV_CONFIG_PATH) {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .map(|h| {
                h.join(".config")
                    .join("issue-stats")
                    .join(Self::DEFAULT_CONFIG_FILENAME)
            })
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_CONFIG_FILENAME))
    }

    fn validate(&self) -> Result<()> {
        if !self.repo.contains('/') {
            return Err(StatsError::Config(format!(
                "repo must be owner/name, got {:?}",
                self.repo
            )));
        }
        if self.core_labels.is_empty() {
            tracing::warn!("core_labels is empty; counts will cover the whole repository");
        }
        if self.max_windows == 0 {
            tracing::warn!("max_windows is 0; no new weeks will ever be processed");
        }
        Ok(())
    }
}
