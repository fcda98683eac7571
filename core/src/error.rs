//! Error types for issue-stats operations.
//!
//! Default policy: anything that fails mid-run is fatal and aborts the run
//! (no partial weekly records are ever persisted). The one exception is the
//! rate-limit classification below, which drives the bounded retry in the
//! search client.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for issue-stats operations.
pub type Result<T> = std::result::Result<T, StatsError>;

/// Error taxonomy for a reporting run.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize JSON: {source}")]
    JsonSerialize { source: serde_json::Error },

    #[error("network error: {source}")]
    Network { source: reqwest::Error },

    #[error("search API returned {status}: {message}")]
    ApiResponse { status: u16, message: String },

    /// Primary rate limit: the hourly search quota is exhausted. The client
    /// retries these a bounded number of times before propagating.
    #[error("primary rate limit reported by search API")]
    RateLimited { retry_after: Option<Duration> },

    /// Secondary (abuse-detection) rate limit. Never retried.
    #[error("secondary rate limit reported by search API")]
    SecondaryRateLimit,
}

impl StatsError {
    /// Whether the bounded rate-limit retry in the search client applies.
    ///
    /// Only the primary rate limit qualifies; the secondary limit signals
    /// abuse detection and backing off briefly does not clear it.
    pub fn is_primary_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Server-suggested wait before the next attempt, if one was provided.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_rate_limit_is_retryable() {
        let err = StatsError::RateLimited {
            retry_after: Some(Duration::from_secs(30)),
        };
        assert!(err.is_primary_rate_limit());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn secondary_rate_limit_is_not_retryable() {
        let err = StatsError::SecondaryRateLimit;
        assert!(!err.is_primary_rate_limit());
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn api_response_display_includes_status_and_message() {
        let err = StatsError::ApiResponse {
            status: 422,
            message: "Validation Failed".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("422"));
        assert!(display.contains("Validation Failed"));
    }
}
