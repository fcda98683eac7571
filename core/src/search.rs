//! GitHub issue-search counting client.
//!
//! Each count is a single search call with `per_page=1`; only the
//! `total_count` metadata is read, never the items. Primary rate limits are
//! retried a small bounded number of times using the server-suggested wait;
//! secondary (abuse-detection) limits and every other failure propagate
//! immediately.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, RETRY_AFTER, USER_AGENT};
use serde::Deserialize;

use crate::error::{Result, StatsError};
use crate::query::SearchQuery;

/// Default search API endpoint.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// REST API version header value.
const GITHUB_API_VERSION: &str = "2022-11-28";

/// User-Agent sent with every request; GitHub rejects agent-less requests.
const CLIENT_USER_AGENT: &str = concat!("issue-stats/", env!("CARGO_PKG_VERSION"));

/// Retries allowed on a primary rate limit before giving up.
const MAX_RATE_LIMIT_RETRIES: usize = 2;

/// Wait applied when the server does not suggest one.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Relevant slice of a search response.
#[derive(Debug, Deserialize)]
struct SearchCountResponse {
    total_count: u64,
}

/// GitHub error body shape.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Authenticated counting client over the search endpoint.
pub struct SearchClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl SearchClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, GITHUB_API_URL)
    }

    /// Point the client at a different endpoint. Used in tests and for
    /// GitHub Enterprise hosts.
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Count the issues matching `query`, retrying primary rate limits up to
    /// [`MAX_RATE_LIMIT_RETRIES`] times.
    pub async fn count(&self, query: &SearchQuery) -> Result<u64> {
        let q = query.to_query_string();
        let mut retries = 0;
        loop {
            match self.count_once(&q).await {
                Ok(count) => return Ok(count),
                Err(err) if err.is_primary_rate_limit() && retries < MAX_RATE_LIMIT_RETRIES => {
                    let wait = err.retry_after().unwrap_or(DEFAULT_RETRY_AFTER);
                    retries += 1;
                    tracing::warn!(
                        query = %q,
                        attempt = retries,
                        "primary rate limit, retrying in {wait:?}"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn count_once(&self, q: &str) -> Result<u64> {
        // The query string carries literal `+` separators and `label:` values
        // with `/` and `@`; the URL is assembled by hand so nothing gets
        // re-encoded into a shape the search grammar no longer accepts.
        let url = format!("{}/search/issues?q={q}&per_page=1", self.base_url);
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .await
            .map_err(|source| StatsError::Network { source })?;

        let status = response.status();
        if status.is_success() {
            let body: SearchCountResponse = response
                .json()
                .await
                .map_err(|source| StatsError::Network { source })?;
            return Ok(body.total_count);
        }

        Err(classify_failure(status, &response_details(response).await))
    }
}

/// Headers and body of a failed response, captured before classification.
struct FailureDetails {
    retry_after: Option<Duration>,
    remaining_zero: bool,
    message: String,
}

async fn response_details(response: reqwest::Response) -> FailureDetails {
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs);
    let remaining_zero = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        == Some("0");

    let raw = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&raw)
        .map(|body| body.message)
        .unwrap_or(raw);

    FailureDetails {
        retry_after,
        remaining_zero,
        message,
    }
}

fn classify_failure(status: StatusCode, details: &FailureDetails) -> StatsError {
    if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
        if details.message.to_lowercase().contains("secondary rate limit") {
            return StatsError::SecondaryRateLimit;
        }
        if details.remaining_zero || details.retry_after.is_some() {
            return StatsError::RateLimited {
                retry_after: details.retry_after,
            };
        }
    }
    StatsError::ApiResponse {
        status: status.as_u16(),
        message: details.message.clone(),
    }
}
