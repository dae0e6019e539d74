//! Sync configuration, read from the environment.

use std::time::Duration;

use crate::wire::MovementVocabulary;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Base URL of the remote store, without trailing slash.
    pub api_url: String,
    pub auth_token: Option<String>,
    pub request_timeout: Duration,
    /// Retries for list fetches. Creation requests are never retried.
    pub fetch_retries: u32,
    /// Delay before the first retry; doubled after each attempt.
    pub retry_backoff: Duration,
    pub vocabulary: MovementVocabulary,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            request_timeout: Duration::from_secs(10),
            fetch_retries: 3,
            retry_backoff: Duration::from_millis(200),
            vocabulary: MovementVocabulary::Legacy,
        }
    }
}

impl SyncConfig {
    /// Build from `STOCKFLOW_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_url = lookup("STOCKFLOW_API_URL")
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| {
                tracing::info!("STOCKFLOW_API_URL not set; using {}", DEFAULT_API_URL);
                defaults.api_url.clone()
            });

        let auth_token = lookup("STOCKFLOW_AUTH_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let request_timeout = parse_or("STOCKFLOW_REQUEST_TIMEOUT_SECS", &lookup)
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let fetch_retries =
            parse_or("STOCKFLOW_FETCH_RETRIES", &lookup).unwrap_or(defaults.fetch_retries);

        let retry_backoff = parse_or("STOCKFLOW_RETRY_BACKOFF_MS", &lookup)
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_backoff);

        let vocabulary = parse_or("STOCKFLOW_MOVEMENT_VOCABULARY", &lookup)
            .unwrap_or(defaults.vocabulary);

        Self {
            api_url,
            auth_token,
            request_timeout,
            fetch_retries,
            retry_backoff,
            vocabulary,
        }
    }

    /// Join a path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

fn parse_or<T>(key: &str, lookup: &impl Fn(&str) -> Option<String>) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("ignoring invalid {}={:?}: {}", key, raw, e);
            None
        }
    }
}
