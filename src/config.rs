// Client, cache and filter configuration

use std::time::Duration;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

// Checked in order; the second name is the one older dashboard builds used
pub const API_URL_ENV_VARS: [&str; 2] = ["NEXT_PUBLIC_API_URL", "REACT_APP_API_URL"];

pub const DEFAULT_USER_AGENT: &str = "cinema-admin-client/0.1";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    // None means requests never time out, matching the dashboard's behavior
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    // Builds the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    // Builds the configuration from an arbitrary variable lookup.
    //
    // The first non-blank value among [`API_URL_ENV_VARS`] wins, otherwise
    // the base URL is [`DEFAULT_BASE_URL`].
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = API_URL_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            base_url: normalize_base_url(&base_url),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ClientError::ConfigError(format!(
                "base URL must be http(s): {}",
                self.base_url
            )));
        }
        if self.request_timeout == Some(Duration::ZERO) {
            return Err(ClientError::ConfigError(
                "request timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    // Joins the base URL and an endpoint path that starts with '/'
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

// Query cache configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    // How long a successful result is served without refetching
    pub stale_time: Duration,
    // How long an entry survives without being read
    pub gc_time: Duration,
    pub max_entries: usize,
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(60),
            gc_time: Duration::from_secs(300),
            max_entries: 512,
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    pub debounce: Duration,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1000),
        }
    }
}
