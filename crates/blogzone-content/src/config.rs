//! Content API client settings.

use std::time::Duration;

/// Where the Content API lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentConfig {
    /// Base URL without a trailing slash, e.g. `http://localhost:5000`.
    pub base_url: String,

    /// Whole-request timeout.
    pub request_timeout: Duration,

    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
}

impl ContentConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:5000";
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Creates a config for `base_url` with default timeouts. A trailing
    /// `/` is dropped so paths can be appended as `/blogs`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(
                Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            ),
            connect_timeout: Duration::from_secs(
                Self::DEFAULT_CONNECT_TIMEOUT_SECS,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_config_default() {
        let config = ContentConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_with_base_url_trims_trailing_slashes() {
        let config = ContentConfig::with_base_url("https://api.example.com//");
        assert_eq!(config.base_url, "https://api.example.com");
    }
}
