//! Startup configuration, read from `BLOGZONE_*` environment variables.
//!
//! | variable                          | default                 |
//! |-----------------------------------|-------------------------|
//! | `BLOGZONE_CONTENT_URL`            | `http://localhost:5000` |
//! | `BLOGZONE_REQUEST_TIMEOUT_SECS`   | `30`                    |
//! | `BLOGZONE_CONNECT_TIMEOUT_SECS`   | `10`                    |
//! | `BLOGZONE_GATEWAY_API_KEY`        | required                |
//! | `BLOGZONE_GATEWAY_PROJECT_ID`     | required                |
//! | `BLOGZONE_GATEWAY_AUTH_DOMAIN`    | derived from project id |
//! | `BLOGZONE_GATEWAY_STORAGE_BUCKET` | derived from project id |
//! | `BLOGZONE_LOG`                    | `info`                  |

use std::time::Duration;

use blogzone_content::ContentConfig;
use blogzone_identity::GatewayConfig;

pub const CONTENT_URL_VAR: &str = "BLOGZONE_CONTENT_URL";
pub const REQUEST_TIMEOUT_VAR: &str = "BLOGZONE_REQUEST_TIMEOUT_SECS";
pub const CONNECT_TIMEOUT_VAR: &str = "BLOGZONE_CONNECT_TIMEOUT_SECS";
pub const GATEWAY_API_KEY_VAR: &str = "BLOGZONE_GATEWAY_API_KEY";
pub const GATEWAY_PROJECT_ID_VAR: &str = "BLOGZONE_GATEWAY_PROJECT_ID";
pub const GATEWAY_AUTH_DOMAIN_VAR: &str = "BLOGZONE_GATEWAY_AUTH_DOMAIN";
pub const GATEWAY_STORAGE_BUCKET_VAR: &str = "BLOGZONE_GATEWAY_STORAGE_BUCKET";
pub const LOG_VAR: &str = "BLOGZONE_LOG";

/// Default tracing filter when `BLOGZONE_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Errors while reading configuration or setting up logging.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("missing required setting {var}")]
    Missing { var: &'static str },

    /// A variable is set but can't be used.
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// The tracing subscriber could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(String),
}

/// Everything the client needs at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogzoneConfig {
    pub content: ContentConfig,
    /// Identifiers for the vendor gateway. Read by
    /// [`Site::connect_with`](crate::Site::connect_with); callers passing
    /// a ready gateway to [`Site::connect`](crate::Site::connect) use it
    /// to build that gateway themselves.
    pub gateway: GatewayConfig,
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info` or
    /// `blogzone_session=debug,info`.
    pub log_filter: String,
}

impl BlogzoneConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    /// See [`from_lookup`](Self::from_lookup).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads settings through `lookup`, which returns a variable's value
    /// or `None` if unset. Blank values count as unset.
    ///
    /// # Errors
    /// - [`ConfigError::Missing`] if the gateway API key or project id is
    ///   absent
    /// - [`ConfigError::Invalid`] for a non-numeric timeout or a content
    ///   URL without an `http://`/`https://` scheme
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |var: &str| {
            lookup(var)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let require = |var: &'static str| get(var).ok_or(ConfigError::Missing { var });

        let base_url = get(CONTENT_URL_VAR)
            .unwrap_or_else(|| ContentConfig::DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: CONTENT_URL_VAR,
                value: base_url,
                reason: "expected an http:// or https:// URL".into(),
            });
        }

        let content = ContentConfig {
            request_timeout: secs(
                REQUEST_TIMEOUT_VAR,
                get(REQUEST_TIMEOUT_VAR),
                ContentConfig::DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            connect_timeout: secs(
                CONNECT_TIMEOUT_VAR,
                get(CONNECT_TIMEOUT_VAR),
                ContentConfig::DEFAULT_CONNECT_TIMEOUT_SECS,
            )?,
            ..ContentConfig::with_base_url(base_url)
        };

        let gateway = GatewayConfig {
            auth_domain: get(GATEWAY_AUTH_DOMAIN_VAR),
            storage_bucket: get(GATEWAY_STORAGE_BUCKET_VAR),
            ..GatewayConfig::new(
                require(GATEWAY_API_KEY_VAR)?,
                require(GATEWAY_PROJECT_ID_VAR)?,
            )
        };

        let log_filter =
            get(LOG_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            content,
            gateway,
            log_filter,
        })
    }
}

fn secs(
    var: &'static str,
    value: Option<String>,
    default: u64,
) -> Result<Duration, ConfigError> {
    match value {
        None => Ok(Duration::from_secs(default)),
        Some(raw) => match raw.parse::<u64>() {
            Ok(0) => Err(ConfigError::Invalid {
                var,
                value: raw,
                reason: "timeout must be at least one second".into(),
            }),
            Ok(n) => Ok(Duration::from_secs(n)),
            Err(e) => Err(ConfigError::Invalid {
                var,
                value: raw,
                reason: e.to_string(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            (GATEWAY_API_KEY_VAR, "key-123"),
            (GATEWAY_PROJECT_ID_VAR, "demo-blog"),
        ]
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = BlogzoneConfig::from_lookup(lookup(&required())).unwrap();

        assert_eq!(config.content, ContentConfig::default());
        assert_eq!(config.gateway, GatewayConfig::new("key-123", "demo-blog"));
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_from_lookup_overrides() {
        let mut pairs = required();
        pairs.extend([
            (CONTENT_URL_VAR, "https://api.example.com/"),
            (REQUEST_TIMEOUT_VAR, "5"),
            (CONNECT_TIMEOUT_VAR, "2"),
            (GATEWAY_AUTH_DOMAIN_VAR, "auth.example.com"),
            (LOG_VAR, "blogzone_session=debug,info"),
        ]);

        let config = BlogzoneConfig::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.content.base_url, "https://api.example.com");
        assert_eq!(config.content.request_timeout, Duration::from_secs(5));
        assert_eq!(config.content.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.gateway.auth_domain(), "auth.example.com");
        assert_eq!(config.gateway.storage_bucket(), "demo-blog.appspot.com");
        assert_eq!(config.log_filter, "blogzone_session=debug,info");
    }

    #[test]
    fn test_from_lookup_missing_api_key() {
        let pairs = [(GATEWAY_PROJECT_ID_VAR, "demo-blog")];

        assert_eq!(
            BlogzoneConfig::from_lookup(lookup(&pairs)),
            Err(ConfigError::Missing {
                var: GATEWAY_API_KEY_VAR
            })
        );
    }

    #[test]
    fn test_from_lookup_blank_counts_as_missing() {
        let pairs = [
            (GATEWAY_API_KEY_VAR, "key"),
            (GATEWAY_PROJECT_ID_VAR, "   "),
        ];

        assert_eq!(
            BlogzoneConfig::from_lookup(lookup(&pairs)),
            Err(ConfigError::Missing {
                var: GATEWAY_PROJECT_ID_VAR
            })
        );
    }

    #[test]
    fn test_from_lookup_bad_timeout() {
        let mut pairs = required();
        pairs.push((REQUEST_TIMEOUT_VAR, "soon"));

        let err = BlogzoneConfig::from_lookup(lookup(&pairs)).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Invalid { var: REQUEST_TIMEOUT_VAR, .. }
        ));
    }

    #[test]
    fn test_from_lookup_zero_timeout_rejected() {
        let mut pairs = required();
        pairs.push((CONNECT_TIMEOUT_VAR, "0"));

        assert!(BlogzoneConfig::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_from_lookup_content_url_without_scheme() {
        let mut pairs = required();
        pairs.push((CONTENT_URL_VAR, "localhost:5000"));

        let err = BlogzoneConfig::from_lookup(lookup(&pairs)).unwrap_err();

        assert!(err.to_string().contains("BLOGZONE_CONTENT_URL"));
    }
}
