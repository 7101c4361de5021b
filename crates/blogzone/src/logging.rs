//! Tracing setup.

use tracing_subscriber::EnvFilter;

use crate::ConfigError;

/// Installs a `fmt` subscriber filtered by `filter` (an `EnvFilter`
/// directive such as `info` or `blogzone_session=debug,info`).
///
/// Call once at startup, usually with
/// [`BlogzoneConfig::log_filter`](crate::BlogzoneConfig::log_filter).
///
/// # Errors
/// [`ConfigError::Logging`] if the directive doesn't parse or a global
/// subscriber is already installed.
pub fn init_tracing(filter: &str) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_new(filter)
        .map_err(|e| ConfigError::Logging(format!("bad filter {filter:?}: {e}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_bad_directive_is_logging_error() {
        let err = init_tracing("blogzone=loud").unwrap_err();

        assert!(matches!(err, ConfigError::Logging(_)));
    }

    #[test]
    fn test_init_tracing_twice_fails_second_time() {
        // Other tests in this binary may have installed one already, so
        // only the second call's outcome is certain.
        let _ = init_tracing("warn");

        assert!(init_tracing("warn").is_err());
    }
}
