//! Logging setup
//!
//! Installs the global `tracing` subscriber. The filter comes from
//! `RUST_LOG` when present, otherwise from the resolved `LOG_LEVEL` setting,
//! so operators keep the familiar `LOG_LEVEL=DEBUG` switch. Logs go to
//! stderr; stdout is reserved for command output.

use crate::config::env_vars::LOG_LEVEL;
use crate::error::ConfigurationError;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter for a `LOG_LEVEL` value
///
/// Level names are case-insensitive (`INFO`, `debug`, `Warn`). Full
/// `EnvFilter` directives such as `port_agent=debug` are accepted too; a
/// bare word must be a level name, so `INFOO` is rejected rather than read
/// as a target.
///
/// # Errors
///
/// Returns `ConfigurationError::InvalidConfigurationValue` for `LOG_LEVEL`
/// when the value is not a valid filter.
pub fn level_filter(level: &str) -> Result<EnvFilter, ConfigurationError> {
    let directive = match level.trim().to_ascii_lowercase().as_str() {
        // Python-style names seen in existing deployments
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        "notset" => "trace".to_string(),
        other => other.to_string(),
    };

    if !directive.contains('=') && directive.parse::<LevelFilter>().is_err() {
        return Err(ConfigurationError::invalid(
            LOG_LEVEL,
            format!("unknown log level {:?}", level),
        ));
    }

    EnvFilter::try_new(&directive).map_err(|e| ConfigurationError::invalid(LOG_LEVEL, e.to_string()))
}

/// Initialize the global subscriber
///
/// # Arguments
///
/// * `level` - Resolved `LOG_LEVEL`, used when `RUST_LOG` is not set
/// * `json` - Emit JSON lines instead of human-readable output
///
/// # Errors
///
/// Returns an error if the level is invalid or a subscriber is already set.
pub fn init_logging(level: &str, json: bool) -> anyhow::Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(level)?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names_accepted() {
        for level in ["INFO", "debug", "Warn", "ERROR", "trace", "WARNING", "CRITICAL"] {
            assert!(level_filter(level).is_ok(), "level {}", level);
        }
    }

    #[test]
    fn test_directive_accepted() {
        assert!(level_filter("port_agent=debug").is_ok());
    }

    #[test]
    fn test_invalid_level_rejected() {
        let err = level_filter("port_agent=loud").unwrap_err();
        assert_eq!(err.subject(), LOG_LEVEL);
    }

    #[test]
    fn test_misspelled_level_rejected() {
        for level in ["INFOO", "LOUD", "verbose"] {
            let err = level_filter(level).unwrap_err();
            assert_eq!(err.subject(), LOG_LEVEL, "level {}", level);
            assert!(err.to_string().contains(level), "message: {}", err);
        }
    }

    #[test]
    fn test_off_level_accepted() {
        assert!(level_filter("OFF").is_ok());
    }
}
