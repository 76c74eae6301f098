//! Error types for the Port agent
//!
//! Configuration failures are fatal at startup, so the library exposes a
//! single `thiserror` enum with the two ways resolution can fail. Binary
//! code works in terms of `anyhow` and converts at the boundary.

use thiserror::Error;

/// Errors raised while resolving settings or loading the mapping file
///
/// Every variant names the offending environment variable or file so the
/// operator can fix the deployment without guessing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A required environment variable is absent or empty
    #[error("Missing required setting: {name}")]
    MissingRequiredSetting {
        /// Environment variable name
        name: String,
    },

    /// A value is present but violates its type or enumeration constraint
    ///
    /// Also used for mapping files that cannot be read or do not match the
    /// schema; `name` then carries the file path.
    #[error("Invalid configuration value for {name}: {reason}")]
    InvalidConfigurationValue {
        /// Environment variable name or mapping file path
        name: String,
        /// Human readable explanation
        reason: String,
    },
}

impl ConfigurationError {
    /// Build a `MissingRequiredSetting` error
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingRequiredSetting { name: name.into() }
    }

    /// Build an `InvalidConfigurationValue` error
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfigurationValue {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Name of the setting or file the error refers to
    pub fn subject(&self) -> &str {
        match self {
            Self::MissingRequiredSetting { name } => name,
            Self::InvalidConfigurationValue { name, .. } => name,
        }
    }
}

/// Result type alias for CLI-level operations
///
/// Library functions return `std::result::Result<T, ConfigurationError>`;
/// command handlers use this alias so other failures (I/O on stdout,
/// subscriber setup) propagate with context.
pub type Result<T> = anyhow::Result<T>;
