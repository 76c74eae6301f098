//! Mapping file loader.
//!
//! Turns the optional `CONTROL_THE_PAYLOAD_CONFIG_PATH` setting into the
//! process-wide list of mapping rules. The two "nothing to do" outcomes are
//! kept apart:
//!
//! - `Ok(None)`: no path configured, payload control is disabled
//! - `Ok(Some(vec![]))`: a file was configured and it holds zero rules
//!
//! Any problem with a configured file is a hard failure; a partially valid
//! file never yields a subset of its rules.

use super::mapping::ControlThePayloadConfig;
use crate::config::env_vars::CONTROL_THE_PAYLOAD_CONFIG_PATH;
use crate::config::Settings;
use crate::error::ConfigurationError;
use std::io::ErrorKind;
use std::path::Path;

/// Structured file formats accepted for the mapping file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MappingFormat {
    #[default]
    Json,
    Yaml,
}

impl MappingFormat {
    /// Pick the format from the file extension; anything but `.yaml`/`.yml`
    /// is read as JSON
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

/// Load the mapping rules named by `settings`, if any
///
/// # Errors
///
/// Returns `ConfigurationError::InvalidConfigurationValue` naming the file
/// when it is missing, unreadable, or does not match the mapping schema.
pub fn load_control_the_payload_config(
    settings: &Settings,
) -> Result<Option<Vec<ControlThePayloadConfig>>, ConfigurationError> {
    match settings.control_the_payload_config_path.as_deref() {
        None => {
            tracing::debug!(
                "{} not set, payload control disabled",
                CONTROL_THE_PAYLOAD_CONFIG_PATH
            );
            Ok(None)
        }
        Some(path) => load_from_path(path).map(Some),
    }
}

/// Read and validate a mapping file
///
/// # Errors
///
/// Same as [`load_control_the_payload_config`].
pub fn load_from_path(path: &Path) -> Result<Vec<ControlThePayloadConfig>, ConfigurationError> {
    let source = path.display().to_string();

    let contents = std::fs::read_to_string(path).map_err(|e| {
        let reason = match e.kind() {
            ErrorKind::NotFound => "file does not exist".to_string(),
            _ => format!("failed to read file: {}", e),
        };
        ConfigurationError::invalid(&source, reason)
    })?;

    let configs = parse_mappings(&contents, MappingFormat::from_path(path), &source)?;

    tracing::info!(
        path = %source,
        rules = configs.len(),
        "Loaded payload mapping configuration"
    );

    Ok(configs)
}

/// Parse mapping rules from already-read contents
///
/// `source` names the origin of `contents` in error messages.
///
/// # Errors
///
/// Returns `ConfigurationError::InvalidConfigurationValue` when the contents
/// are not an array of `{"mapping": {...}}` records or a field violates its
/// type or enumeration constraint.
pub fn parse_mappings(
    contents: &str,
    format: MappingFormat,
    source: &str,
) -> Result<Vec<ControlThePayloadConfig>, ConfigurationError> {
    let parsed: Result<Vec<ControlThePayloadConfig>, String> = match format {
        MappingFormat::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
        MappingFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
    };

    parsed.map_err(|reason| {
        ConfigurationError::invalid(source, format!("invalid mapping configuration: {}", reason))
    })
}

/// Serialize mapping rules back into the given file format
///
/// # Errors
///
/// Returns `ConfigurationError::InvalidConfigurationValue` if the serializer
/// fails.
pub fn serialize_mappings(
    configs: &[ControlThePayloadConfig],
    format: MappingFormat,
) -> Result<String, ConfigurationError> {
    let rendered = match format {
        MappingFormat::Json => serde_json::to_string_pretty(configs).map_err(|e| e.to_string()),
        MappingFormat::Yaml => serde_yaml::to_string(configs).map_err(|e| e.to_string()),
    };

    rendered.map_err(|reason| ConfigurationError::invalid(CONTROL_THE_PAYLOAD_CONFIG_PATH, reason))
}
