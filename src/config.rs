//! Settings resolution for the Port agent
//!
//! Settings come exclusively from environment variables, matched by exact
//! (case-sensitive) name. Resolution happens once at startup and produces an
//! immutable [`Settings`] record that is passed by reference to every
//! consumer.
//!
//! Construction runs in two passes:
//!
//! 1. every independent field is read and validated
//! 2. the Kafka topic names are derived from the already-resolved
//!    `PORT_ORG_ID` unless they were supplied explicitly
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use port_agent::config::Settings;
//!
//! let env: HashMap<String, String> = [
//!     ("STREAMER_NAME", "KAFKA"),
//!     ("PORT_ORG_ID", "org_123"),
//! ]
//! .into_iter()
//! .map(|(k, v)| (k.to_string(), v.to_string()))
//! .collect();
//!
//! let settings = Settings::resolve(&env).unwrap();
//! assert_eq!(settings.kafka.runs_topic, "org_123.runs");
//! assert_eq!(settings.kafka.change_log_topic, "org_123.change.log");
//! ```

use crate::error::ConfigurationError;
use crate::logging;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::env::VarError;
use std::fmt;
use std::hash::BuildHasher;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable names recognised by the resolver
pub mod env_vars {
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const STREAMER_NAME: &str = "STREAMER_NAME";
    pub const PORT_ORG_ID: &str = "PORT_ORG_ID";
    pub const GITLAB_URL: &str = "GITLAB_URL";
    pub const KAFKA_CONSUMER_BROKERS: &str = "KAFKA_CONSUMER_BROKERS";
    pub const KAFKA_CONSUMER_SECURITY_PROTOCOL: &str = "KAFKA_CONSUMER_SECURITY_PROTOCOL";
    pub const KAFKA_CONSUMER_AUTHENTICATION_MECHANISM: &str =
        "KAFKA_CONSUMER_AUTHENTICATION_MECHANISM";
    pub const KAFKA_CONSUMER_USERNAME: &str = "KAFKA_CONSUMER_USERNAME";
    pub const KAFKA_CONSUMER_PASSWORD: &str = "KAFKA_CONSUMER_PASSWORD";
    pub const KAFKA_CONSUMER_SESSION_TIMEOUT_MS: &str = "KAFKA_CONSUMER_SESSION_TIMEOUT_MS";
    pub const KAFKA_CONSUMER_AUTO_OFFSET_RESET: &str = "KAFKA_CONSUMER_AUTO_OFFSET_RESET";
    pub const KAFKA_CONSUMER_GROUP_ID: &str = "KAFKA_CONSUMER_GROUP_ID";
    pub const KAFKA_RUNS_TOPIC: &str = "KAFKA_RUNS_TOPIC";
    pub const KAFKA_CHANGE_LOG_TOPIC: &str = "KAFKA_CHANGE_LOG_TOPIC";
    pub const CONTROL_THE_PAYLOAD_CONFIG_PATH: &str = "CONTROL_THE_PAYLOAD_CONFIG_PATH";
    pub const WEBHOOK_INVOKER_TIMEOUT: &str = "WEBHOOK_INVOKER_TIMEOUT";
    pub const GITLAB_PIPELINE_INVOKER_TIMEOUT: &str = "GITLAB_PIPELINE_INVOKER_TIMEOUT";

    /// Every recognised name, in resolution order
    pub const ALL: &[&str] = &[
        LOG_LEVEL,
        STREAMER_NAME,
        PORT_ORG_ID,
        GITLAB_URL,
        KAFKA_CONSUMER_BROKERS,
        KAFKA_CONSUMER_SECURITY_PROTOCOL,
        KAFKA_CONSUMER_AUTHENTICATION_MECHANISM,
        KAFKA_CONSUMER_USERNAME,
        KAFKA_CONSUMER_PASSWORD,
        KAFKA_CONSUMER_SESSION_TIMEOUT_MS,
        KAFKA_CONSUMER_AUTO_OFFSET_RESET,
        KAFKA_CONSUMER_GROUP_ID,
        KAFKA_RUNS_TOPIC,
        KAFKA_CHANGE_LOG_TOPIC,
        CONTROL_THE_PAYLOAD_CONFIG_PATH,
        WEBHOOK_INVOKER_TIMEOUT,
        GITLAB_PIPELINE_INVOKER_TIMEOUT,
    ];
}

use env_vars::*;

/// Suffix appended to `PORT_ORG_ID` for the default runs topic
pub const RUNS_TOPIC_SUFFIX: &str = "runs";

/// Suffix appended to `PORT_ORG_ID` for the default change-log topic
pub const CHANGE_LOG_TOPIC_SUFFIX: &str = "change.log";

const REDACTED: &str = "********";

fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_gitlab_url() -> String {
    "https://gitlab.com/".to_string()
}

fn default_kafka_brokers() -> String {
    "localhost:9092".to_string()
}

fn default_security_protocol() -> String {
    "plaintext".to_string()
}

fn default_authentication_mechanism() -> String {
    "none".to_string()
}

fn default_kafka_username() -> String {
    "local".to_string()
}

fn default_session_timeout_ms() -> u64 {
    45_000
}

fn default_auto_offset_reset() -> String {
    "earliest".to_string()
}

fn default_invoker_timeout() -> u64 {
    5
}

/// Source of raw environment values
///
/// The resolver never touches `std::env` directly; it asks an `EnvSource`.
/// [`ProcessEnv`] reads the real process environment, while maps are
/// accepted for tests and for embedding the agent in another process.
pub trait EnvSource {
    /// Return the raw value for `key`, or `None` when it is not set
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidConfigurationValue` naming `key`
    /// when the value exists but cannot be read as text.
    fn get(&self, key: &str) -> Result<Option<String>, ConfigurationError>;
}

/// The current process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigurationError> {
        match std::env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(ConfigurationError::invalid(
                key,
                "value is not valid UTF-8",
            )),
        }
    }
}

impl<S: BuildHasher> EnvSource for HashMap<String, String, S> {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigurationError> {
        Ok(HashMap::get(self, key).cloned())
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigurationError> {
        Ok(BTreeMap::get(self, key).cloned())
    }
}

/// Broker connection settings consumed by the Kafka client
///
/// All values are passed through as plain strings; the broker client is
/// responsible for interpreting them. See [`crate::kafka`] for the property
/// map built from these fields.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct KafkaSettings {
    /// Comma-separated bootstrap brokers
    #[serde(rename = "KAFKA_CONSUMER_BROKERS")]
    pub brokers: String,

    /// Security protocol (e.g. `plaintext`, `SASL_SSL`)
    #[serde(rename = "KAFKA_CONSUMER_SECURITY_PROTOCOL")]
    pub security_protocol: String,

    /// SASL mechanism, or `none` to disable authentication
    #[serde(rename = "KAFKA_CONSUMER_AUTHENTICATION_MECHANISM")]
    pub authentication_mechanism: String,

    /// SASL username
    #[serde(rename = "KAFKA_CONSUMER_USERNAME")]
    pub username: String,

    /// SASL password, accepted as plain configuration
    #[serde(rename = "KAFKA_CONSUMER_PASSWORD")]
    pub password: String,

    /// Consumer session timeout in milliseconds
    #[serde(rename = "KAFKA_CONSUMER_SESSION_TIMEOUT_MS")]
    pub session_timeout_ms: u64,

    /// Offset reset policy
    #[serde(rename = "KAFKA_CONSUMER_AUTO_OFFSET_RESET")]
    pub auto_offset_reset: String,

    /// Consumer group id; empty means "let the client decide"
    #[serde(rename = "KAFKA_CONSUMER_GROUP_ID")]
    pub group_id: String,

    /// Topic carrying action runs, never empty after resolution
    #[serde(rename = "KAFKA_RUNS_TOPIC")]
    pub runs_topic: String,

    /// Topic carrying entity change-log events, never empty after resolution
    #[serde(rename = "KAFKA_CHANGE_LOG_TOPIC")]
    pub change_log_topic: String,
}

impl KafkaSettings {
    /// Session timeout as a `Duration`
    pub fn session_timeout(&self) -> Duration {
        Duration::from_millis(self.session_timeout_ms)
    }

    /// Topics the consumer subscribes to: runs first, then change log
    pub fn topics(&self) -> [&str; 2] {
        [self.runs_topic.as_str(), self.change_log_topic.as_str()]
    }
}

impl fmt::Debug for KafkaSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KafkaSettings")
            .field("brokers", &self.brokers)
            .field("security_protocol", &self.security_protocol)
            .field("authentication_mechanism", &self.authentication_mechanism)
            .field("username", &self.username)
            .field("password", &mask(&self.password))
            .field("session_timeout_ms", &self.session_timeout_ms)
            .field("auto_offset_reset", &self.auto_offset_reset)
            .field("group_id", &self.group_id)
            .field("runs_topic", &self.runs_topic)
            .field("change_log_topic", &self.change_log_topic)
            .finish()
    }
}

fn mask(secret: &str) -> &str {
    if secret.is_empty() {
        ""
    } else {
        REDACTED
    }
}

/// Process-wide settings resolved from the environment
///
/// Built once by [`Settings::from_env`] (or [`Settings::resolve`]) and never
/// mutated afterwards. Serializes with the environment variable names as
/// keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Log level name, default `INFO`
    #[serde(rename = "LOG_LEVEL")]
    pub log_level: String,

    /// Name of the event streamer feeding the agent
    #[serde(rename = "STREAMER_NAME")]
    pub streamer_name: String,

    /// Port organization identifier
    #[serde(rename = "PORT_ORG_ID")]
    pub port_org_id: String,

    /// Base URL for GitLab pipeline triggers
    #[serde(rename = "GITLAB_URL")]
    pub gitlab_url: String,

    /// Broker connection settings
    #[serde(flatten)]
    pub kafka: KafkaSettings,

    /// Mapping file location; `None` disables payload control entirely
    #[serde(rename = "CONTROL_THE_PAYLOAD_CONFIG_PATH")]
    pub control_the_payload_config_path: Option<PathBuf>,

    /// Webhook invoker request timeout in seconds
    #[serde(rename = "WEBHOOK_INVOKER_TIMEOUT")]
    pub webhook_invoker_timeout_secs: u64,

    /// GitLab pipeline invoker request timeout in seconds
    #[serde(rename = "GITLAB_PIPELINE_INVOKER_TIMEOUT")]
    pub gitlab_pipeline_invoker_timeout_secs: u64,
}

impl Settings {
    /// Resolve settings from the process environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingRequiredSetting` when
    /// `STREAMER_NAME` or `PORT_ORG_ID` is absent or empty, and
    /// `ConfigurationError::InvalidConfigurationValue` when an integer field
    /// cannot be parsed, `LOG_LEVEL` is not a known level or filter, or a
    /// value is not valid UTF-8.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::resolve(&ProcessEnv)
    }

    /// Resolve settings from an arbitrary environment source
    ///
    /// # Errors
    ///
    /// Same as [`Settings::from_env`].
    pub fn resolve<E: EnvSource + ?Sized>(env: &E) -> Result<Self, ConfigurationError> {
        let fields = ResolvedFields::read(env)?;
        let settings = fields.derive();

        tracing::debug!(
            streamer = %settings.streamer_name,
            runs_topic = %settings.kafka.runs_topic,
            change_log_topic = %settings.kafka.change_log_topic,
            "Resolved settings"
        );

        Ok(settings)
    }

    /// Webhook invoker timeout as a `Duration`
    pub fn webhook_invoker_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_invoker_timeout_secs)
    }

    /// GitLab pipeline invoker timeout as a `Duration`
    pub fn gitlab_pipeline_invoker_timeout(&self) -> Duration {
        Duration::from_secs(self.gitlab_pipeline_invoker_timeout_secs)
    }

    /// Copy of these settings safe to print or log
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.kafka.password = mask(&self.kafka.password).to_string();
        copy
    }
}

/// First-pass result: every field that does not depend on another field
///
/// The topic names are kept as the raw explicit override (if any) until
/// [`ResolvedFields::derive`] runs.
#[derive(Debug, Clone)]
struct ResolvedFields {
    log_level: String,
    streamer_name: String,
    port_org_id: String,
    gitlab_url: String,
    brokers: String,
    security_protocol: String,
    authentication_mechanism: String,
    username: String,
    password: String,
    session_timeout_ms: u64,
    auto_offset_reset: String,
    group_id: String,
    runs_topic: Option<String>,
    change_log_topic: Option<String>,
    control_the_payload_config_path: Option<PathBuf>,
    webhook_invoker_timeout_secs: u64,
    gitlab_pipeline_invoker_timeout_secs: u64,
}

impl ResolvedFields {
    fn read<E: EnvSource + ?Sized>(env: &E) -> Result<Self, ConfigurationError> {
        let lookup = Lookup { env };

        let log_level = lookup.string_or(LOG_LEVEL, default_log_level)?;
        logging::level_filter(&log_level)?;

        Ok(Self {
            log_level,
            streamer_name: lookup.required(STREAMER_NAME)?,
            port_org_id: lookup.required(PORT_ORG_ID)?,
            gitlab_url: lookup.string_or(GITLAB_URL, default_gitlab_url)?,
            brokers: lookup.string_or(KAFKA_CONSUMER_BROKERS, default_kafka_brokers)?,
            security_protocol: lookup
                .string_or(KAFKA_CONSUMER_SECURITY_PROTOCOL, default_security_protocol)?,
            authentication_mechanism: lookup.string_or(
                KAFKA_CONSUMER_AUTHENTICATION_MECHANISM,
                default_authentication_mechanism,
            )?,
            username: lookup.string_or(KAFKA_CONSUMER_USERNAME, default_kafka_username)?,
            password: lookup.string_or(KAFKA_CONSUMER_PASSWORD, String::new)?,
            session_timeout_ms: lookup
                .integer_or(KAFKA_CONSUMER_SESSION_TIMEOUT_MS, default_session_timeout_ms)?,
            auto_offset_reset: lookup
                .string_or(KAFKA_CONSUMER_AUTO_OFFSET_RESET, default_auto_offset_reset)?,
            group_id: lookup.string_or(KAFKA_CONSUMER_GROUP_ID, String::new)?,
            runs_topic: lookup.optional(KAFKA_RUNS_TOPIC)?,
            change_log_topic: lookup.optional(KAFKA_CHANGE_LOG_TOPIC)?,
            control_the_payload_config_path: lookup
                .optional(CONTROL_THE_PAYLOAD_CONFIG_PATH)?
                .map(PathBuf::from),
            webhook_invoker_timeout_secs: lookup
                .integer_or(WEBHOOK_INVOKER_TIMEOUT, default_invoker_timeout)?,
            gitlab_pipeline_invoker_timeout_secs: lookup
                .integer_or(GITLAB_PIPELINE_INVOKER_TIMEOUT, default_invoker_timeout)?,
        })
    }

    /// Second pass: compute dependent fields from resolved values
    fn derive(self) -> Settings {
        let runs_topic = derive_topic(self.runs_topic, &self.port_org_id, RUNS_TOPIC_SUFFIX);
        let change_log_topic = derive_topic(
            self.change_log_topic,
            &self.port_org_id,
            CHANGE_LOG_TOPIC_SUFFIX,
        );

        Settings {
            log_level: self.log_level,
            streamer_name: self.streamer_name,
            port_org_id: self.port_org_id,
            gitlab_url: self.gitlab_url,
            kafka: KafkaSettings {
                brokers: self.brokers,
                security_protocol: self.security_protocol,
                authentication_mechanism: self.authentication_mechanism,
                username: self.username,
                password: self.password,
                session_timeout_ms: self.session_timeout_ms,
                auto_offset_reset: self.auto_offset_reset,
                group_id: self.group_id,
                runs_topic,
                change_log_topic,
            },
            control_the_payload_config_path: self.control_the_payload_config_path,
            webhook_invoker_timeout_secs: self.webhook_invoker_timeout_secs,
            gitlab_pipeline_invoker_timeout_secs: self.gitlab_pipeline_invoker_timeout_secs,
        }
    }
}

/// Use the explicit topic when non-empty, otherwise `{org_id}.{suffix}`
pub fn derive_topic(explicit: Option<String>, org_id: &str, suffix: &str) -> String {
    match explicit {
        Some(topic) if !topic.is_empty() => topic,
        _ => format!("{}.{}", org_id, suffix),
    }
}

/// Typed accessors over an `EnvSource`; empty values count as absent
struct Lookup<'a, E: EnvSource + ?Sized> {
    env: &'a E,
}

impl<'a, E: EnvSource + ?Sized> Lookup<'a, E> {
    fn optional(&self, name: &str) -> Result<Option<String>, ConfigurationError> {
        Ok(self.env.get(name)?.filter(|value| !value.is_empty()))
    }

    fn required(&self, name: &str) -> Result<String, ConfigurationError> {
        self.optional(name)?
            .ok_or_else(|| ConfigurationError::missing(name))
    }

    fn string_or(&self, name: &str, default: fn() -> String) -> Result<String, ConfigurationError> {
        Ok(self.optional(name)?.unwrap_or_else(default))
    }

    fn integer_or(&self, name: &str, default: fn() -> u64) -> Result<u64, ConfigurationError> {
        match self.optional(name)? {
            None => Ok(default()),
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                ConfigurationError::invalid(
                    name,
                    format!("expected a non-negative integer, got {:?} ({})", raw, e),
                )
            }),
        }
    }
}
