//! Port agent - configuration core library
//!
//! This library resolves the process configuration of the Port execution
//! agent: typed settings from environment variables, and the optional
//! payload-mapping file that shapes outbound webhook and pipeline calls.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `config`: Settings resolution from the environment, with derived topics
//! - `payload`: Mapping schema and the mapping file loader
//! - `kafka`: Consumer properties handed to the broker client
//! - `logging`: Subscriber setup driven by `LOG_LEVEL`
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface and handlers
//!
//! # Example
//!
//! ```no_run
//! use port_agent::{load_control_the_payload_config, Settings};
//!
//! fn main() -> anyhow::Result<()> {
//!     let settings = Settings::from_env()?;
//!     let mappings = load_control_the_payload_config(&settings)?;
//!
//!     // Hand `&settings` and `mappings.as_deref()` to the consumer and invokers
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod kafka;
pub mod logging;
pub mod payload;

// Re-export commonly used types
pub use config::{EnvSource, KafkaSettings, ProcessEnv, Settings};
pub use error::{ConfigurationError, Result};
pub use payload::{
    load_control_the_payload_config, ControlThePayloadConfig, Enabled, HttpMethod, Mapping,
    RequestPart,
};

#[cfg(test)]
pub mod test_utils;
