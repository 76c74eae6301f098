//! Control-the-payload configuration
//!
//! The agent can reshape the outbound request it sends for each event
//! according to an external mapping file. This module holds the typed schema
//! of that file and the loader that reads it at startup.
//!
//! - [`mapping`]: `Mapping`, `Enabled`, `HttpMethod`, `RequestPart`
//! - [`loader`]: optional path to validated `Vec<ControlThePayloadConfig>`
//!
//! # Example
//!
//! ```rust,no_run
//! use port_agent::config::Settings;
//! use port_agent::payload::load_control_the_payload_config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::from_env()?;
//! match load_control_the_payload_config(&settings)? {
//!     None => println!("payload control disabled"),
//!     Some(rules) => println!("{} mapping rules", rules.len()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod mapping;

pub use loader::{
    load_control_the_payload_config, load_from_path, parse_mappings, serialize_mappings,
    MappingFormat,
};
pub use mapping::{ControlThePayloadConfig, Enabled, HttpMethod, Mapping, RequestPart};
