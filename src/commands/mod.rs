/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.
Every handler receives the already-resolved configuration by reference;
none of them read the environment themselves.

- `check`: validate everything and print a one-line summary
- `settings`: print the resolved settings
- `mappings`: print the payload mapping rules
*/

use crate::config::Settings;
use crate::error::Result;
use crate::payload::ControlThePayloadConfig;

// Mapping rule listing
pub mod mappings;

// Configuration check
pub mod check {
    //! Startup validation command.
    //!
    //! Reaching this handler already means settings and mappings resolved;
    //! it reports what the agent would run with.

    use super::*;

    /// One-line description of the resolved configuration
    pub fn summary(settings: &Settings, mappings: Option<&[ControlThePayloadConfig]>) -> String {
        let payload = match mappings {
            None => "payload control disabled".to_string(),
            Some(rules) => format!("{} payload mapping rule(s)", rules.len()),
        };

        format!(
            "Configuration OK: streamer={} org={} topics=[{}] {}",
            settings.streamer_name,
            settings.port_org_id,
            settings.kafka.topics().join(", "),
            payload
        )
    }

    /// Print the summary
    pub fn run_check(
        settings: &Settings,
        mappings: Option<&[ControlThePayloadConfig]>,
    ) -> Result<()> {
        tracing::info!("Configuration check passed");
        println!("{}", summary(settings, mappings));
        Ok(())
    }
}

// Settings display
pub mod settings {
    //! Resolved settings display.

    use super::*;
    use crate::config::env_vars;
    use prettytable::{cell, row, Table};

    /// Rows of `(variable, value)` in resolution order, secrets masked
    pub fn settings_rows(settings: &Settings) -> Result<Vec<(&'static str, String)>> {
        let value = serde_json::to_value(settings.redacted())?;

        let rows = env_vars::ALL
            .iter()
            .map(|name| {
                let display = match value.get(*name) {
                    None | Some(serde_json::Value::Null) => "(unset)".to_string(),
                    Some(serde_json::Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                };
                (*name, display)
            })
            .collect();

        Ok(rows)
    }

    /// Print the settings as a table or JSON
    pub fn show_settings(settings: &Settings, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(&settings.redacted())?);
            return Ok(());
        }

        let mut table = Table::new();
        table.add_row(row!["Variable", "Value"]);
        for (name, value) in settings_rows(settings)? {
            table.add_row(row![name, value]);
        }

        println!();
        table.printstd();
        println!();
        Ok(())
    }
}
