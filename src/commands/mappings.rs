//! Payload mapping listing
//!
//! Shows the rules loaded from `CONTROL_THE_PAYLOAD_CONFIG_PATH` so operators
//! can confirm what the invoker will do before starting the agent.

use crate::error::Result;
use crate::payload::{serialize_mappings, ControlThePayloadConfig, MappingFormat, RequestPart};
use prettytable::{cell, row, Table};

/// Message printed when no mapping file is configured
pub const DISABLED_MESSAGE: &str =
    "Payload control disabled (CONTROL_THE_PAYLOAD_CONFIG_PATH not set)";

/// Message printed when the mapping file holds no rules
pub const EMPTY_MESSAGE: &str = "Payload control enabled with 0 mapping rules";

/// Print the mapping rules as a table or JSON
///
/// In JSON mode a disabled feature prints `null` and an empty file prints
/// `[]`, mirroring the two loader outcomes.
pub fn show_mappings(mappings: Option<&[ControlThePayloadConfig]>, json: bool) -> Result<()> {
    if json {
        match mappings {
            None => println!("null"),
            Some(rules) => println!("{}", serialize_mappings(rules, MappingFormat::Json)?),
        }
        return Ok(());
    }

    match mappings {
        None => println!("{}", DISABLED_MESSAGE),
        Some([]) => println!("{}", EMPTY_MESSAGE),
        Some(rules) => output_mappings_table(rules),
    }

    Ok(())
}

fn output_mappings_table(rules: &[ControlThePayloadConfig]) {
    let mut table = Table::new();
    table.add_row(row![
        "#", "Enabled", "Method", "URL", "Body", "Headers", "Query"
    ]);

    for (index, rule) in rules.iter().enumerate() {
        let mapping = &rule.mapping;
        let position = index + 1;
        table.add_row(row![
            position,
            mapping.enabled,
            mapping
                .method
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".to_string()),
            mapping.url.as_deref().unwrap_or("-"),
            describe_part(mapping.body.as_ref()),
            describe_part(mapping.headers.as_ref()),
            describe_part(mapping.query.as_ref())
        ]);
    }

    println!("\nPayload mapping rules ({}):\n", rules.len());
    table.printstd();
    println!();
}

/// Short description of a request part for table output
pub fn describe_part(part: Option<&RequestPart>) -> String {
    match part {
        None => "-".to_string(),
        Some(RequestPart::Template(template)) => format!("template: {}", template),
        Some(RequestPart::KeyValue(entries)) => {
            let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
            format!("keys: {}", keys.join(", "))
        }
    }
}
