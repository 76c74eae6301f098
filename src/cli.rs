//! Command-line interface definition for the Port agent
//!
//! The agent is configured entirely through environment variables; the CLI
//! only chooses what to do with the resolved configuration.

use clap::{Parser, Subcommand};

/// Port agent configuration tool
///
/// Resolves settings from the environment and loads the optional payload
/// mapping file, failing fast on any invalid value.
#[derive(Parser, Debug, Clone)]
#[command(name = "port-agent")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "PORT_AGENT_JSON_LOGS")]
    pub json_logs: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Validate settings and the mapping file, then print a summary
    Check,

    /// Print the resolved settings with secrets masked
    Settings {
        /// Output as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the loaded payload mapping rules
    Mappings {
        /// Output as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from(["port-agent", "check"]).unwrap();
        assert_eq!(cli.command, Commands::Check);
        assert!(!cli.json_logs);
    }

    #[test]
    fn test_parse_settings_json() {
        let cli = Cli::try_parse_from(["port-agent", "settings", "--json"]).unwrap();
        assert_eq!(cli.command, Commands::Settings { json: true });
    }

    #[test]
    fn test_global_json_logs_after_subcommand() {
        let cli = Cli::try_parse_from(["port-agent", "mappings", "--json-logs"]).unwrap();
        assert!(cli.json_logs);
        assert_eq!(cli.command, Commands::Mappings { json: false });
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["port-agent"]).is_err());
    }
}
