//! Port agent configuration CLI
//!
#![doc = "Port agent configuration CLI"]
#![doc = "Main entry point: resolve settings, load payload mappings, run a command."]

use anyhow::Result;

use port_agent::cli::{Cli, Commands};
use port_agent::commands;
use port_agent::config::Settings;
use port_agent::logging;
use port_agent::payload;

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Settings first: LOG_LEVEL decides how everything after is logged
    let settings = Settings::from_env()?;

    logging::init_logging(&settings.log_level, cli.json_logs)?;
    tracing::debug!("Logging initialized at level {}", settings.log_level);

    // Load the optional mapping file; `None` means the feature is off
    let mappings = payload::load_control_the_payload_config(&settings)?;

    match cli.command {
        Commands::Check => {
            commands::check::run_check(&settings, mappings.as_deref())?;
            Ok(())
        }
        Commands::Settings { json } => {
            tracing::info!("Showing resolved settings");
            commands::settings::show_settings(&settings, json)?;
            Ok(())
        }
        Commands::Mappings { json } => {
            tracing::info!("Showing payload mapping rules");
            commands::mappings::show_mappings(mappings.as_deref(), json)?;
            Ok(())
        }
    }
}
