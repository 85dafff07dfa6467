use anyhow::Result;
use clap::Subcommand;
use std::path::Path;

use scout::ScoutConfig;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

pub fn handle_config(config: &ScoutConfig, path: &Path, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file {} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            ScoutConfig::default().save(path)?;
            println!("Configuration saved to {}", path.display());
        }
        ConfigCommands::Show => {
            eprintln!("Config file: {}", path.display());
            eprintln!("Sessions: {}", config.session_store().dir().display());
            println!("{}", serde_json::to_string_pretty(config)?);
        }
    }
    Ok(())
}
