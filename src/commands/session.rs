use anyhow::Result;
use clap::Subcommand;
use serde_json::json;
use tracing::info;

use scout::{OutputFormat, ScoutConfig};

#[derive(Subcommand)]
pub enum SessionCommands {
    /// List stored sessions
    List {
        /// Output format
        #[arg(short, long, default_value = "simple")]
        format: OutputFormat,
    },

    /// Show the recorded history of a session
    Show {
        /// Session name or path to a session file
        name: String,

        /// Output format
        #[arg(short, long, default_value = "simple")]
        format: OutputFormat,
    },

    /// Delete a session
    Delete {
        /// Session name or path to a session file
        name: String,
    },
}

pub fn handle_session(config: &ScoutConfig, command: SessionCommands) -> Result<()> {
    let store = config.session_store();

    match command {
        SessionCommands::List { format } => {
            let sessions = store.list()?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&sessions)?),
                OutputFormat::Simple => {
                    if sessions.is_empty() {
                        println!("No sessions found in {}", store.dir().display());
                    } else {
                        println!("Sessions in {}:", store.dir().display());
                        for session in sessions {
                            let modified = session
                                .modified
                                .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
                                .unwrap_or_else(|| "-".to_string());
                            println!(
                                "  {} ({} commands, {} cookies) - modified {}",
                                session.name, session.commands, session.cookies, modified
                            );
                        }
                    }
                }
            }
        }
        SessionCommands::Show { name, format } => {
            let path = store.resolve(&name);
            if !path.exists() {
                return Err(anyhow::anyhow!("Session '{}' does not exist", name));
            }
            let data = store.load(&name);

            match format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "name": name,
                        "path": path,
                        "cookies": data.cookies.len(),
                        "origins": data.origins.iter().map(|o| &o.origin).collect::<Vec<_>>(),
                        "history": data.history,
                    }))?
                ),
                OutputFormat::Simple => {
                    println!("Session: {}", name);
                    println!("File: {}", path.display());
                    println!("Cookies: {}", data.cookies.len());
                    for origin in &data.origins {
                        println!(
                            "Storage: {} ({} localStorage entries)",
                            origin.origin,
                            origin.local_storage.len()
                        );
                    }
                    println!("History ({} commands):", data.history.len());
                    for (i, record) in data.history.iter().enumerate() {
                        let when = chrono::DateTime::from_timestamp_millis(record.timestamp)
                            .map(|t| t.format("%H:%M:%S").to_string())
                            .unwrap_or_default();
                        match &record.semantic_locator {
                            Some(locator) => println!(
                                "  {:>3}. [{}] {}  ({})",
                                i + 1,
                                when,
                                record.command,
                                locator
                            ),
                            None => println!("  {:>3}. [{}] {}", i + 1, when, record.command),
                        }
                    }
                }
            }
        }
        SessionCommands::Delete { name } => {
            info!("Deleting session: {}", name);
            store.delete(&name)?;
            println!("Session '{}' deleted", name);
        }
    }
    Ok(())
}
