#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use crate::commands::config::ConfigCommands;
use crate::commands::session::SessionCommands;
use crate::commands::utils::BrowserArgs;
use scout::{ExploreOptions, OutputFormat, ScoutConfig, ScoutError};

const EXIT_SUCCESS: i32 = 0;

#[derive(Parser)]
#[command(name = "scout")]
#[command(
    about = "Drive a browser with a compact command language and replay sessions as tests",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ./scout.config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a page, run actions, then verify expectations
    Run {
        /// URL to open
        url: String,

        /// Action command (repeatable; @FILE reads one command per line)
        #[arg(short, long = "action")]
        actions: Vec<String>,

        /// Expectation, with or without the `expect:` prefix (repeatable)
        #[arg(short, long = "expect")]
        expectations: Vec<String>,

        /// Session to restore and append history to
        #[arg(short, long)]
        session: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,

        /// Include the structure of the page's forms
        #[arg(long)]
        forms: bool,

        /// Fail when the page logs console errors or gets HTTP error responses
        #[arg(long)]
        monitor_errors: bool,

        /// Save a screenshot after the run
        #[arg(long, value_name = "FILE")]
        screenshot: Option<PathBuf>,

        #[command(flatten)]
        browser: BrowserArgs,
    },

    /// Interactive command loop
    Repl {
        /// URL to open first
        url: Option<String>,

        /// Session to restore and save history to on exit
        #[arg(short, long)]
        session: Option<String>,

        #[command(flatten)]
        browser: BrowserArgs,
    },

    /// Generate a Playwright test (or an authoring prompt) from a session
    Codegen {
        /// Session name or path to a session file
        #[arg(short, long)]
        session: String,

        /// Emit a prompt for writing the test instead of the test itself
        #[arg(long)]
        prompt: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse commands without running them
    Check {
        /// Commands to parse
        #[arg(required = true)]
        commands: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Manage stored sessions
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(err) => {
            // Convert to our error type to get proper exit code
            let scout_err: ScoutError = err.into();

            // Output JSON error to stdout for programmatic consumption
            let error_json = json!({
                "error": true,
                "message": scout_err.to_string(),
                "exit_code": scout_err.exit_code()
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );

            // Also log to stderr for human reading
            eprintln!("Error: {}", scout_err);
            std::process::exit(scout_err.exit_code());
        }
    }
}

async fn run() -> Result<()> {
    // Initialize tracing to stderr (so JSON output to stdout remains clean)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scout=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let cli = Cli::parse();
    let config_path = ScoutConfig::path_or_default(cli.config.as_deref());
    let config = ScoutConfig::load(&config_path);

    match cli.command {
        Commands::Run {
            url,
            actions,
            expectations,
            session,
            format,
            forms,
            monitor_errors,
            screenshot,
            browser,
        } => {
            let options = commands::run::RunOptions {
                explore: ExploreOptions {
                    monitor_errors,
                    analyze_forms: forms,
                },
                screenshot,
            };
            commands::run::handle_run(
                &config,
                url,
                actions,
                expectations,
                session,
                format,
                options,
                browser,
            )
            .await?
        }
        Commands::Repl {
            url,
            session,
            browser,
        } => commands::repl::handle_repl(&config, url, session, browser).await?,
        Commands::Codegen {
            session,
            prompt,
            output,
        } => commands::codegen::handle_codegen(&config, session, prompt, output)?,
        Commands::Check {
            commands: to_check,
            format,
        } => commands::check::handle_check(to_check, format)?,
        Commands::Session { command } => commands::session::handle_session(&config, command)?,
        Commands::Config { command } => {
            commands::config::handle_config(&config, &config_path, command)?
        }
    }

    Ok(())
}
