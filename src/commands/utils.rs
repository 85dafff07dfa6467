use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use scout::history::{SessionData, SessionStore};
use scout::types::ActionRecord;
use scout::{Browser, BrowserType, Page, ScoutConfig, ViewportSize};

/// Browser options shared by commands that open a page
#[derive(Args, Debug, Clone, Default)]
pub struct BrowserArgs {
    /// Browser to use (firefox, chrome); overrides the config file
    #[arg(short, long)]
    pub browser: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub no_headless: bool,

    /// Set viewport size (WIDTHxHEIGHT, e.g., 1920x1080)
    #[arg(long)]
    pub viewport: Option<String>,

    /// WebDriver endpoint (defaults to the browser's usual local port)
    #[arg(long)]
    pub webdriver_url: Option<String>,
}

/// Connect to a browser using config values overridden by command-line flags
pub async fn open_browser(config: &ScoutConfig, args: &BrowserArgs) -> Result<Browser> {
    let mut config = config.clone();
    if let Some(browser) = &args.browser {
        config.browser = browser.parse::<BrowserType>()?;
        if args.webdriver_url.is_none() {
            config.webdriver_url = None;
        }
    }
    if let Some(url) = &args.webdriver_url {
        config.webdriver_url = Some(url.clone());
    }
    if args.no_headless {
        config.headless = false;
    }

    let viewport = match &args.viewport {
        Some(v) => Some(ViewportSize::parse(v)?),
        None => config.viewport_size()?,
    };

    Browser::new(
        config.browser,
        &config.webdriver_url(),
        viewport,
        config.headless,
    )
    .await
}

/// Load the named session (if any) and navigate to `url`, restoring stored
/// cookies and localStorage for it
pub async fn start_session(
    browser: &Browser,
    store: &SessionStore,
    session: Option<&str>,
    url: Option<&str>,
) -> Result<SessionData> {
    let data = session.map(|name| store.load(name)).unwrap_or_default();

    if let Some(url) = url {
        browser.goto(url).await?;
        if session.is_some() {
            browser.apply_storage_state(&data).await?;
        }
    }
    Ok(data)
}

/// Write browser storage plus `history` back to the named session
pub async fn persist_session(
    browser: &Browser,
    store: &SessionStore,
    name: &str,
    history: Vec<ActionRecord>,
) -> Result<()> {
    let (cookies, origins) = browser
        .storage_state()
        .await
        .context("Failed to capture browser storage")?;
    let data = SessionData {
        cookies,
        origins,
        history,
    };
    let path = store.save(name, &data)?;
    info!("Session '{}' saved to {}", name, path.display());
    Ok(())
}

/// Expand `@file` arguments into the commands listed in that file.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn expand_commands(args: Vec<String>) -> Result<Vec<String>> {
    let mut commands = Vec::with_capacity(args.len());
    for arg in args {
        match arg.strip_prefix('@') {
            Some(file_path) => {
                let content = std::fs::read_to_string(file_path)
                    .context(format!("Failed to read commands from file: {}", file_path))?;
                commands.extend(
                    content
                        .lines()
                        .map(str::trim)
                        .filter(|line| !line.is_empty() && !line.starts_with('#'))
                        .map(str::to_string),
                );
            }
            None => commands.push(arg),
        }
    }
    Ok(commands)
}
