//! Tool configuration, read from `scout.config.json`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::history::SessionStore;
use crate::types::ViewportSize;
use crate::webdriver::BrowserType;

/// Looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "scout.config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoutConfig {
    pub browser: BrowserType,

    /// WebDriver endpoint; the browser's conventional port when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webdriver_url: Option<String>,

    pub headless: bool,

    /// Window size as `WIDTHxHEIGHT`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<String>,

    /// Where named sessions are stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions_dir: Option<PathBuf>,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            browser: BrowserType::Firefox,
            webdriver_url: None,
            headless: true,
            viewport: None,
            sessions_dir: None,
        }
    }
}

impl ScoutConfig {
    pub fn path_or_default(path: Option<&Path>) -> PathBuf {
        path.map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration. A missing file gives defaults; so does a file that
    /// fails to parse, with a warning.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        let parsed = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .and_then(|content| serde_json::from_str(&content).map_err(anyhow::Error::from));
        match parsed {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to parse config file at {}: {:#}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to save config file at {}", path.display()))?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    pub fn viewport_size(&self) -> Result<Option<ViewportSize>> {
        self.viewport.as_deref().map(ViewportSize::parse).transpose()
    }

    pub fn webdriver_url(&self) -> String {
        self.webdriver_url
            .clone()
            .unwrap_or_else(|| self.browser.get_webdriver_url())
    }

    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(
            self.sessions_dir
                .clone()
                .unwrap_or_else(SessionStore::default_dir),
        )
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
