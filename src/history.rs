//! Session history and its on-disk storage.
//!
//! A session file holds browser storage state (cookies and per-origin
//! localStorage) next to the command history recorded against it. Files
//! written as plain storage state, without a `history` key, still load.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::executor::CommandOutcome;
use crate::types::ActionRecord;

/// Append-only log of successfully executed commands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryRecorder {
    records: Vec<ActionRecord>,
}

impl HistoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue an existing history
    pub fn from_records(records: Vec<ActionRecord>) -> Self {
        HistoryRecorder { records }
    }

    pub fn record(&mut self, command: impl Into<String>, semantic_locator: Option<String>) {
        self.records.push(ActionRecord::new(command, semantic_locator));
    }

    /// Record a batch outcome. Failed commands are not replayable and are skipped.
    pub fn record_outcome(&mut self, outcome: &CommandOutcome) -> bool {
        if !outcome.result.success {
            return false;
        }
        self.record(
            outcome.recorded_command(),
            outcome.result.semantic_locator.clone(),
        );
        true
    }

    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<ActionRecord> {
        self.records
    }
}

/// A persisted cookie. Unknown fields are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEntry {
    pub name: String,
    pub value: String,
}

/// localStorage contents of one origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginStorage {
    pub origin: String,
    #[serde(default)]
    pub local_storage: Vec<StorageEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub cookies: Vec<StoredCookie>,
    #[serde(default)]
    pub origins: Vec<OriginStorage>,
    #[serde(default)]
    pub history: Vec<ActionRecord>,
}

/// Listing entry for a stored session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub name: String,
    pub path: PathBuf,
    pub commands: usize,
    pub cookies: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

/// Directory of `<name>.json` session files
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SessionStore { dir: dir.into() }
    }

    /// Platform data directory, e.g. `~/.local/share/scout/sessions`
    pub fn default_dir() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("scout");
        path.push("sessions");
        path
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Map a session name to its file. Values that look like paths are used as-is.
    pub fn resolve(&self, name: &str) -> PathBuf {
        if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) || name.ends_with(".json")
        {
            PathBuf::from(name)
        } else {
            self.dir.join(format!("{}.json", name))
        }
    }

    /// Load a session. A missing or unreadable file yields an empty session.
    pub fn load(&self, name: &str) -> SessionData {
        let path = self.resolve(name);
        if !path.exists() {
            debug!("No session at {}, starting fresh", path.display());
            return SessionData::default();
        }

        match read_session(&path) {
            Ok(data) => {
                info!(
                    "Loaded session {} ({} commands)",
                    path.display(),
                    data.history.len()
                );
                data
            }
            Err(e) => {
                warn!("Failed to load session from {}: {:#}", path.display(), e);
                SessionData::default()
            }
        }
    }

    pub fn save(&self, name: &str, data: &SessionData) -> Result<PathBuf> {
        let path = self.resolve(name);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(data)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to save session to {}", path.display()))?;
        info!("Saved session to {}", path.display());
        Ok(path)
    }

    /// Sessions in the store directory, sorted by name
    pub fn list(&self) -> Result<Vec<SessionSummary>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut sessions = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match read_session(&path) {
                Ok(data) => sessions.push(SessionSummary {
                    name: name.to_string(),
                    commands: data.history.len(),
                    cookies: data.cookies.len(),
                    modified: fs::metadata(&path)
                        .and_then(|m| m.modified())
                        .ok()
                        .map(DateTime::<Utc>::from),
                    path,
                }),
                Err(e) => debug!("Skipping {}: {:#}", path.display(), e),
            }
        }

        sessions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sessions)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.resolve(name);
        if !path.exists() {
            anyhow::bail!("Session '{}' does not exist", name);
        }
        fs::remove_file(&path)?;
        info!("Deleted session {}", path.display());
        Ok(())
    }
}

fn read_session(path: &Path) -> Result<SessionData> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let data = serde_json::from_str(&content)
        .with_context(|| format!("Invalid session file {}", path.display()))?;
    Ok(data)
}

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;
