use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Output format for CLI results
#[derive(Clone, Copy, Debug, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON format for programmatic consumption
    Json,
    /// Human-readable simple format
    Simple,
}

/// Outcome of executing one action node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Durable locator for the element the action targeted, if one could be derived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_locator: Option<String>,
}

impl ExecutionResult {
    pub fn success() -> Self {
        ExecutionResult {
            success: true,
            ..Default::default()
        }
    }

    pub fn with_semantic(semantic_locator: Option<String>) -> Self {
        ExecutionResult {
            success: true,
            error: None,
            semantic_locator,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        ExecutionResult {
            success: false,
            error: Some(error.into()),
            semantic_locator: None,
        }
    }
}

/// One executed command in a session history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    /// The command string as executed
    #[serde(alias = "action")]
    pub command: String,
    #[serde(
        default,
        alias = "semantic",
        skip_serializing_if = "Option::is_none"
    )]
    pub semantic_locator: Option<String>,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl ActionRecord {
    pub fn new(command: impl Into<String>, semantic_locator: Option<String>) -> Self {
        ActionRecord {
            command: command.into(),
            semantic_locator,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Browser viewport dimensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
}

impl ViewportSize {
    /// Parse viewport size from "WIDTHxHEIGHT" format (e.g., "1920x1080")
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid viewport format. Use WIDTHxHEIGHT (e.g., 1920x1080)");
        }

        let width = parts[0]
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid width in viewport size"))?;
        let height = parts[1]
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid height in viewport size"))?;

        Ok(ViewportSize { width, height })
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
