//! The page capability the action engine drives.
//!
//! Everything the engine needs from a browser goes through [`Page`]. The
//! WebDriver-backed [`crate::webdriver::Browser`] is the production
//! implementation; tests substitute a scripted page.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Elements the healer considers as replacement candidates, in query order
pub const HEAL_CANDIDATE_SELECTORS: &[&str] = &[
    "button",
    "a",
    "input",
    "[role=\"button\"]",
    "[role=\"link\"]",
    "[tabindex=\"0\"]",
];

/// Plain-data view of a live DOM element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementSnapshot {
    /// Lowercase tag name
    pub tag: String,
    /// Trimmed rendered text (`innerText`, falling back to `textContent`)
    pub text: String,
    /// All attributes present on the element
    pub attributes: BTreeMap<String, String>,
    /// `type` property for inputs
    pub input_type: Option<String>,
    /// `value` property for form controls
    pub value: Option<String>,
    /// Resolved `href` property for anchors
    pub href: Option<String>,
    /// Text of the first associated `<label>`
    pub label: Option<String>,
}

impl ElementSnapshot {
    pub fn new(tag: impl Into<String>) -> Self {
        ElementSnapshot {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Attribute value, treating an empty attribute as absent
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// First line of the rendered text, if any
    pub fn first_line(&self) -> Option<&str> {
        self.text
            .trim()
            .split('\n')
            .next()
            .filter(|line| !line.is_empty())
    }
}

/// Browser page operations required by the action engine.
///
/// Selectors are passed through verbatim; interpreting them is the
/// implementation's job.
#[async_trait]
pub trait Page: Send + Sync {
    async fn click(&self, selector: &str) -> Result<()>;

    async fn fill(&self, selector: &str, value: &str) -> Result<()>;

    async fn wait_for_timeout(&self, ms: u64) -> Result<()>;

    async fn goto(&self, url: &str) -> Result<()>;

    async fn press_key(&self, key: &str) -> Result<()>;

    async fn scroll_to_top(&self) -> Result<()>;

    async fn scroll_to_bottom(&self) -> Result<()>;

    /// Scroll the first match into view. Returns `false` when nothing matches.
    async fn scroll_into_view(&self, selector: &str) -> Result<bool>;

    async fn query_element(&self, selector: &str) -> Result<Option<ElementSnapshot>>;

    /// Snapshot every element matching any of `selectors`, in document order
    async fn query_all(&self, selectors: &[&str]) -> Result<Vec<ElementSnapshot>>;

    async fn is_visible(&self, selector: &str) -> Result<bool>;

    async fn has_visible_text(&self, text: &str) -> Result<bool>;

    async fn current_url(&self) -> Result<String>;

    async fn evaluate(
        &self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value>;

    /// Wait until the page stops loading resources, or fail once `timeout` elapses
    async fn wait_for_quiescence(&self, timeout: Duration) -> Result<()>;

    /// Existence check, independent of visibility
    async fn exists(&self, selector: &str) -> Result<bool> {
        Ok(self.query_element(selector).await?.is_some())
    }
}
