// Common test utilities and fixtures

use anyhow::Result;
use async_trait::async_trait;
use scout::{ElementSnapshot, Page};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Scripted page: elements are registered per selector, every call is logged
#[derive(Default)]
pub struct MockPage {
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    calls: Vec<String>,
    elements: HashMap<String, ElementSnapshot>,
    candidates: Vec<ElementSnapshot>,
    body_text: String,
    url: String,
    quiescence_times_out: bool,
    query_all_fails: bool,
    clicks_left: Option<usize>,
    script_results: HashMap<String, VecDeque<serde_json::Value>>,
    scripts_fail: bool,
}

#[allow(dead_code)]
impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `selector` resolve to `element`
    pub fn with_element(self, selector: &str, element: ElementSnapshot) -> Self {
        self.lock().elements.insert(selector.to_string(), element);
        self
    }

    /// Add an element to the healer's candidate list
    pub fn with_candidate(self, element: ElementSnapshot) -> Self {
        self.lock().candidates.push(element);
        self
    }

    pub fn with_body_text(self, text: &str) -> Self {
        self.lock().body_text = text.to_string();
        self
    }

    pub fn at_url(self, url: &str) -> Self {
        self.lock().url = url.to_string();
        self
    }

    pub fn with_slow_network(self) -> Self {
        self.lock().quiescence_times_out = true;
        self
    }

    pub fn with_broken_queries(self) -> Self {
        self.lock().query_all_fails = true;
        self
    }

    /// Let the first `n` clicks succeed; every later click fails
    pub fn with_click_limit(self, n: usize) -> Self {
        self.lock().clicks_left = Some(n);
        self
    }

    /// Queue `result` for `evaluate(script, ..)`; the last queued result repeats
    pub fn with_script_result(self, script: &str, result: serde_json::Value) -> Self {
        self.lock()
            .script_results
            .entry(script.to_string())
            .or_default()
            .push_back(result);
        self
    }

    pub fn with_broken_scripts(self) -> Self {
        self.lock().scripts_fail = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Number of logged calls starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    fn log(&self, call: String) {
        self.lock().calls.push(call);
    }

    fn require(&self, selector: &str) -> Result<()> {
        if self.lock().elements.contains_key(selector) {
            Ok(())
        } else {
            anyhow::bail!("Element not found: {}", selector)
        }
    }
}

#[async_trait]
impl Page for MockPage {
    async fn click(&self, selector: &str) -> Result<()> {
        self.log(format!("click {}", selector));
        self.require(selector)?;
        if let Some(left) = self.lock().clicks_left.as_mut() {
            if *left == 0 {
                anyhow::bail!("Element is detached from the DOM: {}", selector);
            }
            *left -= 1;
        }
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        self.log(format!("fill {} {}", selector, value));
        self.require(selector)
    }

    async fn wait_for_timeout(&self, ms: u64) -> Result<()> {
        self.log(format!("wait {}", ms));
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        self.log(format!("goto {}", url));
        self.lock().url = url.to_string();
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        self.log(format!("press {}", key));
        Ok(())
    }

    async fn scroll_to_top(&self) -> Result<()> {
        self.log("scroll top".to_string());
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.log("scroll bottom".to_string());
        Ok(())
    }

    async fn scroll_into_view(&self, selector: &str) -> Result<bool> {
        self.log(format!("scroll {}", selector));
        Ok(self.lock().elements.contains_key(selector))
    }

    async fn query_element(&self, selector: &str) -> Result<Option<ElementSnapshot>> {
        self.log(format!("query {}", selector));
        Ok(self.lock().elements.get(selector).cloned())
    }

    async fn query_all(&self, selectors: &[&str]) -> Result<Vec<ElementSnapshot>> {
        self.log(format!("query_all {}", selectors.join(", ")));
        let state = self.lock();
        if state.query_all_fails {
            anyhow::bail!("Execution context was destroyed");
        }
        Ok(state.candidates.clone())
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        self.log(format!("visible {}", selector));
        Ok(self.lock().elements.contains_key(selector))
    }

    async fn has_visible_text(&self, text: &str) -> Result<bool> {
        self.log(format!("text {}", text));
        Ok(self.lock().body_text.contains(text))
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.lock().url.clone())
    }

    async fn evaluate(
        &self,
        script: &str,
        _args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        self.log(format!("evaluate {}", script));
        let mut state = self.lock();
        if state.scripts_fail {
            anyhow::bail!("javascript error: document is not defined");
        }
        let result = match state.script_results.get_mut(script) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(result.unwrap_or(serde_json::Value::Null))
    }

    async fn wait_for_quiescence(&self, timeout: Duration) -> Result<()> {
        self.log("quiescence".to_string());
        if self.lock().quiescence_times_out {
            anyhow::bail!("Timed out waiting for network idle after {:?}", timeout);
        }
        Ok(())
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        self.log(format!("exists {}", selector));
        Ok(self.lock().elements.contains_key(selector))
    }
}

/// A button whose visible text is `text`
#[allow(dead_code)]
pub fn button(text: &str) -> ElementSnapshot {
    ElementSnapshot::new("button").with_text(text)
}
