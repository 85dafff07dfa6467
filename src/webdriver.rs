use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::cookies::Cookie;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::actions::unquote;
use crate::history::{OriginStorage, SessionData, StorageEntry, StoredCookie};
use crate::page::{ElementSnapshot, Page};
use crate::types::ViewportSize;

/// How long resource loading must stay flat before the page counts as idle
const QUIET_WINDOW: Duration = Duration::from_millis(500);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Serializes an element (`arguments[0]`) into an `ElementSnapshot`
const SNAPSHOT_FN: &str = r#"
    function snapshot(el) {
        const attributes = {};
        for (const attr of Array.from(el.attributes)) {
            attributes[attr.name] = attr.value;
        }
        let label = null;
        if (el.labels && el.labels.length > 0) {
            label = (el.labels[0].innerText || el.labels[0].textContent || '').trim();
        }
        const tag = el.tagName.toLowerCase();
        return {
            tag: tag,
            text: (el.innerText || el.textContent || '').trim(),
            attributes: attributes,
            inputType: tag === 'input' ? (el.type || null) : null,
            value: typeof el.value === 'string' ? el.value : null,
            href: tag === 'a' ? (el.href || null) : null,
            label: label
        };
    }
"#;

const READY_STATE_SCRIPT: &str = "return document.readyState === 'complete';";

const ACTIVITY_SCRIPT: &str = r#"
    return {
        ready: document.readyState === 'complete',
        resources: performance.getEntriesByType('resource').length
    };
"#;

const LOCAL_STORAGE_SCRIPT: &str = r#"
    const entries = [];
    for (let i = 0; i < localStorage.length; i++) {
        const name = localStorage.key(i);
        entries.push({ name: name, value: localStorage.getItem(name) });
    }
    return entries;
"#;

/// Browser instance for WebDriver automation
pub struct Browser {
    client: Client,
    browser_type: BrowserType,
    // Removed on drop
    _profile_dir: TempDir,
}

/// Supported browser types
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    /// Mozilla Firefox
    Firefox,
    /// Google Chrome/Chromium
    Chrome,
}

impl std::str::FromStr for BrowserType {
    type Err = anyhow::Error;

    /// Parse browser type from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "firefox" => Ok(BrowserType::Firefox),
            "chrome" | "chromium" => Ok(BrowserType::Chrome),
            _ => anyhow::bail!("Unsupported browser: {}", s),
        }
    }
}

impl BrowserType {
    /// Conventional local endpoint of the browser's driver
    pub fn get_webdriver_url(&self) -> String {
        match self {
            BrowserType::Firefox => "http://localhost:4444".to_string(),
            BrowserType::Chrome => "http://localhost:9515".to_string(),
        }
    }

    fn driver_name(&self) -> &'static str {
        match self {
            BrowserType::Firefox => "geckodriver",
            BrowserType::Chrome => "chromedriver",
        }
    }
}

/// How a selector string is located through WebDriver
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    Css(String),
    XPath(String),
}

impl Target {
    fn locator(&self) -> Locator<'_> {
        match self {
            Target::Css(css) => Locator::Css(css),
            Target::XPath(xpath) => Locator::XPath(xpath),
        }
    }
}

// Text matches skip elements whose text never renders
const TEXT_CANDIDATES: &str = "//*[not(self::script or self::style or self::head or self::title)]";
const UPPER: &str = "'ABCDEFGHIJKLMNOPQRSTUVWXYZ'";
const LOWER: &str = "'abcdefghijklmnopqrstuvwxyz'";

/// Translate a selector into a WebDriver locator.
///
/// `text="Exact"` matches the innermost element whose normalized text equals
/// the literal, `text=part` does a case-insensitive substring match,
/// `xpath=...` and `//...` are XPath, anything else is CSS.
pub(crate) fn translate_selector(selector: &str) -> Target {
    if let Some(xpath) = selector.strip_prefix("xpath=") {
        return Target::XPath(xpath.to_string());
    }
    if selector.starts_with("//") || selector.starts_with("(//") {
        return Target::XPath(selector.to_string());
    }

    let Some(text) = selector.strip_prefix("text=") else {
        return Target::Css(selector.to_string());
    };

    let is_exact = text.len() >= 2 && text.starts_with('"') && text.ends_with('"');
    if is_exact {
        let literal = xpath_literal(&unquote(text));
        let test = format!("normalize-space(.)={}", literal);
        Target::XPath(format!("{}[{}][not(.//*[{}])]", TEXT_CANDIDATES, test, test))
    } else {
        let literal = xpath_literal(&text.to_lowercase());
        let test = format!(
            "contains(translate(normalize-space(.), {}, {}), {})",
            UPPER, LOWER, literal
        );
        Target::XPath(format!("{}[{}][not(.//*[{}])]", TEXT_CANDIDATES, test, test))
    }
}

/// Quote `s` as an XPath 1.0 string literal
pub(crate) fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        return format!("'{}'", s);
    }
    if !s.contains('"') {
        return format!("\"{}\"", s);
    }
    let parts: Vec<String> = s
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// WebDriver key sequence for a key name such as `Enter` or `Control+a`.
///
/// Modifier combinations end with the NULL key so modifiers are released. A
/// trailing `+` is the plus key itself (`Shift++`).
pub(crate) fn key_sequence(key: &str) -> String {
    if key.len() <= 1 || !key.contains('+') {
        return key_code(key);
    }

    let (combo, plus) = match key.strip_suffix('+') {
        Some(rest) => (rest, true),
        None => (key, false),
    };
    let mut sequence: String = combo
        .split('+')
        .filter(|part| !part.is_empty())
        .map(key_code)
        .collect();
    if plus {
        sequence.push('+');
    }
    sequence.push('\u{E000}');
    sequence
}

fn key_code(name: &str) -> String {
    let code = match name {
        "Backspace" => '\u{E003}',
        "Tab" => '\u{E004}',
        "Enter" => '\u{E007}',
        "Shift" => '\u{E008}',
        "Control" => '\u{E009}',
        "Alt" => '\u{E00A}',
        "Escape" => '\u{E00C}',
        "Space" => '\u{E00D}',
        "PageUp" => '\u{E00E}',
        "PageDown" => '\u{E00F}',
        "End" => '\u{E010}',
        "Home" => '\u{E011}',
        "ArrowLeft" => '\u{E012}',
        "ArrowUp" => '\u{E013}',
        "ArrowRight" => '\u{E014}',
        "ArrowDown" => '\u{E015}',
        "Insert" => '\u{E016}',
        "Delete" => '\u{E017}',
        "Meta" => '\u{E03D}',
        _ => {
            if let Some(n) = name.strip_prefix('F').and_then(|n| n.parse::<u32>().ok())
                && (1..=12).contains(&n)
                && let Some(c) = char::from_u32(0xE031 + n - 1)
            {
                return c.to_string();
            }
            return name.to_string();
        }
    };
    code.to_string()
}

/// Whether a cookie stored for `domain` may be set while on `host`
pub(crate) fn cookie_applies(domain: Option<&str>, host: &str) -> bool {
    match domain {
        None => true,
        Some(domain) => {
            let domain = domain.trim_start_matches('.');
            host == domain || host.ends_with(&format!(".{}", domain))
        }
    }
}

impl Browser {
    /// Create a new browser instance
    ///
    /// # Arguments
    /// * `browser_type` - Firefox or Chrome
    /// * `webdriver_url` - Endpoint of a running geckodriver/chromedriver
    /// * `viewport` - Optional viewport dimensions
    /// * `headless` - Whether to run in headless mode
    pub async fn new(
        browser_type: BrowserType,
        webdriver_url: &str,
        viewport: Option<ViewportSize>,
        headless: bool,
    ) -> Result<Self> {
        info!("Connecting to {:?} WebDriver", browser_type);

        if !Self::is_webdriver_running(webdriver_url).await {
            let driver_name = browser_type.driver_name();
            anyhow::bail!(
                "Cannot connect to {} WebDriver at {}.\n\
                Please ensure {} is running:\n\
                  For Firefox: geckodriver --port 4444\n\
                  For Chrome: chromedriver --port 9515",
                driver_name,
                webdriver_url,
                driver_name
            );
        }

        let profile_dir = tempfile::Builder::new()
            .prefix(&format!("scout-{:?}-", browser_type).to_lowercase())
            .tempdir()?;

        let mut caps = serde_json::Map::new();
        match &browser_type {
            BrowserType::Firefox => {
                let mut args = vec![
                    "-profile".to_string(),
                    profile_dir.path().display().to_string(),
                ];
                if headless {
                    args.push("--headless".to_string());
                }
                if let Some(vp) = &viewport {
                    args.push(format!("--width={}", vp.width));
                    args.push(format!("--height={}", vp.height));
                }
                caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
            }
            BrowserType::Chrome => {
                let mut args = vec!["--no-sandbox".to_string()];
                if headless {
                    args.push("--headless=new".to_string());
                    args.push("--disable-gpu".to_string());
                    args.push("--disable-dev-shm-usage".to_string());
                }
                if let Some(vp) = &viewport {
                    args.push(format!("--window-size={},{}", vp.width, vp.height));
                }
                args.push(format!("--user-data-dir={}", profile_dir.path().display()));
                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
            }
        }

        debug!("Connecting to WebDriver at {}", webdriver_url);
        let client = ClientBuilder::rustls()
            .capabilities(caps)
            .connect(webdriver_url)
            .await
            .context("Failed to connect to WebDriver")?;

        if let Some(vp) = viewport {
            debug!("Setting viewport to {}x{}", vp.width, vp.height);
            if let Err(e) = client.set_window_size(vp.width, vp.height).await {
                debug!("Note: Could not set window size: {}", e);
            }
        }

        Ok(Browser {
            client,
            browser_type,
            _profile_dir: profile_dir,
        })
    }

    async fn is_webdriver_running(url: &str) -> bool {
        let status_url = format!("{}/status", url.trim_end_matches('/'));
        match reqwest::get(&status_url).await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    pub fn browser_type(&self) -> BrowserType {
        self.browser_type
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Element>> {
        let target = translate_selector(selector);
        self.client
            .find_all(target.locator())
            .await
            .with_context(|| format!("Failed to query selector: {}", selector))
    }

    async fn find(&self, selector: &str) -> Result<Element> {
        self.find_all(selector)
            .await?
            .into_iter()
            .next()
            .with_context(|| format!("Element not found: {}", selector))
    }

    async fn snapshot(&self, element: &Element) -> Result<ElementSnapshot> {
        let script = format!("{}\nreturn snapshot(arguments[0]);", SNAPSHOT_FN);
        let value = self
            .client
            .execute(&script, vec![serde_json::to_value(element)?])
            .await
            .context("Failed to snapshot element")?;
        Ok(serde_json::from_value(value)?)
    }

    async fn current_origin(&self) -> Result<Option<url::Url>> {
        let current = self.client.current_url().await?;
        Ok(matches!(current.scheme(), "http" | "https").then_some(current))
    }

    /// Capture cookies and the current origin's localStorage
    pub async fn storage_state(&self) -> Result<(Vec<StoredCookie>, Vec<OriginStorage>)> {
        let cookies = self
            .client
            .get_all_cookies()
            .await
            .context("Failed to read cookies")?
            .iter()
            .map(|cookie| StoredCookie {
                name: cookie.name().to_string(),
                value: cookie.value().to_string(),
                domain: cookie.domain().map(str::to_string),
                path: cookie.path().map(str::to_string),
                secure: cookie.secure(),
                http_only: cookie.http_only(),
                extra: serde_json::Map::new(),
            })
            .collect();

        let mut origins = Vec::new();
        if let Some(current) = self.current_origin().await? {
            let value = self.client.execute(LOCAL_STORAGE_SCRIPT, vec![]).await?;
            let local_storage: Vec<StorageEntry> = serde_json::from_value(value)?;
            if !local_storage.is_empty() {
                origins.push(OriginStorage {
                    origin: current.origin().ascii_serialization(),
                    local_storage,
                });
            }
        }

        Ok((cookies, origins))
    }

    /// Restore cookies and localStorage that belong to the page currently open.
    ///
    /// WebDriver only accepts cookies for the current domain, so call this
    /// after the first navigation. The page is reloaded when anything was applied.
    pub async fn apply_storage_state(&self, session: &SessionData) -> Result<()> {
        let Some(current) = self.current_origin().await? else {
            debug!("Not on an http(s) page, skipping storage restore");
            return Ok(());
        };
        let host = current.host_str().unwrap_or_default().to_string();
        let origin = current.origin().ascii_serialization();
        let mut applied = 0;

        for stored in &session.cookies {
            if !cookie_applies(stored.domain.as_deref(), &host) {
                continue;
            }
            let mut cookie = Cookie::new(stored.name.clone(), stored.value.clone());
            if let Some(domain) = &stored.domain {
                cookie.set_domain(domain.clone());
            }
            if let Some(path) = &stored.path {
                cookie.set_path(path.clone());
            }
            cookie.set_secure(stored.secure);
            cookie.set_http_only(stored.http_only);

            match self.client.add_cookie(cookie).await {
                Ok(()) => applied += 1,
                Err(e) => debug!("Could not restore cookie {}: {}", stored.name, e),
            }
        }

        for storage in session.origins.iter().filter(|o| o.origin == origin) {
            for entry in &storage.local_storage {
                self.client
                    .execute(
                        "localStorage.setItem(arguments[0], arguments[1]);",
                        vec![json!(entry.name), json!(entry.value)],
                    )
                    .await
                    .context("Failed to restore localStorage")?;
                applied += 1;
            }
        }

        if applied > 0 {
            info!("Restored {} storage entries, reloading", applied);
            self.client.refresh().await?;
        }
        Ok(())
    }

    /// Save a PNG of the current viewport
    pub async fn screenshot(&self, path: &std::path::Path) -> Result<usize> {
        let png = self
            .client
            .screenshot()
            .await
            .context("Failed to take screenshot")?;
        std::fs::write(path, &png)
            .with_context(|| format!("Failed to write screenshot to {}", path.display()))?;
        Ok(png.len())
    }

    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}

#[async_trait]
impl Page for Browser {
    async fn click(&self, selector: &str) -> Result<()> {
        let element = self.find(selector).await?;
        element
            .click()
            .await
            .with_context(|| format!("Failed to click {}", selector))?;
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let element = self.find(selector).await?;
        element.clear().await?;
        element
            .send_keys(value)
            .await
            .with_context(|| format!("Failed to fill {}", selector))?;
        Ok(())
    }

    async fn wait_for_timeout(&self, ms: u64) -> Result<()> {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        self.client
            .goto(url)
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;

        // Max 2 seconds
        for _ in 0..20 {
            match self.client.execute(READY_STATE_SCRIPT, vec![]).await {
                Ok(val) if val.as_bool().unwrap_or(false) => break,
                _ => tokio::time::sleep(POLL_INTERVAL).await,
            }
        }
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        let target = self.client.active_element().await?;
        target
            .send_keys(&key_sequence(key))
            .await
            .with_context(|| format!("Failed to press {}", key))?;
        Ok(())
    }

    async fn scroll_to_top(&self) -> Result<()> {
        self.client.execute("window.scrollTo(0, 0);", vec![]).await?;
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.client
            .execute("window.scrollTo(0, document.body.scrollHeight);", vec![])
            .await?;
        Ok(())
    }

    async fn scroll_into_view(&self, selector: &str) -> Result<bool> {
        let Some(element) = self.find_all(selector).await?.into_iter().next() else {
            return Ok(false);
        };
        self.client
            .execute(
                "arguments[0].scrollIntoView({ block: 'center' });",
                vec![serde_json::to_value(&element)?],
            )
            .await?;
        Ok(true)
    }

    async fn query_element(&self, selector: &str) -> Result<Option<ElementSnapshot>> {
        match self.find_all(selector).await?.first() {
            Some(element) => Ok(Some(self.snapshot(element).await?)),
            None => Ok(None),
        }
    }

    async fn query_all(&self, selectors: &[&str]) -> Result<Vec<ElementSnapshot>> {
        let mut css = Vec::with_capacity(selectors.len());
        for selector in selectors {
            match translate_selector(selector) {
                Target::Css(s) => css.push(s),
                Target::XPath(_) => anyhow::bail!("query_all takes CSS selectors, got {}", selector),
            }
        }

        let script = format!(
            "{}\nreturn Array.from(document.querySelectorAll(arguments[0])).map(snapshot);",
            SNAPSHOT_FN
        );
        let value = self
            .client
            .execute(&script, vec![json!(css.join(", "))])
            .await
            .context("Failed to query candidate elements")?;
        Ok(serde_json::from_value(value)?)
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        for element in self.find_all(selector).await? {
            if element.is_displayed().await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn has_visible_text(&self, text: &str) -> Result<bool> {
        let value = self
            .client
            .execute(
                "return !!document.body && document.body.innerText.includes(arguments[0]);",
                vec![json!(text)],
            )
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn evaluate(
        &self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        self.client
            .execute(script, args)
            .await
            .context("Failed to execute script")
    }

    async fn wait_for_quiescence(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        let mut last_count: Option<u64> = None;
        let mut stable_since = Instant::now();

        loop {
            let activity = self.client.execute(ACTIVITY_SCRIPT, vec![]).await?;
            let ready = activity["ready"].as_bool().unwrap_or(false);
            let count = activity["resources"].as_u64();

            if count != last_count || !ready {
                last_count = count;
                stable_since = Instant::now();
            } else if stable_since.elapsed() >= QUIET_WINDOW {
                return Ok(());
            }

            if Instant::now() >= deadline {
                anyhow::bail!("Timed out waiting for network idle after {:?}", timeout);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        Ok(!self.find_all(selector).await?.is_empty())
    }
}

#[cfg(test)]
#[path = "webdriver_test.rs"]
mod webdriver_test;
