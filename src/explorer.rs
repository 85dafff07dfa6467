//! Page exploration: what a tester sees after a run.
//!
//! [`explore`] runs a batch, checks expectations, then summarizes the page:
//! the visible interactive elements (with alert-like elements flagged), form
//! structure when asked for, and console or HTTP errors when monitoring is on.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};
use url::Url;

use crate::executor::{ActionExecutor, CommandOutcome, ExpectationReport};
use crate::forms::{FormResult, analyze_forms};
use crate::page::Page;

/// Errors kept per kind; older entries are dropped first
pub const MAX_RECORDED_ERRORS: usize = 1000;

/// Query parameters whose values never appear in reported URLs
const SENSITIVE_PARAMS: &[&str] = &[
    "token",
    "access_token",
    "refresh_token",
    "auth",
    "authorization",
    "password",
    "secret",
    "key",
    "apikey",
    "api_key",
    "id_token",
    "email",
    "phone",
    "ssn",
    "username",
    "code",
    "session_id",
    "sid",
];

/// Collects visible interactive and alert-like elements
pub const SCRAPE_SCRIPT: &str = r#"
    const selectors = [
        "button", "a", "input", "select", "textarea",
        "[role='button']", "[role='link']",
        "[role='alert']", "[aria-invalid='true']",
        ".error-message", ".error", ".toast", ".alert"
    ].join(", ");

    const visible = Array.from(document.querySelectorAll(selectors)).filter(el => {
        const style = window.getComputedStyle(el);
        return style.display !== 'none' && style.visibility !== 'hidden'
            && el.offsetWidth > 0 && el.offsetHeight > 0;
    });

    return {
        url: window.location.href,
        title: document.title,
        elements: visible.map(el => {
            const rect = el.getBoundingClientRect();
            const className = typeof el.className === 'string' ? el.className : '';
            const parent = el.closest('header, nav, main, footer, form, section, article, aside');
            let region = 'body';
            if (parent) {
                region = parent.tagName.toLowerCase();
                if (parent.id) {
                    region += '#' + parent.id;
                } else if (typeof parent.className === 'string' && parent.className.trim()) {
                    region += '.' + parent.className.trim().split(/\s+/)[0];
                }
            }
            const isAlert = el.getAttribute('role') === 'alert'
                || el.getAttribute('aria-invalid') === 'true'
                || ['error-message', 'error', 'toast', 'alert'].some(c => el.classList.contains(c));
            return {
                tag: el.tagName.toLowerCase(),
                text: (el.textContent || el.value || '').trim().slice(0, 100),
                id: el.id || '',
                className: className,
                ariaLabel: el.getAttribute('aria-label') || '',
                region: region,
                box: { x: rect.x, y: rect.y, width: rect.width, height: rect.height },
                isAlert: isAlert
            };
        })
    };
"#;

/// Hooks console errors, uncaught errors, failed resource loads and HTTP error
/// responses from fetch/XMLHttpRequest. Idempotent per document.
pub const MONITOR_INSTALL_SCRIPT: &str = r#"
    const max = arguments[0];
    const state = window.__scoutErrors = window.__scoutErrors
        || { console: [], network: [], reported: {} };
    if (window.__scoutErrorsHooked) {
        return true;
    }
    window.__scoutErrorsHooked = true;

    const push = (list, entry) => {
        list.push(entry);
        if (list.length > max) list.shift();
    };
    const describe = value => {
        if (value instanceof Error) return value.message;
        if (typeof value === 'string') return value;
        try { return JSON.stringify(value); } catch (e) { return String(value); }
    };

    const originalError = console.error;
    console.error = function (...args) {
        push(state.console, args.map(describe).join(' '));
        return originalError.apply(console, args);
    };
    window.addEventListener('error', event => {
        const target = event.target;
        if (target && target !== window && (target.src || target.href)) {
            push(state.network, { status: null, method: 'GET', url: target.src || target.href });
        } else {
            push(state.console, event.message || describe(event.error));
        }
    }, true);
    window.addEventListener('unhandledrejection', event => {
        push(state.console, 'Unhandled rejection: ' + describe(event.reason));
    });

    if (window.fetch) {
        const originalFetch = window.fetch;
        window.fetch = function (input, init) {
            const method = ((init && init.method) || (input && input.method) || 'GET').toUpperCase();
            const url = typeof input === 'string' ? input : ((input && input.url) || String(input));
            return originalFetch.apply(this, arguments).then(response => {
                if (response.status >= 400) {
                    state.reported[response.url || url] = true;
                    push(state.network, { status: response.status, method: method, url: response.url || url });
                }
                return response;
            });
        };
    }
    const originalOpen = XMLHttpRequest.prototype.open;
    XMLHttpRequest.prototype.open = function (method, url) {
        this.addEventListener('loadend', () => {
            if (this.status >= 400) {
                const target = this.responseURL || String(url);
                state.reported[target] = true;
                push(state.network, { status: this.status, method: String(method).toUpperCase(), url: target });
            }
        });
        return originalOpen.apply(this, arguments);
    };
    return true;
"#;

/// Drains the hooked errors and adds HTTP error statuses from resource timing,
/// which also covers loads that happened before the hooks were installed
pub const MONITOR_COLLECT_SCRIPT: &str = r#"
    const state = window.__scoutErrors = window.__scoutErrors
        || { console: [], network: [], reported: {} };
    const fromTiming = performance.getEntriesByType('navigation')
        .concat(performance.getEntriesByType('resource'))
        .filter(entry => typeof entry.responseStatus === 'number'
            && entry.responseStatus >= 400 && !state.reported[entry.name])
        .map(entry => {
            state.reported[entry.name] = true;
            return { status: entry.responseStatus, method: 'GET', url: entry.name };
        });
    return {
        console: state.console.splice(0),
        network: fromTiming.concat(state.network.splice(0))
    };
"#;

/// On-page position and size in CSS pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A visible element a tester could interact with or should notice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InteractiveElement {
    pub tag: String,
    pub text: String,
    pub id: String,
    pub class_name: String,
    pub aria_label: String,
    /// Closest landmark (`nav`, `form#login`, `main.content`, ...) or `body`
    pub region: String,
    #[serde(rename = "box")]
    pub bounds: ElementBox,
    /// Error messages, toasts, `role="alert"` and `aria-invalid` fields
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_alert: bool,
}

impl InteractiveElement {
    /// Short human label: text, then aria-label, then id
    pub fn label(&self) -> &str {
        [&self.text, &self.aria_label, &self.id]
            .into_iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }
}

/// Snapshot of the page at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExploreResult {
    pub url: String,
    pub title: String,
    pub elements: Vec<InteractiveElement>,
}

impl ExploreResult {
    pub fn alerts(&self) -> impl Iterator<Item = &InteractiveElement> {
        self.elements.iter().filter(|element| element.is_alert)
    }
}

/// Scrape the visible interactive elements of the current page
pub async fn scrape(page: &dyn Page) -> Result<ExploreResult> {
    let value = page
        .evaluate(SCRAPE_SCRIPT, vec![])
        .await
        .context("Failed to scrape page")?;
    if value.is_null() {
        return Ok(ExploreResult::default());
    }
    let result: ExploreResult =
        serde_json::from_value(value).context("Unexpected page scrape result")?;
    debug!(
        "Scraped {} elements from {}",
        result.elements.len(),
        result.url
    );
    Ok(result)
}

/// An HTTP error response or a failed resource load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkError {
    /// `None` when the request never got a response
    pub status: Option<u16>,
    pub method: String,
    pub url: String,
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "[{}] {} {}", status, self.method, self.url),
            None => write!(f, "[failed] {} {}", self.method, self.url),
        }
    }
}

/// Errors observed while monitoring a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageErrors {
    pub console: Vec<String>,
    pub network: Vec<NetworkError>,
}

impl PageErrors {
    pub fn is_empty(&self) -> bool {
        self.console.is_empty() && self.network.is_empty()
    }

    pub fn len(&self) -> usize {
        self.console.len() + self.network.len()
    }

    /// One line per error, console errors first
    pub fn messages(&self) -> Vec<String> {
        self.console
            .iter()
            .map(|e| format!("Console Error: {}", e))
            .chain(self.network.iter().map(|e| format!("Network Error: {}", e)))
            .collect()
    }

    fn append(&mut self, mut other: PageErrors) {
        self.console.append(&mut other.console);
        self.network.append(&mut other.network);
        if self.console.len() > MAX_RECORDED_ERRORS {
            self.console.drain(..self.console.len() - MAX_RECORDED_ERRORS);
        }
        if self.network.len() > MAX_RECORDED_ERRORS {
            self.network.drain(..self.network.len() - MAX_RECORDED_ERRORS);
        }
    }
}

/// Accumulates page errors across commands.
///
/// Hooks live in the document, so [`ErrorMonitor::drain`] re-installs them
/// after reading; errors raised by a document that is navigated away before
/// the next drain are lost.
#[derive(Debug, Default)]
pub struct ErrorMonitor {
    errors: PageErrors,
}

impl ErrorMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn install(&self, page: &dyn Page) -> Result<()> {
        page.evaluate(
            MONITOR_INSTALL_SCRIPT,
            vec![serde_json::json!(MAX_RECORDED_ERRORS)],
        )
        .await
        .context("Failed to install error monitor")?;
        Ok(())
    }

    /// Move errors recorded in the page into this monitor
    pub async fn drain(&mut self, page: &dyn Page) -> Result<()> {
        let value = page
            .evaluate(MONITOR_COLLECT_SCRIPT, vec![])
            .await
            .context("Failed to collect page errors")?;
        if !value.is_null() {
            let mut collected: PageErrors =
                serde_json::from_value(value).context("Unexpected error monitor result")?;
            for error in &mut collected.network {
                error.url = redact_url(&error.url);
            }
            if !collected.is_empty() {
                debug!("Collected {} page errors", collected.len());
            }
            self.errors.append(collected);
        }
        self.install(page).await
    }

    pub fn errors(&self) -> &PageErrors {
        &self.errors
    }

    pub fn into_errors(self) -> PageErrors {
        self.errors
    }
}

/// Replace the values of sensitive query parameters with `REDACTED`.
///
/// URLs that do not parse, or carry nothing sensitive, come back unchanged.
pub fn redact_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };

    let mut changed = false;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(name, value)| {
            let lowered = name.to_lowercase();
            if SENSITIVE_PARAMS.iter().any(|param| lowered.contains(param)) {
                changed = true;
                (name.into_owned(), "REDACTED".to_string())
            } else {
                (name.into_owned(), value.into_owned())
            }
        })
        .collect();

    if !changed {
        return raw.to_string();
    }
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}

/// What to collect besides the element summary
#[derive(Debug, Clone, Copy, Default)]
pub struct ExploreOptions {
    pub monitor_errors: bool,
    pub analyze_forms: bool,
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct ExploreReport {
    pub actions: Vec<CommandOutcome>,
    pub expectations: ExpectationReport,
    pub page: ExploreResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forms: Option<Vec<FormResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<PageErrors>,
}

impl ExploreReport {
    /// Failure message when monitoring was on and saw errors
    pub fn monitoring_failure(&self) -> Option<String> {
        let errors = self.errors.as_ref().filter(|errors| !errors.is_empty())?;
        Some(format!(
            "Monitoring failed with {} errors:\n{}",
            errors.len(),
            errors.messages().join("\n")
        ))
    }
}

/// Run `actions` in order, check `expectations`, then summarize the page.
///
/// Command and expectation failures are reported, not raised. Errors come
/// only from the summary steps.
pub async fn explore<A, E>(
    page: &dyn Page,
    executor: &ActionExecutor,
    actions: &[A],
    expectations: &[E],
    options: ExploreOptions,
) -> Result<ExploreReport>
where
    A: AsRef<str>,
    E: AsRef<str>,
{
    let mut monitor = options.monitor_errors.then(ErrorMonitor::new);
    if let Some(monitor) = &monitor {
        monitor.install(page).await?;
    }

    let mut outcomes = Vec::with_capacity(actions.len());
    for action in actions {
        outcomes.push(executor.execute_command(page, action.as_ref()).await);
        if let Some(monitor) = monitor.as_mut() {
            monitor.drain(page).await?;
        }
    }

    let expectations = executor.check_expectations(page, expectations).await;
    let summary = scrape(page).await?;
    info!(
        "Found {} interactive elements on {}",
        summary.elements.len(),
        summary.url
    );
    let alerts = summary.alerts().count();
    if alerts > 0 {
        warn!("{} alert-like elements visible", alerts);
    }

    let forms = if options.analyze_forms {
        Some(analyze_forms(page).await?)
    } else {
        None
    };

    let errors = match monitor {
        Some(mut monitor) => {
            monitor.drain(page).await?;
            Some(monitor.into_errors())
        }
        None => None,
    };

    Ok(ExploreReport {
        actions: outcomes,
        expectations,
        page: summary,
        forms,
        errors,
    })
}

#[cfg(test)]
#[path = "explorer_test.rs"]
mod explorer_test;
