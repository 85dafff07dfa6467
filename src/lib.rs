//! # scout
#![allow(clippy::uninlined_format_args)]
//!
//! Exploratory-testing assistant: drive a browser with a compact command
//! language, record what worked, and replay the session as Playwright test
//! source or as a prompt for writing one.
//!
//! ## Command language
//!
//! Commands are `type:param[:param...]` strings:
//!
//! ```text
//! goto:https://example.com
//! click:#login
//! fill:#email:user@example.com
//! fill:"div:nth-child(2) input":value:with:colons
//! press:Enter
//! scroll:bottom
//! wait:500
//! expect:text:Welcome back
//! loop:3:click:.load-more
//! if:#cookie-banner:click:#accept
//! ```
//!
//! Any field may be double-quoted (with `\"` and `\\` escapes) to contain the
//! `:` delimiter. A fill value takes everything after the selector, colons
//! included. `loop` and `if` take a full command as their last field, so they
//! nest.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Run a batch against a page, then check expectations (exit code 6 on failure)
//! scout run "https://example.com" -a "click:#more" -e "text:More information"
//!
//! # Record into a named session and turn it into a test
//! scout run "https://app.test/login" --session login \
//!     -a "fill:#user:admin" -a "fill:#pass:secret" -a "click:#submit"
//! scout codegen --session login --output login.spec.ts
//!
//! # Explore interactively
//! scout repl "https://example.com" --session explore
//!
//! # Check command syntax without a browser
//! scout check "loop:2:if:#next:click:#next"
//! ```
//!
//! ## Library Usage
//!
//! ```no_run
//! use scout::{ActionExecutor, Browser, BrowserType, CodeGenerator, HistoryRecorder, Page};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let browser = Browser::new(BrowserType::Firefox, "http://localhost:4444", None, true).await?;
//! browser.goto("https://example.com").await?;
//!
//! let executor = ActionExecutor::new();
//! let outcomes = executor
//!     .perform_actions(&browser, &["click:a", "expect:url:iana.org"])
//!     .await;
//!
//! let mut recorder = HistoryRecorder::new();
//! for outcome in &outcomes {
//!     recorder.record_outcome(outcome);
//! }
//! println!("{}", CodeGenerator::generate(recorder.records()));
//! browser.close().await?;
//! # Ok(())
//! # }
//! ```

/// Command language: parsing, execution and source rendering
pub mod actions;

/// Test source and prompt generation from recorded history
pub mod codegen;

/// Configuration file handling
pub mod config;

/// Error types and exit codes
pub mod errors;

/// Batch execution with selector healing
pub mod executor;

/// Page summaries: interactive elements, alerts and console/network errors
pub mod explorer;

/// Form structure analysis
pub mod forms;

/// Selector healing heuristics
pub mod healer;

/// History recording and session files
pub mod history;

/// The page capability trait
pub mod page;

/// Interactive command loop
pub mod repl;

/// Semantic locator derivation
pub mod semantic;

/// Shared result and record types
pub mod types;

/// WebDriver-backed page implementation
pub mod webdriver;

pub use actions::{Action, ExpectKind, ScrollTarget, parse};
pub use codegen::CodeGenerator;
pub use config::ScoutConfig;
pub use errors::{ParseError, ScoutError};
pub use executor::{ActionExecutor, CommandOutcome, ExpectationReport};
pub use explorer::{ExploreOptions, ExploreReport, ExploreResult, PageErrors, explore};
pub use forms::{FormResult, analyze_forms};
pub use healer::Healer;
pub use history::{HistoryRecorder, SessionData, SessionStore};
pub use page::{ElementSnapshot, Page};
pub use types::{ActionRecord, ExecutionResult, OutputFormat, ViewportSize};
pub use webdriver::{Browser, BrowserType};
