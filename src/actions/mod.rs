//! The action command language.
//!
//! A command is `type:param[:param...]`. Any field may be wrapped in double
//! quotes (with `\"` and `\\` escapes) so it can contain the `:` delimiter.
//! `loop:` and `if:` take a full command as their last parameter, so commands
//! nest: `loop:2:if:#banner:click:#dismiss`.

mod execute;
mod parser;
mod render;

use serde::Serialize;
use std::fmt;

pub use execute::NETWORK_IDLE_TIMEOUT;
pub use parser::parse;
pub(crate) use parser::unquote;
pub(crate) use render::indent;

/// Field delimiter in command strings
pub const DELIMITER: char = ':';

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    Click { selector: String },
    Fill { selector: String, value: String },
    Wait { ms: u64 },
    Goto { url: String },
    Press { key: String },
    Scroll { target: ScrollTarget },
    Expect { kind: ExpectKind, value: String },
    /// Repeat `action` up to `count` times, stopping at the first failure
    Loop { count: u32, action: Box<Action> },
    /// Run `action` only when `selector` matches an element
    #[serde(rename = "if")]
    Condition { selector: String, action: Box<Action> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollTarget {
    Top,
    Bottom,
    Selector(String),
}

impl ScrollTarget {
    fn from_param(param: String) -> Self {
        match param.as_str() {
            "top" => ScrollTarget::Top,
            "bottom" => ScrollTarget::Bottom,
            _ => ScrollTarget::Selector(param),
        }
    }
}

/// What an `expect:` command checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectKind {
    /// Text is visible somewhere on the page
    Text,
    /// An element matching the selector is visible
    Selector,
    /// The current URL contains the value
    Url,
}

impl ExpectKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(ExpectKind::Text),
            "selector" => Some(ExpectKind::Selector),
            "url" => Some(ExpectKind::Url),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpectKind::Text => "text",
            ExpectKind::Selector => "selector",
            ExpectKind::Url => "url",
        }
    }
}

impl fmt::Display for ExpectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Action {
    /// The command type tag (`click`, `fill`, ..., `loop`, `if`)
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Click { .. } => "click",
            Action::Fill { .. } => "fill",
            Action::Wait { .. } => "wait",
            Action::Goto { .. } => "goto",
            Action::Press { .. } => "press",
            Action::Scroll { .. } => "scroll",
            Action::Expect { .. } => "expect",
            Action::Loop { .. } => "loop",
            Action::Condition { .. } => "if",
        }
    }

    /// Whether a failure of this action may be retried with a healed selector
    pub fn is_healable(&self) -> bool {
        matches!(self, Action::Click { .. } | Action::Fill { .. })
    }

    /// The element selector a click or fill targets
    pub fn selector(&self) -> Option<&str> {
        match self {
            Action::Click { selector } | Action::Fill { selector, .. } => Some(selector),
            _ => None,
        }
    }

    /// Copy of a click or fill aimed at a different element
    pub fn with_selector(&self, selector: impl Into<String>) -> Option<Action> {
        match self {
            Action::Click { .. } => Some(Action::Click {
                selector: selector.into(),
            }),
            Action::Fill { value, .. } => Some(Action::Fill {
                selector: selector.into(),
                value: value.clone(),
            }),
            _ => None,
        }
    }

    /// Serialize back to a command string that parses to an equal action
    pub fn to_command(&self) -> String {
        match self {
            Action::Click { selector } => format!("click:{}", quote_remainder(selector)),
            Action::Fill { selector, value } => format!(
                "fill:{}:{}",
                quote_field(selector),
                quote_remainder(value)
            ),
            Action::Wait { ms } => format!("wait:{}", ms),
            Action::Goto { url } => format!("goto:{}", quote_remainder(url)),
            Action::Press { key } => format!("press:{}", quote_remainder(key)),
            Action::Scroll { target } => match target {
                ScrollTarget::Top => "scroll:top".to_string(),
                ScrollTarget::Bottom => "scroll:bottom".to_string(),
                ScrollTarget::Selector(selector) => {
                    format!("scroll:{}", quote_remainder(selector))
                }
            },
            Action::Expect { kind, value } => {
                format!("expect:{}:{}", kind, quote_remainder(value))
            }
            Action::Loop { count, action } => format!("loop:{}:{}", count, action.to_command()),
            Action::Condition { selector, action } => {
                format!("if:{}:{}", quote_field(selector), action.to_command())
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_command())
    }
}

fn quote(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Quote a field that is followed by more fields
pub(crate) fn quote_field(s: &str) -> String {
    if s.contains(DELIMITER) || s.contains('"') {
        quote(s)
    } else {
        s.to_string()
    }
}

/// Quote a trailing field only when it would otherwise read as a quoted literal
pub(crate) fn quote_remainder(s: &str) -> String {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        quote(s)
    } else {
        s.to_string()
    }
}
