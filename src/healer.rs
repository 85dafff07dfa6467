//! Selector healing.
//!
//! When a click or fill misses its element, the healer guesses what the
//! selector was aiming at from its last meaningful word and looks for an
//! interactive element on the page that mentions that word.

use tracing::{debug, info, warn};

use crate::page::{ElementSnapshot, HEAL_CANDIDATE_SELECTORS, Page};

/// Selector words that say nothing about which element was meant
const GENERIC_TOKENS: &[&str] = &["btn", "button", "input", "id", "class"];

/// Attributes searched for the keyword, in priority order
const MATCH_ATTRIBUTES: &[&str] = &["name", "id", "placeholder", "aria-label", "data-testid", "value"];

/// Text shorter than this is specific enough for a text selector
const MAX_TEXT_MATCH_LEN: usize = 30;

const MIN_KEYWORD_LEN: usize = 2;

/// Pull the discriminating keyword out of a selector.
///
/// `#btn-submit` gives `submit`; `#user_name_input` gives `name` because
/// `input` is generic.
pub fn extract_keyword(selector: &str) -> Option<String> {
    let tokens: Vec<&str> = selector
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let last = tokens.last()?.to_ascii_lowercase();
    let keyword = if tokens.len() > 1 && GENERIC_TOKENS.contains(&last.as_str()) {
        tokens[tokens.len() - 2].to_ascii_lowercase()
    } else {
        last
    };

    (keyword.len() >= MIN_KEYWORD_LEN).then_some(keyword)
}

/// First candidate, in document order, whose text or a well-known attribute
/// contains `keyword`. `keyword` must already be lowercase.
pub fn find_replacement(candidates: &[ElementSnapshot], keyword: &str) -> Option<String> {
    for element in candidates {
        let text = element.text.trim();
        let lowered = text.to_lowercase();
        if lowered.contains(keyword)
            && (lowered == keyword || text.chars().count() < MAX_TEXT_MATCH_LEN)
        {
            return Some(format!("text=\"{}\"", escape(text)));
        }

        for attr in MATCH_ATTRIBUTES {
            if let Some(value) = element.attr(attr)
                && value.to_lowercase().contains(keyword)
            {
                return Some(format!("{}[{}=\"{}\"]", element.tag, attr, escape(value)));
            }
        }
    }
    None
}

// Backslash first: the parser and the selector engine both read `\` as an escape
fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Proposes replacement selectors for ones that no longer match
#[derive(Debug, Default, Clone, Copy)]
pub struct Healer;

impl Healer {
    pub fn new() -> Self {
        Healer
    }

    /// Best-effort replacement for `failed_selector`, or `None` when no
    /// keyword can be extracted or nothing on the page matches it
    pub async fn heal(&self, page: &dyn Page, failed_selector: &str) -> Option<String> {
        let Some(keyword) = extract_keyword(failed_selector) else {
            debug!("No usable keyword in selector {}", failed_selector);
            return None;
        };

        let candidates = match page.query_all(HEAL_CANDIDATE_SELECTORS).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Healer failed to inspect page: {:#}", e);
                return None;
            }
        };

        let healed = find_replacement(&candidates, &keyword);
        match &healed {
            Some(selector) => info!(
                "Healed selector {} -> {} (keyword \"{}\")",
                failed_selector, selector, keyword
            ),
            None => debug!(
                "No element matches keyword \"{}\" among {} candidates",
                keyword,
                candidates.len()
            ),
        }
        healed
    }
}

#[cfg(test)]
#[path = "healer_test.rs"]
mod healer_test;
