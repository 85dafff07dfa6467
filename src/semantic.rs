//! Semantic locators: role, label and text based element references that
//! survive markup churn better than the CSS selector used at record time.

use tracing::debug;

use crate::page::{ElementSnapshot, Page};

/// ARIA roles worth naming explicitly
const EXPLICIT_ROLES: &[&str] = &[
    "button", "link", "checkbox", "radio", "textbox", "combobox", "listbox", "menuitem",
];

const BUTTON_INPUT_TYPES: &[&str] = &["submit", "button", "reset"];

/// Longest visible text accepted as an accessible name for an explicit role
const MAX_ROLE_NAME_LEN: usize = 50;
/// Longest visible text accepted for a bare text locator
const MAX_TEXT_LOCATOR_LEN: usize = 30;

/// Derive a semantic locator for the element `selector` currently matches.
///
/// Returns `None` when the element is missing, the page errors, or no rule
/// applies; callers fall back to the raw selector.
pub async fn derive_semantic_locator(page: &dyn Page, selector: &str) -> Option<String> {
    match page.query_element(selector).await {
        Ok(Some(element)) => semantic_locator_for(&element),
        Ok(None) => None,
        Err(e) => {
            debug!("Could not inspect {} for a semantic locator: {:#}", selector, e);
            None
        }
    }
}

/// Pick the most durable locator expression for `element`, in priority order
pub fn semantic_locator_for(element: &ElementSnapshot) -> Option<String> {
    let tag = element.tag.as_str();
    let aria_label = element.attr("aria-label");
    let placeholder = element.attr("placeholder");
    let text = element.first_line().map(str::trim).filter(|t| !t.is_empty());

    if let Some(role) = element.attr("role")
        && EXPLICIT_ROLES.contains(&role)
    {
        if let Some(name) = aria_label {
            return Some(by_role(role, name));
        }
        if let Some(name) = text
            && name.chars().count() < MAX_ROLE_NAME_LEN
        {
            return Some(by_role(role, name));
        }
    }

    let implicit_role = match tag {
        "button" => Some("button"),
        "a" if element.href.as_deref().is_some_and(|h| !h.is_empty()) => Some("link"),
        _ => None,
    };
    if let Some(role) = implicit_role
        && let Some(name) = aria_label.or(text)
    {
        return Some(by_role(role, name));
    }

    if tag == "input" {
        let input_type = element
            .input_type
            .as_deref()
            .or_else(|| element.attr("type"))
            .unwrap_or("text")
            .to_lowercase();
        if BUTTON_INPUT_TYPES.contains(&input_type.as_str())
            && let Some(value) = element.value.as_deref().filter(|v| !v.is_empty())
        {
            return Some(by_role("button", value));
        }
        if let Some(placeholder) = placeholder {
            return Some(format!("getByPlaceholder('{}')", escape(placeholder)));
        }
        if let Some(label) = aria_label {
            return Some(by_label(label));
        }
        if let Some(label) = element.label.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            return Some(by_label(label));
        }
    }

    if tag == "textarea" {
        if let Some(placeholder) = placeholder {
            return Some(format!("getByPlaceholder('{}')", escape(placeholder)));
        }
        if let Some(label) = aria_label {
            return Some(by_label(label));
        }
    }

    if let Some(test_id) = element.attr("data-testid") {
        return Some(format!("getByTestId('{}')", escape(test_id)));
    }

    text.filter(|t| t.chars().count() < MAX_TEXT_LOCATOR_LEN)
        .map(|t| format!("getByText('{}')", escape(t)))
}

fn by_role(role: &str, name: &str) -> String {
    format!("getByRole('{}', {{ name: '{}' }})", role, escape(name))
}

fn by_label(label: &str) -> String {
    format!("getByLabel('{}')", escape(label))
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
#[path = "semantic_test.rs"]
mod semantic_test;
