use super::{Action, ExpectKind, ScrollTarget};

impl Action {
    /// Render as a Playwright (TypeScript) statement.
    ///
    /// A semantic locator, when given, replaces the raw selector of a click or
    /// fill. Loop and condition bodies are rendered from their raw selectors.
    pub fn to_source_code(&self, semantic_locator: Option<&str>) -> String {
        match self {
            Action::Click { selector } => match semantic_locator {
                Some(locator) => format!("await page.{}.click();", locator),
                None => format!("await page.click({});", js_string(selector)),
            },
            Action::Fill { selector, value } => match semantic_locator {
                Some(locator) => format!("await page.{}.fill({});", locator, js_string(value)),
                None => format!(
                    "await page.fill({}, {});",
                    js_string(selector),
                    js_string(value)
                ),
            },
            Action::Wait { ms } => format!("await page.waitForTimeout({});", ms),
            Action::Goto { url } => format!("await page.goto({});", js_string(url)),
            Action::Press { key } => format!("await page.keyboard.press({});", js_string(key)),
            Action::Scroll { target } => match target {
                ScrollTarget::Top => "await page.evaluate(() => window.scrollTo(0, 0));".to_string(),
                ScrollTarget::Bottom => {
                    "await page.evaluate(() => window.scrollTo(0, document.body.scrollHeight));"
                        .to_string()
                }
                ScrollTarget::Selector(selector) => format!(
                    "await page.locator({}).scrollIntoViewIfNeeded();",
                    js_string(selector)
                ),
            },
            Action::Expect { kind, value } => match kind {
                ExpectKind::Text => format!(
                    "await expect(page.locator('body')).toContainText({});",
                    js_string(value)
                ),
                ExpectKind::Selector => format!(
                    "await expect(page.locator({})).toBeVisible();",
                    js_string(value)
                ),
                ExpectKind::Url => format!(
                    "await expect(page).toHaveURL(new RegExp({}));",
                    js_string(&regex_escape(value))
                ),
            },
            Action::Loop { count, action } => format!(
                "for (let i = 0; i < {}; i++) {{\n{}\n}}",
                count,
                indent(&action.to_source_code(None))
            ),
            Action::Condition { selector, action } => format!(
                "if (await page.$({})) {{\n{}\n}}",
                js_string(selector),
                indent(&action.to_source_code(None))
            ),
        }
    }
}

/// Single-quoted JavaScript string literal
pub(crate) fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

// URL expectations check substring containment, so regex metacharacters are literal
fn regex_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(
            c,
            '.' | '*' | '+' | '?' | '^' | '$' | '{' | '}' | '(' | ')' | '|' | '[' | ']' | '\\'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub(crate) fn indent(code: &str) -> String {
    code.lines()
        .map(|line| format!("  {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;
