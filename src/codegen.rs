//! Turns a recorded history back into test source or an authoring prompt.

use crate::actions::{Action, indent, parse};
use crate::types::ActionRecord;

const HEADER: &str = "import { test, expect } from '@playwright/test';";
const TEST_OPEN: &str = "test('generated test', async ({ page }) => {";
const TEST_CLOSE: &str = "});";

/// A history entry after parsing: a node, or the reason it could not be parsed
struct Step<'a> {
    record: &'a ActionRecord,
    parsed: Result<Action, String>,
}

pub struct CodeGenerator;

impl CodeGenerator {
    /// Render `history` as a Playwright test.
    ///
    /// Click and fill statements use the recorded semantic locator when one
    /// exists. Commands that no longer parse become comments.
    pub fn generate(history: &[ActionRecord]) -> String {
        let mut lines = vec![HEADER.to_string(), String::new(), TEST_OPEN.to_string()];

        for step in steps(history) {
            let statement = match &step.parsed {
                Ok(action) => action.to_source_code(step.record.semantic_locator.as_deref()),
                Err(e) => format!(
                    "// Failed to parse command '{}': {}",
                    single_line(&step.record.command),
                    single_line(e)
                ),
            };
            lines.push(indent(&statement));
        }

        lines.push(TEST_CLOSE.to_string());
        lines.join("\n")
    }

    /// Build a prompt asking a language model to write a test suite from `history`
    pub fn generate_prompt(history: &[ActionRecord]) -> String {
        let mut prompt = String::from(
            "You are an expert QA automation engineer. Write a Playwright test suite in \
             TypeScript that reproduces the exploratory session below.\n\n\
             Guidelines:\n\
             - Prefer the semantic locators listed for a step over raw CSS selectors.\n\
             - Group related steps into focused tests and add meaningful assertions.\n\
             - Use web-first assertions (`expect(...)`) instead of fixed waits where possible.\n\n\
             Recorded steps (type:param[:param]):\n",
        );

        for (i, step) in steps(history).iter().enumerate() {
            prompt.push_str(&format!("{}. {}", i + 1, single_line(&step.record.command)));
            if let Some(locator) = &step.record.semantic_locator {
                prompt.push_str(&format!(" (semantic locator: {})", locator));
            }
            prompt.push('\n');
        }

        if history.is_empty() {
            prompt.push_str("(no steps recorded)\n");
        }

        prompt.push_str("\nReturn only the TypeScript source.\n");
        prompt
    }
}

/// Parse every record, dropping a `goto` that repeats the immediately
/// preceding `goto` to the same URL
fn steps(history: &[ActionRecord]) -> Vec<Step<'_>> {
    let mut steps = Vec::with_capacity(history.len());
    let mut last_goto: Option<String> = None;

    for record in history {
        let parsed = parse(&record.command).map_err(|e| e.to_string());
        match &parsed {
            Ok(Action::Goto { url }) => {
                if last_goto.as_deref() == Some(url.as_str()) {
                    continue;
                }
                last_goto = Some(url.clone());
            }
            _ => last_goto = None,
        }
        steps.push(Step { record, parsed });
    }
    steps
}

fn single_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

#[cfg(test)]
#[path = "codegen_test.rs"]
mod codegen_test;
