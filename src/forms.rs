//! Form structure analysis.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::page::Page;

/// Shown instead of the value of a password field
const MASKED_VALUE: &str = "********";

/// Lists visible fields per `<form>`, plus fields outside any form
pub const FORMS_SCRIPT: &str = r#"
    const isVisible = el => {
        const style = window.getComputedStyle(el);
        return style.display !== 'none' && style.visibility !== 'hidden'
            && el.offsetWidth > 0 && el.offsetHeight > 0 && el.type !== 'hidden';
    };
    const fieldSelector = 'input, select, textarea, button';

    const describe = el => {
        let label = '';
        if (el.getAttribute('aria-label')) {
            label = el.getAttribute('aria-label');
        } else if (el.getAttribute('aria-labelledby')) {
            label = el.getAttribute('aria-labelledby').split(' ')
                .map(id => (document.getElementById(id) || {}).textContent || '')
                .join(' ');
        } else if (el.id) {
            const labelEl = document.querySelector('label[for="' + CSS.escape(el.id) + '"]');
            if (labelEl) label = labelEl.textContent || '';
        }
        if (!label) {
            const parentLabel = el.closest('label');
            if (parentLabel) label = parentLabel.textContent || '';
        }
        if (!label && el.placeholder) label = el.placeholder;
        if (!label && (el.tagName === 'BUTTON' || el.type === 'submit' || el.type === 'button')) {
            label = el.textContent || el.value || '';
        }
        return {
            tag: el.tagName.toLowerCase(),
            type: el.type || el.tagName.toLowerCase(),
            name: el.name || '',
            id: el.id || '',
            label: (label || '').trim().replace(/\s+/g, ' '),
            required: !!el.required,
            value: typeof el.value === 'string' ? el.value : ''
        };
    };

    const results = [];
    Array.from(document.querySelectorAll('form')).forEach((form, index) => {
        const inputs = Array.from(form.querySelectorAll(fieldSelector)).filter(isVisible);
        if (inputs.length > 0) {
            results.push({
                type: 'form',
                id: form.id || ('form-' + index),
                name: form.getAttribute('name') || '',
                inputs: inputs.map(describe)
            });
        }
    });

    const standalone = Array.from(document.querySelectorAll(fieldSelector))
        .filter(el => isVisible(el) && !el.closest('form'));
    if (standalone.length > 0) {
        results.push({
            type: 'standalone',
            id: 'standalone-inputs',
            name: 'Standalone Inputs',
            inputs: standalone.map(describe)
        });
    }
    return results;
"#;

/// Whether fields belong to a `<form>` or float outside one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    Form,
    Standalone,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInput {
    pub tag: String,
    /// Input type, or the tag name for select, textarea and button
    #[serde(rename = "type")]
    pub input_type: String,
    pub name: String,
    pub id: String,
    /// Accessible label, whitespace collapsed
    pub label: String,
    pub required: bool,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormResult {
    #[serde(rename = "type")]
    pub kind: FormKind,
    /// The form's id, or `form-<index>` when it has none
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<FormInput>,
}

impl FormResult {
    pub fn required_inputs(&self) -> impl Iterator<Item = &FormInput> {
        self.inputs.iter().filter(|input| input.required)
    }
}

/// Describe the forms on the current page. Password values are masked.
pub async fn analyze_forms(page: &dyn Page) -> Result<Vec<FormResult>> {
    let value = page
        .evaluate(FORMS_SCRIPT, vec![])
        .await
        .context("Failed to analyze forms")?;
    if value.is_null() {
        return Ok(Vec::new());
    }

    let mut forms: Vec<FormResult> =
        serde_json::from_value(value).context("Unexpected form analysis result")?;
    for input in forms.iter_mut().flat_map(|form| form.inputs.iter_mut()) {
        if input.input_type == "password" && !input.value.is_empty() {
            input.value = MASKED_VALUE.to_string();
        }
    }
    debug!("Analyzed {} forms", forms.len());
    Ok(forms)
}

#[cfg(test)]
#[path = "forms_test.rs"]
mod forms_test;
