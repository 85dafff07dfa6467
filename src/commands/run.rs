use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

use scout::executor::CommandOutcome;
use scout::explorer::{ExploreReport, ExploreResult, PageErrors};
use scout::forms::FormResult;
use scout::{
    ActionExecutor, ExploreOptions, HistoryRecorder, OutputFormat, ScoutConfig, ScoutError,
};

use super::utils::{self, BrowserArgs};

/// Extras a run collects on top of actions and expectations
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub explore: ExploreOptions,
    pub screenshot: Option<PathBuf>,
}

#[allow(clippy::too_many_arguments)]
pub async fn handle_run(
    config: &ScoutConfig,
    url: String,
    actions: Vec<String>,
    expectations: Vec<String>,
    session: Option<String>,
    format: OutputFormat,
    options: RunOptions,
    browser_args: BrowserArgs,
) -> Result<()> {
    let actions = utils::expand_commands(actions)?;
    let expectations = utils::expand_commands(expectations)?;
    info!(
        "Running {} action(s) and {} expectation(s) on {}",
        actions.len(),
        expectations.len(),
        url
    );

    let store = config.session_store();
    let browser = utils::open_browser(config, &browser_args).await?;

    // Close the browser whatever happens in between
    let result = async {
        let data = utils::start_session(&browser, &store, session.as_deref(), Some(&url)).await?;
        let mut recorder = HistoryRecorder::from_records(data.history);

        let executor = ActionExecutor::new();
        let report =
            scout::explore(&browser, &executor, &actions, &expectations, options.explore).await?;
        for outcome in &report.actions {
            recorder.record_outcome(outcome);
        }

        if let Some(path) = &options.screenshot {
            let bytes = browser.screenshot(path).await?;
            info!("Saved screenshot ({} bytes) to {}", bytes, path.display());
        }
        if let Some(name) = &session {
            utils::persist_session(&browser, &store, name, recorder.into_records()).await?;
        }
        Ok::<_, anyhow::Error>(report)
    }
    .await;

    if let Err(e) = browser.close().await {
        warn!("Failed to close browser: {:#}", e);
    }
    let report = result?;

    print_report(&url, &report, format)?;

    if !report.expectations.passed() {
        return Err(ScoutError::ExpectationsFailed {
            failed: report.expectations.failed_count(),
            total: report.expectations.checks.len(),
        }
        .into());
    }
    if let Some(failure) = report.monitoring_failure() {
        anyhow::bail!(failure);
    }
    Ok(())
}

fn print_report(url: &str, report: &ExploreReport, format: OutputFormat) -> Result<()> {
    let outcomes = &report.actions;
    let expectations = &report.expectations;
    match format {
        OutputFormat::Json => {
            let mut output = json!({
                "url": url,
                "actions": outcomes,
                "expectations": expectations,
                "passed": expectations.passed(),
                "page": report.page,
            });
            if let Some(forms) = &report.forms {
                output["forms"] = json!(forms);
            }
            if let Some(errors) = &report.errors {
                output["errors"] = json!(errors);
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Simple => {
            for outcome in outcomes {
                print_outcome(outcome);
            }
            if !expectations.checks.is_empty() {
                println!("\nExpectations:");
                for check in &expectations.checks {
                    print_outcome(check);
                }
            }

            print_page(&report.page);
            if let Some(forms) = &report.forms {
                print_forms(forms);
            }
            if let Some(errors) = &report.errors {
                print_errors(errors);
            }

            let failed_actions = outcomes.iter().filter(|o| !o.result.success).count();
            println!("\nRun complete:");
            println!(
                "  ✓ {} of {} actions succeeded",
                outcomes.len() - failed_actions,
                outcomes.len()
            );
            if !expectations.checks.is_empty() {
                println!(
                    "  {} {} of {} expectations passed",
                    if expectations.passed() { "✓" } else { "✗" },
                    expectations.checks.len() - expectations.failed_count(),
                    expectations.checks.len()
                );
            }
        }
    }
    Ok(())
}

fn print_outcome(outcome: &CommandOutcome) {
    if outcome.result.success {
        println!("  ✓ {}", outcome.command);
        if let Some(healed) = &outcome.healed_command {
            println!("      healed as {}", healed);
        }
        if let Some(locator) = &outcome.result.semantic_locator {
            println!("      {}", locator);
        }
    } else {
        println!(
            "  ✗ {}: {}",
            outcome.command,
            outcome.result.error.as_deref().unwrap_or("failed")
        );
    }
}

fn print_page(page: &ExploreResult) {
    println!("\nPage: {} ({})", page.title, page.url);
    println!("Interactive elements ({}):", page.elements.len());
    for element in &page.elements {
        println!("  [{}] {} \"{}\"", element.region, element.tag, element.label());
    }

    let alerts: Vec<_> = page.alerts().collect();
    if !alerts.is_empty() {
        println!("Alerts ({}):", alerts.len());
        for alert in alerts {
            println!("  ! {}", alert.label());
        }
    }
}

fn print_forms(forms: &[FormResult]) {
    if forms.is_empty() {
        println!("\nNo forms found");
        return;
    }
    println!("\nForms ({}):", forms.len());
    for form in forms {
        println!("  {} ({} inputs)", form.id, form.inputs.len());
        for input in &form.inputs {
            let label = if input.label.is_empty() {
                &input.name
            } else {
                &input.label
            };
            println!(
                "    {} [{}] {}{}",
                input.tag,
                input.input_type,
                label,
                if input.required { " *" } else { "" }
            );
        }
    }
}

fn print_errors(errors: &PageErrors) {
    if errors.is_empty() {
        println!("\nNo console or network errors");
        return;
    }
    println!("\nErrors ({}):", errors.len());
    for message in errors.messages() {
        println!("  {}", message);
    }
}
