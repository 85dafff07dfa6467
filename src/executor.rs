//! Batch execution of command strings with selector healing.

use serde::Serialize;
use tracing::{error, info, warn};

use crate::actions::{Action, parse};
use crate::healer::Healer;
use crate::page::Page;
use crate::types::ExecutionResult;

const EXPECT_PREFIX: &str = "expect:";

/// What happened to one command of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutcome {
    /// The command as submitted
    pub command: String,
    pub result: ExecutionResult,
    /// The rewritten command that succeeded after healing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healed_command: Option<String>,
}

impl CommandOutcome {
    fn new(command: &str, result: ExecutionResult) -> Self {
        CommandOutcome {
            command: command.to_string(),
            result,
            healed_command: None,
        }
    }

    /// The command that should be replayed: the healed one when healing succeeded
    pub fn recorded_command(&self) -> &str {
        self.healed_command.as_deref().unwrap_or(&self.command)
    }
}

/// Results of an expectation batch, serialized as the list of checks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExpectationReport {
    pub checks: Vec<CommandOutcome>,
}

impl ExpectationReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| check.result.success)
    }

    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|check| !check.result.success).count()
    }
}

/// Runs command batches in order against a single page
#[derive(Debug, Default)]
pub struct ActionExecutor {
    healer: Healer,
}

impl ActionExecutor {
    pub fn new() -> Self {
        ActionExecutor {
            healer: Healer::new(),
        }
    }

    /// Execute `commands` strictly in order.
    ///
    /// A failing command never stops the batch; its error is reported in its
    /// outcome and execution moves on.
    pub async fn perform_actions<S: AsRef<str>>(
        &self,
        page: &dyn Page,
        commands: &[S],
    ) -> Vec<CommandOutcome> {
        let mut outcomes = Vec::with_capacity(commands.len());
        for command in commands {
            outcomes.push(self.execute_command(page, command.as_ref()).await);
        }
        outcomes
    }

    /// Parse and run one command, healing a failed click or fill once
    pub async fn execute_command(&self, page: &dyn Page, command: &str) -> CommandOutcome {
        let action = match parse(command) {
            Ok(action) => action,
            Err(e) => {
                error!("Error executing {}: {}", command, e);
                return CommandOutcome::new(command, ExecutionResult::failure(e.to_string()));
            }
        };

        let result = action.execute(page).await;
        if result.success || !action.is_healable() {
            if let Some(err) = &result.error {
                error!("Error executing {}: {}", command, err);
            }
            return CommandOutcome::new(command, result);
        }

        let original_error = result.error.clone().unwrap_or_default();
        match self.retry_healed(page, &action).await {
            Some((healed_command, Ok(healed_result))) => {
                info!("Healed command succeeded: {}", healed_command);
                CommandOutcome {
                    command: command.to_string(),
                    result: healed_result,
                    healed_command: Some(healed_command),
                }
            }
            Some((healed_command, Err(healed_error))) => {
                error!("Error executing {}: {}", command, original_error);
                CommandOutcome::new(
                    command,
                    ExecutionResult::failure(format!(
                        "{}; healed command {} also failed: {}",
                        original_error, healed_command, healed_error
                    )),
                )
            }
            None => {
                error!("Error executing {}: {}", command, original_error);
                CommandOutcome::new(command, result)
            }
        }
    }

    /// Retry `action` once against a healed selector. `None` when healing
    /// produced nothing to retry.
    async fn retry_healed(
        &self,
        page: &dyn Page,
        action: &Action,
    ) -> Option<(String, Result<ExecutionResult, String>)> {
        let selector = action.selector()?;
        warn!("Action failed on {}, attempting to heal selector", selector);

        let healed_selector = self.healer.heal(page, selector).await?;
        let healed_command = action.with_selector(healed_selector)?.to_command();

        let healed_action = match parse(&healed_command) {
            Ok(healed_action) => healed_action,
            Err(e) => return Some((healed_command, Err(e.to_string()))),
        };

        let result = healed_action.execute(page).await;
        if result.success {
            Some((healed_command, Ok(result)))
        } else {
            let err = result.error.unwrap_or_default();
            Some((healed_command, Err(err)))
        }
    }

    /// Evaluate expectations in order, adding the `expect:` tag where it is
    /// missing. Every expectation is checked even after one fails.
    pub async fn check_expectations<S: AsRef<str>>(
        &self,
        page: &dyn Page,
        expectations: &[S],
    ) -> ExpectationReport {
        info!("Verifying expectations...");
        let mut report = ExpectationReport::default();
        for expectation in expectations {
            let expectation = expectation.as_ref();
            let command = if expectation.starts_with(EXPECT_PREFIX) {
                expectation.to_string()
            } else {
                format!("{}{}", EXPECT_PREFIX, expectation)
            };

            let result = match parse(&command) {
                Ok(action) => action.execute(page).await,
                Err(e) => {
                    error!("Error checking expectation {}: {}", expectation, e);
                    ExecutionResult::failure(e.to_string())
                }
            };
            report.checks.push(CommandOutcome::new(&command, result));
        }

        if !report.passed() {
            warn!(
                "{} of {} expectations failed",
                report.failed_count(),
                report.checks.len()
            );
        }
        report
    }
}
