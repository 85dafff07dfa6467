//! Interactive command loop.

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::codegen::CodeGenerator;
use crate::executor::ActionExecutor;
use crate::history::HistoryRecorder;
use crate::page::Page;

pub const PROMPT: &str = "scout> ";

const HELP: &str = "
Available commands:
  click:<selector>         Click an element
  fill:<selector>:<val>    Fill an input
  press:<key>              Press a key
  scroll:<target>          Scroll to element or 'top'/'bottom'
  wait:<ms>                Wait for X milliseconds
  goto:<url>               Navigate to URL
  expect:<type>:<val>      Verify state (text/selector/url)
  loop:<n>:<command>       Repeat a command up to n times
  if:<selector>:<command>  Run a command only if the selector matches
  history                  Show recorded commands
  codegen                  Print a Playwright test for the recorded commands
  prompt                   Print an authoring prompt for the recorded commands
  exit                     Exit the REPL
";

/// Reads commands line by line, runs them against one page and records the
/// ones that succeed
pub struct Repl<'a> {
    page: &'a dyn Page,
    executor: ActionExecutor,
    recorder: HistoryRecorder,
}

impl<'a> Repl<'a> {
    pub fn new(page: &'a dyn Page, recorder: HistoryRecorder) -> Self {
        Repl {
            page,
            executor: ActionExecutor::new(),
            recorder,
        }
    }

    pub fn recorder(&self) -> &HistoryRecorder {
        &self.recorder
    }

    pub fn into_recorder(self) -> HistoryRecorder {
        self.recorder
    }

    /// Run until `exit` or end of input
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        writeln!(out, "Starting Scout REPL...")?;
        writeln!(out, "Type \"help\" for commands, \"exit\" to quit.")?;

        let mut lines = input.lines();
        loop {
            write!(out, "{}", PROMPT)?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(out)?;
                break;
            };

            match line.trim() {
                "" => continue,
                "exit" | "quit" => break,
                "help" => writeln!(out, "{}", HELP)?,
                "history" => self.print_history(out)?,
                "codegen" => writeln!(out, "{}", CodeGenerator::generate(self.recorder.records()))?,
                "prompt" => write!(
                    out,
                    "{}",
                    CodeGenerator::generate_prompt(self.recorder.records())
                )?,
                command => self.execute(command, out).await?,
            }
        }

        writeln!(out, "Exiting REPL.")?;
        Ok(())
    }

    async fn execute<W: Write>(&mut self, command: &str, out: &mut W) -> Result<()> {
        let outcome = self.executor.execute_command(self.page, command).await;

        if outcome.result.success {
            writeln!(out, "✅ Success")?;
            if let Some(healed) = &outcome.healed_command {
                writeln!(out, "   Healed: {}", healed)?;
            }
            if let Some(locator) = &outcome.result.semantic_locator {
                writeln!(out, "   Semantic Locator: {}", locator)?;
            }
            self.recorder.record_outcome(&outcome);
            debug!("History now has {} commands", self.recorder.len());
        } else {
            writeln!(
                out,
                "❌ Error: {}",
                outcome.result.error.as_deref().unwrap_or("unknown error")
            )?;
        }
        Ok(())
    }

    fn print_history<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.recorder.is_empty() {
            writeln!(out, "No commands recorded yet")?;
            return Ok(());
        }
        for (i, record) in self.recorder.records().iter().enumerate() {
            match &record.semantic_locator {
                Some(locator) => writeln!(out, "{:>3}. {}  [{}]", i + 1, record.command, locator)?,
                None => writeln!(out, "{:>3}. {}", i + 1, record.command)?,
            }
        }
        Ok(())
    }
}
