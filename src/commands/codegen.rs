use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};

use scout::{CodeGenerator, ScoutConfig};

pub fn handle_codegen(
    config: &ScoutConfig,
    session: String,
    prompt: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let store = config.session_store();
    let path = store.resolve(&session);
    if !path.exists() {
        anyhow::bail!("Session '{}' does not exist", session);
    }

    let data = store.load(&session);
    if data.history.is_empty() {
        warn!("Session '{}' has no recorded commands", session);
    }

    let generated = if prompt {
        CodeGenerator::generate_prompt(&data.history)
    } else {
        CodeGenerator::generate(&data.history)
    };

    match output {
        Some(output) => {
            std::fs::write(&output, format!("{}\n", generated.trim_end()))
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(
                "Wrote {} commands from '{}' to {}",
                data.history.len(),
                session,
                output.display()
            );
            println!("Generated {}", output.display());
        }
        None => println!("{}", generated.trim_end()),
    }
    Ok(())
}
