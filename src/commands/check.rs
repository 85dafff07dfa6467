use anyhow::Result;
use serde_json::json;

use scout::{OutputFormat, parse};

/// Parse commands without running them. Fails with the first parse error.
pub fn handle_check(commands: Vec<String>, format: OutputFormat) -> Result<()> {
    let mut first_error = None;
    let mut results = Vec::with_capacity(commands.len());

    for command in &commands {
        match parse(command) {
            Ok(action) => {
                if let OutputFormat::Simple = format {
                    println!("✓ {}  =>  {}", command, action.to_source_code(None));
                }
                results.push(json!({
                    "command": command,
                    "valid": true,
                    "canonical": action.to_command(),
                    "action": action,
                }));
            }
            Err(e) => {
                if let OutputFormat::Simple = format {
                    println!("✗ {}: {}", command, e);
                }
                results.push(json!({
                    "command": command,
                    "valid": false,
                    "error": e.to_string(),
                }));
                first_error.get_or_insert(e);
            }
        }
    }

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    match first_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
