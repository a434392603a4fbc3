use serde_json::{Map, Value};
use toolhub::prelude::BaseToolImpl;
use toolhub::ToolHub;

use crate::error::{CliError, CliResult, IntoCliResult};
use crate::exit_codes::{EXIT_ERROR, EXIT_WARNING};

/// Parse the JSON argument string of `toolhub call`
///
/// No arguments means an empty object. Anything but an object is rejected.
pub fn parse_arguments(raw: Option<&str>) -> CliResult<Map<String, Value>> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(Map::new());
    };

    match serde_json::from_str::<Value>(raw).cli_validation_error()? {
        Value::Object(arguments) => Ok(arguments),
        other => Err(CliError::new(
            format!("Tool arguments must be a JSON object, got: {}", other),
            EXIT_ERROR,
        )),
    }
}

/// Call one tool and print the text of its result to stdout
///
/// A result flagged as an error is printed to stderr and exits with 1.
pub async fn run_call_command(hub: &ToolHub, tool: &str, arguments: Option<&str>) -> CliResult<()> {
    let arguments = parse_arguments(arguments)?;
    tracing::debug!("Calling '{}' with {} argument(s)", tool, arguments.len());

    let result = hub.call(tool, arguments).await?;
    let text = BaseToolImpl::extract_text(&result);

    if BaseToolImpl::is_error(&result) {
        return Err(CliError::new(text, EXIT_WARNING));
    }

    println!("{}", text);
    Ok(())
}
