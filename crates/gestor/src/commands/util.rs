//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use gestor_core::Record;

use crate::cli::PayloadArgs;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so `--yes` is required.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Turn `--data` / `--from-file` into a record.
pub fn read_payload(payload: &PayloadArgs) -> Result<Record, CliError> {
    let (field, value) = match (&payload.data, &payload.from_file) {
        (Some(data), _) => (
            "data",
            serde_json::from_str(data).map_err(|e| CliError::Validation {
                field: "data".into(),
                reason: format!("invalid JSON: {e}"),
            })?,
        ),
        (None, Some(path)) => ("from-file", read_json_file(path)?),
        (None, None) => {
            return Err(CliError::Validation {
                field: "data".into(),
                reason: "pass --data or --from-file".into(),
            });
        }
    };
    Record::try_from(value).map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "expected a JSON object".into(),
    })
}
