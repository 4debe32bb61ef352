//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use birdwatch_core::{BirdRecord, QueryResult, Session};

use crate::error::CliError;

/// Settle a query into its data, or the error it cached.
pub fn settled<T>(result: QueryResult<T>) -> Result<Arc<T>, CliError> {
    result.into_result().map_err(CliError::from)
}

/// Every bird, straight from the session cache.
pub async fn all_birds(session: &Session) -> Result<Arc<Vec<BirdRecord>>, CliError> {
    settled(session.all_birds().await)
}

/// Resolve a bird by its ID.
pub async fn find_bird(session: &Session, id: &str) -> Result<BirdRecord, CliError> {
    // Ids are typed on the command line, so match on the printed form.
    all_birds(session)
        .await?
        .iter()
        .find(|b| b.id.to_string() == id)
        .cloned()
        .ok_or_else(|| CliError::NotFound {
            resource_type: "bird".into(),
            identifier: id.into(),
            list_command: "birds list".into(),
        })
}

/// Refuse admin-only actions for callers the gate has not admitted.
pub fn require_admin(session: &Session, action: &str) -> Result<(), CliError> {
    if session.is_admin() {
        return Ok(());
    }
    tracing::debug!(gate = %session.gate_state(), action, "admin action refused");
    Err(CliError::NotAdmin {
        action: action.into(),
    })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}
