//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::sync::Arc;

use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

use opsdeck_core::{CoreError, Entity, Reachable, Repository};

use crate::error::CliError;

/// Find a record by id, falling back to an exact name match.
pub fn find_entity<T: Entity>(
    repo: &impl Repository<T>,
    identifier: &str,
    name_of: impl Fn(&T) -> &str,
) -> Result<Arc<T>, CliError> {
    if let Some(found) = repo.get(&identifier.into()) {
        return Ok(found);
    }
    repo.list()
        .iter()
        .find(|e| name_of(e) == identifier)
        .cloned()
        .ok_or_else(|| {
            CoreError::NotFound {
                entity_type: T::KIND.into(),
                identifier: identifier.into(),
            }
            .into()
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
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Use the flag value if given, otherwise prompt on a terminal.
pub fn secret_or_prompt(
    value: Option<String>,
    prompt: &str,
) -> Result<Option<SecretString>, CliError> {
    if let Some(value) = value {
        return Ok(Some(SecretString::from(value)));
    }
    if !std::io::stdin().is_terminal() {
        return Ok(None);
    }
    let entered = rpassword::prompt_password(prompt)?;
    Ok((!entered.is_empty()).then(|| SecretString::from(entered)))
}

/// A token that fires on Ctrl-C.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupted");
            child.cancel();
        }
    });
    token
}

pub fn report_reachable(ok: &Reachable, quiet: bool) {
    if !quiet {
        eprintln!("✓ {} reachable in {} ms", ok.target, ok.latency.as_millis());
    }
}

pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

pub fn or_dash(value: Option<&str>) -> String {
    value.map_or_else(|| "-".into(), str::to_owned)
}
