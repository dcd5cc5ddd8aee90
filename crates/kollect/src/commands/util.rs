//! Shared helpers for command handlers.

use std::io::IsTerminal;

use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

fn interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !interactive() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Use the flag value, or prompt for it when running in a terminal.
pub fn text_or_prompt(value: Option<String>, label: &str, flag: &str) -> Result<String, CliError> {
    if let Some(value) = value {
        return Ok(value);
    }
    if !interactive() {
        return Err(CliError::MissingInput {
            field: label.into(),
            flag: flag.into(),
        });
    }
    Input::new()
        .with_prompt(label)
        .interact_text()
        .map_err(prompt_err)
}

/// Like [`text_or_prompt`], without echoing the typed value.
pub fn secret_or_prompt(
    value: Option<String>,
    label: &str,
    flag: &str,
) -> Result<SecretString, CliError> {
    if let Some(value) = value {
        return Ok(SecretString::from(value));
    }
    if !interactive() {
        return Err(CliError::MissingInput {
            field: label.into(),
            flag: flag.into(),
        });
    }
    let secret = rpassword::prompt_password(format!("{label}: ")).map_err(prompt_err)?;
    Ok(SecretString::from(secret))
}

/// Spinner on stderr for table output; hidden otherwise.
pub fn spinner(global: &GlobalOpts, message: &'static str) -> ProgressBar {
    if global.quiet || !matches!(global.output, OutputFormat::Table) {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::default_spinner());
    bar.set_message(message);
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    bar
}
