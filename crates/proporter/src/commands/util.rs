//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use proporter_config::BackendSettings;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NotInteractive {
            command: "confirmation (pass --yes)".into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)?;
    Ok(confirmed)
}

/// Map a dialoguer failure (closed stdin, ctrl-c) to a CLI error.
pub fn prompt_err(err: dialoguer::Error) -> CliError {
    CliError::Validation {
        field: "prompt".into(),
        reason: err.to_string(),
    }
}

/// Steady-ticking spinner on stderr; hidden in quiet mode or when stderr
/// is not a terminal.
pub fn spinner(message: impl Into<String>, quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    let message: String = message.into();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// `--out-dir` when given, else the profile's output directory.
pub fn output_dir(flag: Option<&Path>, settings: &BackendSettings) -> PathBuf {
    flag.map_or_else(|| settings.output_dir.clone(), Path::to_path_buf)
}

/// Human-readable byte count.
pub fn human_size(len: usize) -> String {
    bytesize::ByteSize::b(u64::try_from(len).unwrap_or(u64::MAX)).to_string()
}
