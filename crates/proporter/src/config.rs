//! CLI configuration: thin wrapper around `proporter_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--api-url, --insecure, ...), plus
//! per-run Jamf Pro credential collection.

use std::io::IsTerminal;
use std::time::Duration;

use clap::ArgMatches;
use clap::ValueEnum;
use clap::parser::ValueSource;
use secrecy::SecretString;
use tracing::warn;

use proporter_api::TlsMode;
use proporter_core::Credentials;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::commands::util::prompt_err;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use proporter_config::{
    BackendSettings, Config, Defaults, Profile, config_path, load_config_or_default, parse_backend_url,
    save_config,
};

/// Password is read from here or prompted for; there is no flag for it.
pub const PASSWORD_ENV: &str = "PROPORTER_JAMF_PASSWORD";

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Take `--output` and `--color` from the config's `[defaults]` when
/// neither a flag nor the environment set them.
pub fn apply_display_defaults(global: &mut GlobalOpts, matches: &ArgMatches, defaults: &Defaults) {
    if unset(matches, "output") {
        match OutputFormat::from_str(&defaults.output, true) {
            Ok(format) => global.output = format,
            Err(_) => warn!(value = %defaults.output, "ignoring unknown default output format"),
        }
    }
    if unset(matches, "color") {
        match ColorMode::from_str(&defaults.color, true) {
            Ok(mode) => global.color = mode,
            Err(_) => warn!(value = %defaults.color, "ignoring unknown default color mode"),
        }
    }
}

fn unset(matches: &ArgMatches, id: &str) -> bool {
    matches!(
        matches.value_source(id),
        None | Some(ValueSource::DefaultValue)
    )
}

/// Merge config file, profile and flag overrides into backend settings.
///
/// An explicitly requested `--profile` must exist; the implicit default
/// profile may be absent.
pub fn resolve_backend(global: &GlobalOpts, config: &Config) -> Result<BackendSettings, CliError> {
    let profile_name = active_profile_name(global, config);
    if global.profile.is_some() && config.profile(&profile_name).is_none() {
        let mut names: Vec<_> = config.profiles.keys().cloned().collect();
        names.sort();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if names.is_empty() {
                "(none)".into()
            } else {
                names.join(", ")
            },
        });
    }

    let mut settings = config.backend_settings(&profile_name)?;

    // Flag / env overrides
    if let Some(ref raw) = global.api_url {
        settings.base_url = parse_backend_url(raw)?;
    }
    if global.insecure {
        settings.transport.tls = TlsMode::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        settings.transport.timeout = Duration::from_secs(secs);
    }

    tracing::debug!(
        profile = %profile_name,
        backend = %settings.base_url,
        timeout_secs = settings.transport.timeout.as_secs(),
        "resolved backend"
    );
    Ok(settings)
}

/// Collect Jamf Pro credentials for this run.
///
/// Flags and environment first; anything missing is prompted for when
/// stdin is a terminal, otherwise it is an error. Nothing is persisted.
pub fn resolve_credentials(global: &GlobalOpts) -> Result<Credentials, CliError> {
    let interactive = std::io::stdin().is_terminal();

    let url = match global.jamf_url.clone() {
        Some(url) => url,
        None if interactive => dialoguer::Input::<String>::new()
            .with_prompt("Jamf Pro URL")
            .interact_text()
            .map_err(prompt_err)?,
        None => {
            return Err(CliError::NoCredentials {
                missing: "URL (--jamf-url)".into(),
            });
        }
    };

    let username = match global.jamf_username.clone() {
        Some(username) => username,
        None if interactive => dialoguer::Input::<String>::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(prompt_err)?,
        None => {
            return Err(CliError::NoCredentials {
                missing: "username (--jamf-username)".into(),
            });
        }
    };

    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => password,
        _ if interactive => rpassword::prompt_password("Password: ")?,
        _ => {
            return Err(CliError::NoCredentials {
                missing: format!("password ({PASSWORD_ENV})"),
            });
        }
    };

    let credentials = Credentials::new(&url, &username, SecretString::from(password));
    credentials.validate()?;
    Ok(credentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::{CommandFactory, FromArgMatches};

    use super::*;
    use crate::cli::Cli;

    fn parse(args: &[&str]) -> (Cli, ArgMatches) {
        let matches = Cli::command().try_get_matches_from(args).unwrap();
        (Cli::from_arg_matches(&matches).unwrap(), matches)
    }

    fn defaults(output: &str, color: &str) -> Defaults {
        Defaults {
            output: output.into(),
            color: color.into(),
            ..Defaults::default()
        }
    }

    #[test]
    fn config_defaults_fill_unset_display_flags() {
        let (mut cli, matches) = parse(&["proporter", "types"]);
        apply_display_defaults(&mut cli.global, &matches, &defaults("json-compact", "never"));
        assert!(matches!(cli.global.output, OutputFormat::JsonCompact));
        assert!(matches!(cli.global.color, ColorMode::Never));
    }

    #[test]
    fn explicit_flags_beat_config_defaults() {
        let (mut cli, matches) = parse(&["proporter", "types", "-o", "yaml", "--color", "always"]);
        apply_display_defaults(&mut cli.global, &matches, &defaults("json", "never"));
        assert!(matches!(cli.global.output, OutputFormat::Yaml));
        assert!(matches!(cli.global.color, ColorMode::Always));
    }

    #[test]
    fn unknown_config_default_is_ignored() {
        let (mut cli, matches) = parse(&["proporter", "types"]);
        apply_display_defaults(&mut cli.global, &matches, &defaults("xml", "auto"));
        assert!(matches!(cli.global.output, OutputFormat::Table));
    }
}
