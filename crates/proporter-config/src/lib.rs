//! Shared configuration for the proporter CLI.
//!
//! TOML profiles describing which export backend to talk to and how.
//! Jamf Pro credentials are deliberately absent: they are supplied per
//! session and never written here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use proporter_api::{DEFAULT_BASE_URL, TlsMode, TransportConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    120
}

/// A named backend profile. Every field is optional; unset fields fall
/// back to [`Defaults`] or built-in values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Export backend base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// PEM file with an extra CA for the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Timeout override in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Where exported archives and HCL files are written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("app", "jamfaform", "proporter").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("proporter");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full config from the canonical file plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` plus environment. A missing file is not an
/// error; defaults apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PROPORTER_").only(&["default_profile"]));

    Ok(figment.extract()?)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to the canonical path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Backend settings ────────────────────────────────────────────────

/// Everything needed to build a backend client, after profile and
/// defaults are merged.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: Url,
    pub transport: TransportConfig,
    pub output_dir: PathBuf,
}

impl Config {
    /// Look up a profile by name. `None` if the config file does not
    /// define it; callers decide whether that is an error.
    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// Resolve backend settings for `profile_name`.
    ///
    /// The profile may be absent, in which case built-in defaults apply.
    pub fn backend_settings(&self, profile_name: &str) -> Result<BackendSettings, ConfigError> {
        let empty = Profile::default();
        let profile = self.profile(profile_name).unwrap_or(&empty);
        resolve_backend(profile, &self.defaults)
    }
}

/// Merge a profile with global defaults into [`BackendSettings`].
pub fn resolve_backend(profile: &Profile, defaults: &Defaults) -> Result<BackendSettings, ConfigError> {
    let raw = profile.api_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    let base_url = parse_backend_url(raw)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(BackendSettings {
        base_url,
        transport: TransportConfig { tls, timeout },
        output_dir: profile
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(".")),
    })
}

/// Parse a backend URL, requiring an http(s) scheme.
pub fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::Validation {
        field: "api_url".into(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_profile_uses_production_backend() {
        let settings = Config::default().backend_settings("default").unwrap();
        assert_eq!(settings.base_url.as_str(), "https://jamfaform-production.up.railway.app/");
        assert_eq!(settings.transport.timeout, Duration::from_secs(120));
        assert_eq!(settings.transport.tls, TlsMode::System);
    }

    #[test]
    fn profile_overrides_defaults() {
        let profile = Profile {
            api_url: Some("http://localhost:8000".into()),
            insecure: Some(true),
            timeout: Some(15),
            output_dir: Some("exports".into()),
            ..Profile::default()
        };
        let settings = resolve_backend(&profile, &Defaults::default()).unwrap();
        assert_eq!(settings.base_url.host_str(), Some("localhost"));
        assert_eq!(settings.transport.tls, TlsMode::DangerAcceptInvalid);
        assert_eq!(settings.transport.timeout, Duration::from_secs(15));
        assert_eq!(settings.output_dir, PathBuf::from("exports"));
    }

    #[test]
    fn rejects_non_http_backend() {
        assert!(parse_backend_url("ftp://example.com").is_err());
        assert!(parse_backend_url("not a url").is_err());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "local".into(),
            Profile {
                api_url: Some("http://localhost:8000".into()),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(
            loaded.profile("local").and_then(|p| p.api_url.as_deref()),
            Some("http://localhost:8000")
        );
        assert_eq!(loaded.defaults.timeout, 120);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert!(loaded.profiles.is_empty());
    }
}
