//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help.

use miette::Diagnostic;
use thiserror::Error;

use proporter_config::ConfigError;
use proporter_core::{CoreError, classify};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the export backend")]
    #[diagnostic(
        code(proporter::connection_failed),
        help(
            "{reason}\n\
             Check the backend with: proporter health"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Export backend at {url} is offline")]
    #[diagnostic(
        code(proporter::backend_offline),
        help("Try again later, or point at another backend with --api-url.")
    )]
    BackendOffline { url: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(code(proporter::auth_failed), help("{hint}"))]
    AuthFailed { message: String, hint: String },

    #[error("Invalid Jamf Pro credentials: {reason}")]
    #[diagnostic(
        code(proporter::invalid_credentials),
        help("The Jamf Pro URL must start with http:// or https://.")
    )]
    InvalidCredentials { reason: String },

    #[error("Missing Jamf Pro {missing}")]
    #[diagnostic(
        code(proporter::no_credentials),
        help(
            "Pass --jamf-url and --jamf-username and set PROPORTER_JAMF_PASSWORD,\n\
             or run from an interactive terminal to be prompted."
        )
    )]
    NoCredentials { missing: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(proporter::not_found),
        help("Run: proporter {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Backend ──────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(proporter::rejected), help("{hint}"))]
    Rejected { message: String, hint: String },

    #[error("Backend error: {message}")]
    #[diagnostic(code(proporter::api_error), help("{hint}"))]
    ApiError { message: String, hint: String },

    #[error("Backend returned '{content_type}' instead of an archive")]
    #[diagnostic(
        code(proporter::not_an_archive),
        help("The backend may be misconfigured or behind a login page. Nothing was saved.")
    )]
    NotAnArchive { content_type: String },

    // ── Export ───────────────────────────────────────────────────────
    #[error("Nothing selected for export")]
    #[diagnostic(
        code(proporter::empty_selection),
        help("Pass at least one <type>:<id>, or use: proporter scan --export")
    )]
    EmptySelection,

    #[error("{message}")]
    #[diagnostic(code(proporter::busy))]
    Busy { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(proporter::validation))]
    Validation { field: String, reason: String },

    #[error("'{command}' needs an interactive terminal")]
    #[diagnostic(
        code(proporter::not_interactive),
        help("Use the one-shot commands (list, show, export, scan) in scripts.")
    )]
    NotInteractive { command: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(proporter::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: proporter config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(proporter::config))]
    Config(Box<ConfigError>),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out")]
    #[diagnostic(
        code(proporter::timeout),
        help("Large instances take a while. Increase the limit with --timeout.")
    )]
    Timeout,

    // ── IO ───────────────────────────────────────────────────────────
    #[error("Failed to write {path}")]
    #[diagnostic(code(proporter::write_failed))]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::BackendOffline { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. }
            | Self::InvalidCredentials { .. }
            | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::EmptySelection | Self::NotInteractive { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<proporter_api::Error> for CliError {
    fn from(err: proporter_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotConnected => CliError::NoCredentials {
                missing: "credentials".into(),
            },
            CoreError::InvalidCredentials { reason } => CliError::InvalidCredentials { reason },
            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },
            CoreError::Timeout => CliError::Timeout,

            CoreError::Rejected { message } => {
                let kind = classify(&message);
                let hint = kind.hint().to_owned();
                if kind == proporter_core::FailureKind::Authentication {
                    CliError::AuthFailed { message, hint }
                } else {
                    CliError::Rejected { message, hint }
                }
            }

            CoreError::Api {
                message,
                status: Some(401),
            } => CliError::AuthFailed {
                hint: classify("401").hint().to_owned(),
                message,
            },
            CoreError::Api { message, .. } => CliError::ApiError {
                hint: classify(&message).hint().to_owned(),
                message,
            },

            CoreError::EmptySelection => CliError::EmptySelection,
            CoreError::NotAnArchive { content_type } => CliError::NotAnArchive { content_type },
            err @ (CoreError::ScanInProgress | CoreError::ExportInProgress) => CliError::Busy {
                message: err.to_string(),
            },
            CoreError::Io { path, source } => CliError::WriteFailed {
                path: path.display().to_string(),
                source,
            },

            CoreError::UnknownResourceType(identifier) => CliError::NotFound {
                resource_type: "resource type".into(),
                identifier,
                list_command: "types".into(),
            },
            CoreError::InvalidSelectionKey(value) => CliError::Validation {
                field: "resource".into(),
                reason: format!("'{value}' is not <type>:<id>"),
            },
        }
    }
}
