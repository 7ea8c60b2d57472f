// ── Core error types ──
//
// Errors surfaced to the CLI and the orchestrator views. HTTP details are
// folded into a small set of variants; `Rejected` stays distinct because
// views show it inline with a retry instead of failing the command.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session ──────────────────────────────────────────────────────
    #[error("Not connected: supply Jamf Pro credentials first")]
    NotConnected,

    #[error("Invalid credentials: {reason}")]
    InvalidCredentials { reason: String },

    // ── Backend ──────────────────────────────────────────────────────
    /// The backend answered `success: false`.
    #[error("{message}")]
    Rejected { message: String },

    #[error("Cannot reach backend: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Backend error: {message}")]
    Api {
        message: String,
        /// HTTP status code, when there was one.
        status: Option<u16>,
    },

    // ── Export ───────────────────────────────────────────────────────
    #[error("No resources selected for export")]
    EmptySelection,

    #[error("Backend returned '{content_type}' instead of an archive")]
    NotAnArchive { content_type: String },

    #[error("A scan is still running")]
    ScanInProgress,

    #[error("An export is already downloading")]
    ExportInProgress,

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Lookup ───────────────────────────────────────────────────────
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Invalid selection key '{0}', expected <type>:<id>")]
    InvalidSelectionKey(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<proporter_api::Error> for CoreError {
    fn from(err: proporter_api::Error) -> Self {
        use proporter_api::Error as Api;

        if err.is_timeout() {
            return Self::Timeout;
        }
        match err {
            Api::InvalidCredentials { reason } => Self::InvalidCredentials { reason },
            Api::Rejected { message } => Self::Rejected { message },
            Api::EmptySelection => Self::EmptySelection,
            Api::UnexpectedContentType { content_type } => Self::NotAnArchive { content_type },
            Api::Transport(ref e) if e.is_connect() => Self::ConnectionFailed {
                reason: e.to_string(),
            },
            Api::Http { status, message } => Self::Api {
                message,
                status: Some(status),
            },
            other => Self::Api {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}
