use thiserror::Error;

/// Top-level error type for the `proporter-api` crate.
///
/// Two tiers share this enum. [`Rejected`](Self::Rejected) is a domain
/// failure: the backend answered `success: false` and the caller should show
/// it inline with a retry. Everything else is a transport or validation
/// failure that the caller has to turn into a user-facing message.
#[derive(Debug, Error)]
pub enum Error {
    // ── Credentials ─────────────────────────────────────────────────
    /// Credentials failed local validation. No request was sent.
    #[error("Invalid credentials: {reason}")]
    InvalidCredentials { reason: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// Non-2xx response. `message` comes from the `{detail|message}` body
    /// when it parses, otherwise from the status line.
    #[error("Backend error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    /// The backend answered with `success: false`.
    #[error("{message}")]
    Rejected { message: String },

    // ── Export ──────────────────────────────────────────────────────
    /// Bulk export called with nothing to export. No request was sent.
    #[error("Nothing selected for export")]
    EmptySelection,

    /// A 2xx export response declared a content type that is not an archive.
    #[error("Expected an archive from bulk export, got content type '{content_type}'")]
    UnexpectedContentType { content_type: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
