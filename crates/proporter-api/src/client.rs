// Backend HTTP client
//
// Joins paths onto the configured base URL, encodes JSON bodies and maps
// non-2xx answers to `Error::Http`. The endpoints themselves live in
// `resources`, `export` and `system`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::ErrorBody;
use crate::transport::TransportConfig;

/// Production backend used when no profile or flag overrides it.
pub const DEFAULT_BASE_URL: &str = "https://jamfaform-production.up.railway.app";

/// Raw HTTP client for the export backend.
///
/// Holds no session state: credentials travel with each call and there is
/// no retry. A failed attempt surfaces immediately; retry policy belongs
/// to the caller. Cheap to clone (the inner `reqwest::Client` is an `Arc`).
#[derive(Debug, Clone)]
pub struct ProporterClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ProporterClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a backend path, e.g. `api/jamf/resources`.
    ///
    /// Plain concatenation rather than `Url::join` so a base URL with a
    /// path prefix (reverse proxies) keeps its prefix.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// POST a JSON body and decode a JSON response.
    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);

        let resp = self.http.post(url).json(body).send().await?;
        decode_json(resp).await
    }

    /// GET and decode a JSON response.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        decode_json(resp).await
    }
}

/// Turn a non-2xx response into [`Error::Http`].
///
/// Tries the `{detail|message}` body first and falls back to the status
/// line when the body is empty or not JSON.
pub(crate) async fn error_from_response(resp: reqwest::Response) -> Error {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    trace!(status = status.as_u16(), body_len = body.len(), "error response");

    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(ErrorBody::into_message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status_line(status));

    Error::Http {
        status: status.as_u16(),
        message,
    }
}

fn status_line(status: reqwest::StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("HTTP error! status: {} {reason}", status.as_u16()),
        None => format!("HTTP error! status: {}", status.as_u16()),
    }
}

async fn decode_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    if !resp.status().is_success() {
        return Err(error_from_response(resp).await);
    }

    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.clone(),
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let client = ProporterClient::with_client(
            reqwest::Client::new(),
            Url::parse("https://proxy.example/backend/").unwrap(),
        );
        assert_eq!(
            client.endpoint("/api/jamf/resources").unwrap().as_str(),
            "https://proxy.example/backend/api/jamf/resources"
        );
    }

    #[test]
    fn status_line_includes_reason() {
        assert_eq!(
            status_line(reqwest::StatusCode::BAD_GATEWAY),
            "HTTP error! status: 502 Bad Gateway"
        );
    }
}
