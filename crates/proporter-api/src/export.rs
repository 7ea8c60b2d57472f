// Bulk export endpoint
//
// The only binary response on the surface. A 2xx is not enough: the body
// must also be declared as an archive (or left undeclared) before it is
// handed back.

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info};

use crate::client::{ProporterClient, error_from_response};
use crate::credentials::Credentials;
use crate::error::Error;
use crate::models::{BulkExportRequest, ExportResourceRef};

/// Filename the archive is saved under.
pub const ARCHIVE_FILENAME: &str = "jamf_export.zip";

/// A validated export archive.
#[derive(Debug, Clone)]
pub struct ExportArchive {
    pub bytes: Bytes,
    /// The declared `Content-Type`, if the backend sent one.
    pub content_type: Option<String>,
}

impl ExportArchive {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Whether a declared content type is acceptable for an archive body.
///
/// Accepts any `*zip*` media type (`application/zip`,
/// `application/x-zip-compressed`) and `application/octet-stream`.
/// Parameters after `;` are ignored.
pub fn is_archive_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence.contains("zip") || essence == "application/octet-stream"
}

impl ProporterClient {
    /// Export the given resources as one archive.
    ///
    /// `POST /api/jamf/bulk-export`
    ///
    /// An empty `resources` slice fails with [`Error::EmptySelection`]
    /// before anything is sent. Package objects are exported as metadata
    /// only; the backend never embeds package binaries.
    pub async fn bulk_export(
        &self,
        credentials: &Credentials,
        resources: &[ExportResourceRef],
        include_dependencies: bool,
    ) -> Result<ExportArchive, Error> {
        if resources.is_empty() {
            return Err(Error::EmptySelection);
        }

        let body = BulkExportRequest {
            credentials: credentials.body()?,
            resources,
            include_dependencies,
        };
        let url = self.endpoint("api/jamf/bulk-export")?;
        debug!(
            count = resources.len(),
            include_dependencies, "POST {}", url
        );

        let resp = self.http().post(url).json(&body).send().await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        if let Some(ct) = &content_type {
            if !is_archive_content_type(ct) {
                return Err(Error::UnexpectedContentType {
                    content_type: ct.clone(),
                });
            }
        }

        let bytes = resp.bytes().await?;
        info!(size = bytes.len(), "bulk export archive received");
        Ok(ExportArchive {
            bytes,
            content_type,
        })
    }
}
