// Backend wire types
//
// Request bodies borrow; response bodies own. Every JSON response carries a
// `success` flag with an optional `error`, which `into_result` turns into
// `Error::Rejected` so callers see one `Result` shape.

use serde::{Deserialize, Serialize};

use crate::credentials::CredentialsBody;
use crate::error::Error;

// ── Shared shapes ───────────────────────────────────────────────────

/// A remote object as listed by the backend: `{id, name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteResource {
    pub id: u64,
    pub name: String,
}

/// A back-reference from a resource to something it relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDependency {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: u64,
    pub name: String,
}

/// One row of a full-instance scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSummaryEntry {
    pub resource_type: String,
    pub count: u64,
    #[serde(default)]
    pub items: Vec<RemoteResource>,
}

/// `{type, id}` as carried in a bulk export request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportResourceRef {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: u64,
}

// ── Requests ────────────────────────────────────────────────────────

#[derive(Serialize)]
pub(crate) struct CredentialsOnlyRequest<'a> {
    pub credentials: CredentialsBody<'a>,
}

#[derive(Serialize)]
pub(crate) struct ListResourcesRequest<'a> {
    pub credentials: CredentialsBody<'a>,
    pub resource_type: &'a str,
}

#[derive(Serialize)]
pub(crate) struct ResourceDetailRequest<'a> {
    pub credentials: CredentialsBody<'a>,
    pub resource_type: &'a str,
    pub resource_id: u64,
}

#[derive(Serialize)]
pub(crate) struct InstanceExportRequest<'a> {
    pub credentials: CredentialsBody<'a>,
    pub selected_types: &'a [String],
}

#[derive(Serialize)]
pub(crate) struct BulkExportRequest<'a> {
    pub credentials: CredentialsBody<'a>,
    pub resources: &'a [ExportResourceRef],
    pub include_dependencies: bool,
}

#[derive(Serialize)]
pub(crate) struct GenerateRequest<'a> {
    pub prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<&'a str>,
}

// ── Responses ───────────────────────────────────────────────────────

/// `POST /api/jamf/resources`
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceListResponse {
    #[serde(default)]
    pub resources: Vec<RemoteResource>,
    #[serde(default)]
    pub resource_type: String,
    pub success: bool,
    pub error: Option<String>,
}

/// `POST /api/jamf/resource-detail`
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDetailResponse {
    /// Raw resource attributes. Server-owned, passed through untouched.
    #[serde(default)]
    pub resource: serde_json::Value,
    #[serde(default)]
    pub dependencies: Vec<ResourceDependency>,
    #[serde(default)]
    pub hcl: String,
    pub bundle_hcl: Option<String>,
    pub success: bool,
    pub error: Option<String>,
}

/// `POST /api/jamf/instance-export`
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceExportResponse {
    #[serde(default)]
    pub summary: Vec<InstanceSummaryEntry>,
    pub success: bool,
    pub error: Option<String>,
}

/// `POST /api/jamf/verify-auth`
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyAuthResponse {
    pub success: bool,
    pub error: Option<String>,
}

/// `POST /api/generate`
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub hcl: String,
    pub success: bool,
    pub error: Option<String>,
}

/// A prompt recipe from `GET /api/cookbook`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookbookModule {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub prompt: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CookbookData {
    #[serde(default)]
    pub modules: Vec<CookbookModule>,
}

/// Non-2xx error body. FastAPI uses `detail` (string or validation array),
/// other layers use `message`.
#[derive(Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: Option<serde_json::Value>,
    pub message: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        match self.detail {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Null) | None => self.message,
            Some(other) => Some(other.to_string()),
        }
    }
}

// ── Envelope unwrapping ─────────────────────────────────────────────

/// A JSON response carrying `{success, error?}`.
pub(crate) trait Envelope: Sized {
    /// Message used when `success` is false and `error` is absent.
    const FALLBACK_ERROR: &'static str;

    fn success(&self) -> bool;
    fn take_error(&mut self) -> Option<String>;

    fn into_result(mut self) -> Result<Self, Error> {
        if self.success() {
            Ok(self)
        } else {
            let message = self
                .take_error()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| Self::FALLBACK_ERROR.to_owned());
            Err(Error::Rejected { message })
        }
    }
}

macro_rules! envelope {
    ($ty:ty, $fallback:literal) => {
        impl Envelope for $ty {
            const FALLBACK_ERROR: &'static str = $fallback;

            fn success(&self) -> bool {
                self.success
            }

            fn take_error(&mut self) -> Option<String> {
                self.error.take()
            }
        }
    };
}

envelope!(ResourceListResponse, "Failed to fetch resources");
envelope!(ResourceDetailResponse, "Failed to load resource details");
envelope!(InstanceExportResponse, "Failed to scan instance");
envelope!(VerifyAuthResponse, "Unknown error");
envelope!(GenerateResponse, "Unknown error occurred");

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detail_response_keeps_dependency_order() {
        let raw = json!({
            "resource": { "general": { "id": 7 } },
            "dependencies": [
                { "type": "scripts", "id": 3, "name": "scripts_3" },
                { "type": "categories", "id": 1, "name": "categories_1" },
                { "type": "packages", "id": 9, "name": "packages_9" }
            ],
            "hcl": "resource \"jamfpro_policy\" \"p\" {}",
            "success": true
        });
        let resp: ResourceDetailResponse = serde_json::from_value(raw).unwrap();
        let order: Vec<_> = resp
            .dependencies
            .iter()
            .map(|d| d.resource_type.as_str())
            .collect();
        assert_eq!(order, ["scripts", "categories", "packages"]);
        assert!(resp.bundle_hcl.is_none());
    }

    #[test]
    fn failed_envelope_without_message_uses_fallback() {
        let resp: ResourceListResponse = serde_json::from_value(json!({
            "resources": [],
            "resource_type": "policies",
            "success": false
        }))
        .unwrap();
        let err = resp.into_result().unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch resources");
    }

    #[test]
    fn error_body_prefers_detail_then_message() {
        let body: ErrorBody = serde_json::from_value(json!({ "detail": "boom" })).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("boom"));

        let body: ErrorBody = serde_json::from_value(json!({ "message": "bang" })).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("bang"));

        let body: ErrorBody = serde_json::from_value(json!({})).unwrap();
        assert!(body.into_message().is_none());
    }

    #[test]
    fn export_ref_serializes_type_key() {
        let r = ExportResourceRef {
            resource_type: "policies".into(),
            id: 4,
        };
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({ "type": "policies", "id": 4 })
        );
    }
}
