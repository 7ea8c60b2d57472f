// ── Dependency preview ──
//
// Detail panel for one resource: rendered HCL plus its direct
// dependencies. Only one resource is previewed at a time; picking another
// supersedes whatever was in flight.

use proporter_api::{ResourceDependency, ResourceDetailResponse};
use tracing::debug;

use crate::error::CoreError;
use crate::fetch::{FetchTarget, Loadable, RequestTicket, TicketCounter};
use crate::selection::SelectionKey;

/// A resource's rendered configuration and direct dependencies.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDetail {
    /// Raw attributes as the backend returned them.
    pub resource: serde_json::Value,
    /// Server order, not re-sorted.
    pub dependencies: Vec<ResourceDependency>,
    pub hcl: String,
    /// The resource together with its dependencies, when the backend
    /// rendered one.
    pub bundle_hcl: Option<String>,
}

impl From<ResourceDetailResponse> for ResourceDetail {
    fn from(resp: ResourceDetailResponse) -> Self {
        Self {
            resource: resp.resource,
            dependencies: resp.dependencies,
            hcl: resp.hcl,
            bundle_hcl: resp.bundle_hcl,
        }
    }
}

impl ResourceDetail {
    /// Text offered for download: the bundle when present, otherwise the
    /// single-resource HCL.
    pub fn download_content(&self) -> &str {
        self.bundle_hcl.as_deref().unwrap_or(&self.hcl)
    }
}

#[derive(Debug)]
struct OpenPreview {
    key: SelectionKey,
    name: String,
    detail: Loadable<ResourceDetail>,
}

/// Detail state for the resource currently under preview.
#[derive(Debug, Default)]
pub struct DependencyPreviewService {
    open: Option<OpenPreview>,
    tickets: TicketCounter,
}

impl DependencyPreviewService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start previewing `key`. Any earlier in-flight fetch is superseded.
    pub fn select(&mut self, key: SelectionKey, name: impl Into<String>) -> RequestTicket {
        let ticket = self.issue(&key);
        debug!(%key, ticket = ticket.id, "preview selected");
        self.open = Some(OpenPreview {
            key,
            name: name.into(),
            detail: Loadable::Loading { ticket: ticket.id },
        });
        ticket
    }

    /// Re-issue the identical request for the open preview.
    pub fn retry(&mut self) -> Option<RequestTicket> {
        let key = self.open.as_ref()?.key.clone();
        let ticket = self.issue(&key);
        if let Some(open) = &mut self.open {
            open.detail = Loadable::Loading { ticket: ticket.id };
        }
        Some(ticket)
    }

    /// Commit a detail result. Returns `false` if it was superseded.
    pub fn apply(
        &mut self,
        ticket: &RequestTicket,
        result: Result<ResourceDetail, CoreError>,
    ) -> bool {
        let Some(open) = &mut self.open else {
            return false;
        };
        let FetchTarget::Detail { resource_type, id } = &ticket.target else {
            return false;
        };
        if open.key.resource_type != *resource_type || open.key.id != *id {
            return false;
        }
        open.detail.settle(ticket.id, result)
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn key(&self) -> Option<&SelectionKey> {
        self.open.as_ref().map(|o| &o.key)
    }

    pub fn name(&self) -> Option<&str> {
        self.open.as_ref().map(|o| o.name.as_str())
    }

    pub fn state(&self) -> Option<&Loadable<ResourceDetail>> {
        self.open.as_ref().map(|o| &o.detail)
    }

    pub fn detail(&self) -> Option<&ResourceDetail> {
        self.state().and_then(Loadable::loaded)
    }

    /// Download text for the loaded preview.
    pub fn download_content(&self) -> Option<&str> {
        self.detail().map(ResourceDetail::download_content)
    }

    /// Download filename for the open preview.
    pub fn download_filename(&self) -> Option<String> {
        self.name().map(download_filename)
    }

    fn issue(&mut self, key: &SelectionKey) -> RequestTicket {
        self.tickets.issue(FetchTarget::Detail {
            resource_type: key.resource_type.clone(),
            id: key.id,
        })
    }
}

/// `<name>.tf` with the name lower-cased and every character outside
/// `[a-z0-9]` replaced by `_`.
pub fn download_filename(name: &str) -> String {
    let stem: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{stem}.tf")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn detail(hcl: &str, bundle: Option<&str>) -> ResourceDetail {
        ResourceDetail {
            resource: json!({}),
            dependencies: vec![
                ResourceDependency {
                    resource_type: "scripts".into(),
                    id: 3,
                    name: "scripts_3".into(),
                },
                ResourceDependency {
                    resource_type: "categories".into(),
                    id: 1,
                    name: "categories_1".into(),
                },
            ],
            hcl: hcl.into(),
            bundle_hcl: bundle.map(str::to_owned),
        }
    }

    #[test]
    fn new_selection_supersedes_in_flight_fetch() {
        let mut svc = DependencyPreviewService::new();
        let first = svc.select(SelectionKey::new("policies", 1), "First");
        let second = svc.select(SelectionKey::new("policies", 2), "Second");

        assert!(!svc.apply(&first, Ok(detail("first", None))));
        assert!(svc.state().unwrap().is_loading());
        assert!(svc.apply(&second, Ok(detail("second", None))));
        assert_eq!(svc.detail().unwrap().hcl, "second");
    }

    #[test]
    fn reselecting_same_resource_discards_older_answer() {
        let mut svc = DependencyPreviewService::new();
        let first = svc.select(SelectionKey::new("policies", 1), "P");
        let second = svc.select(SelectionKey::new("policies", 1), "P");

        assert!(!svc.apply(&first, Ok(detail("old", None))));
        assert!(svc.apply(&second, Ok(detail("new", None))));
    }

    #[test]
    fn retry_reissues_identical_request() {
        let mut svc = DependencyPreviewService::new();
        let first = svc.select(SelectionKey::new("scripts", 4), "cleanup");
        svc.apply(
            &first,
            Err(CoreError::Rejected {
                message: "Failed to load resource details".into(),
            }),
        );
        assert_eq!(
            svc.state().unwrap().error(),
            Some("Failed to load resource details")
        );

        let retry = svc.retry().unwrap();
        assert_eq!(retry.target, first.target);
        assert_ne!(retry.id, first.id);
        assert!(svc.apply(&retry, Ok(detail("ok", None))));
    }

    #[test]
    fn dependencies_keep_server_order() {
        let mut svc = DependencyPreviewService::new();
        let t = svc.select(SelectionKey::new("policies", 1), "P");
        svc.apply(&t, Ok(detail("x", None)));
        let order: Vec<_> = svc
            .detail()
            .unwrap()
            .dependencies
            .iter()
            .map(|d| d.resource_type.as_str())
            .collect();
        assert_eq!(order, ["scripts", "categories"]);
    }

    #[test]
    fn download_prefers_bundle() {
        assert_eq!(detail("single", Some("bundle")).download_content(), "bundle");
        assert_eq!(detail("single", None).download_content(), "single");
    }

    #[test]
    fn filename_is_sanitized() {
        assert_eq!(download_filename("Install Chrome (v2)"), "install_chrome__v2_.tf");
        assert_eq!(download_filename("cleanup.sh"), "cleanup_sh.tf");
    }

    #[test]
    fn close_drops_late_answers() {
        let mut svc = DependencyPreviewService::new();
        let t = svc.select(SelectionKey::new("policies", 1), "P");
        svc.close();
        assert!(!svc.apply(&t, Ok(detail("late", None))));
        assert!(!svc.is_open());
    }
}
