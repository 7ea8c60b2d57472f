// Orchestrator behaviour against a mocked backend.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use proporter_core::{
    CoreError, Credentials, InstanceScanCoordinator, Loadable, NavEvent, Orchestrator,
    ProporterClient, ScanProgress,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Orchestrator) {
    let server = MockServer::start().await;
    let client =
        ProporterClient::with_client(reqwest::Client::new(), Url::parse(&server.uri()).unwrap());
    let mut orch = Orchestrator::new(client);
    orch.connect(creds());
    (server, orch)
}

fn creds() -> Credentials {
    Credentials::new(
        "https://acme.jamfcloud.com",
        "admin",
        SecretString::from("hunter2".to_owned()),
    )
}

async fn mount_listing(server: &MockServer, resource_type: &str, body: serde_json::Value, delay: Duration) {
    Mock::given(method("POST"))
        .and(path("/api/jamf/resources"))
        .and(body_partial_json(json!({ "resource_type": resource_type })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(body)
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

fn listed_names(orch: &Orchestrator) -> Vec<String> {
    orch.navigation()
        .listing()
        .and_then(Loadable::loaded)
        .map(|rs| rs.iter().map(|r| r.name.clone()).collect())
        .unwrap_or_default()
}

// ── Navigation ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_late_listing_for_previous_type_is_discarded() {
    let (server, mut orch) = setup().await;

    mount_listing(
        &server,
        "policies",
        json!({
            "resources": [{ "id": 1, "name": "Install Chrome" }],
            "resource_type": "policies",
            "success": true,
        }),
        Duration::from_millis(300),
    )
    .await;
    mount_listing(
        &server,
        "scripts",
        json!({
            "resources": [{ "id": 9, "name": "cleanup.sh" }],
            "resource_type": "scripts",
            "success": true,
        }),
        Duration::ZERO,
    )
    .await;

    orch.navigate(NavEvent::ChooseType("policies".into())).unwrap();
    orch.navigate(NavEvent::Back).unwrap();
    orch.navigate(NavEvent::ChooseType("scripts".into())).unwrap();

    orch.settle().await;
    assert_eq!(listed_names(&orch), ["cleanup.sh"]);

    // The slow policies answer still arrives, and is dropped.
    let late = orch.next_outcome().await.unwrap();
    assert!(!orch.apply(late));
    assert_eq!(listed_names(&orch), ["cleanup.sh"]);
    assert_eq!(orch.navigation().current_type().map(|d| d.id), Some("scripts"));
}

#[tokio::test]
async fn test_listing_failure_is_inline_and_retry_keeps_selection() {
    let (server, mut orch) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/jamf/resources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resources": [{ "id": 1, "name": "A" }],
            "resource_type": "policies",
            "success": true,
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/jamf/resources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resources": [],
            "resource_type": "policies",
            "success": false,
        })))
        .mount(&server)
        .await;

    orch.navigate(NavEvent::ChooseType("policies".into())).unwrap();
    orch.settle().await;
    assert_eq!(orch.toggle(1), Some(true));

    orch.retry().unwrap();
    orch.settle().await;

    assert_eq!(orch.navigation().error(), Some("Failed to fetch resources"));
    assert!(orch.selection().unwrap().has("policies", 1));
}

#[tokio::test]
async fn test_navigation_requires_credentials() {
    let (_server, mut orch) = setup().await;
    orch.disconnect();

    let err = orch
        .navigate(NavEvent::ChooseType("policies".into()))
        .unwrap_err();

    assert!(matches!(err, CoreError::NotConnected));
    assert!(orch.navigation().is_root());
}

#[tokio::test]
async fn test_disconnect_resets_view_selection_and_preview() {
    let (server, mut orch) = setup().await;

    mount_listing(
        &server,
        "policies",
        json!({ "resources": [{ "id": 5, "name": "Install Chrome" }], "success": true }),
        Duration::ZERO,
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/jamf/resource-detail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resource": {},
            "dependencies": [],
            "hcl": "single",
            "success": true,
        })))
        .mount(&server)
        .await;

    orch.navigate(NavEvent::ChooseType("policies".into())).unwrap();
    orch.settle().await;
    assert_eq!(orch.toggle(5), Some(true));
    orch.open_preview(5, "Install Chrome").unwrap();
    orch.settle().await;
    assert!(orch.preview().is_open());

    orch.disconnect();

    assert!(orch.navigation().is_root());
    assert!(orch.selection().is_none());
    assert!(!orch.preview().is_open());
    assert!(orch.credentials().current().is_none());
    let err = orch
        .navigate(NavEvent::ChooseType("policies".into()))
        .unwrap_err();
    assert!(matches!(err, CoreError::NotConnected));

    orch.connect(creds());
    orch.navigate(NavEvent::ChooseType("policies".into())).unwrap();
    orch.settle().await;
    assert_eq!(orch.selection().unwrap().size(), 0);
}

// ── Preview ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_preview_loads_detail_for_browsed_type() {
    let (server, mut orch) = setup().await;

    mount_listing(
        &server,
        "policies",
        json!({ "resources": [{ "id": 5, "name": "Install Chrome" }], "success": true }),
        Duration::ZERO,
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/jamf/resource-detail"))
        .and(body_partial_json(json!({ "resource_type": "policies", "resource_id": 5 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resource": {},
            "dependencies": [
                { "type": "scripts", "id": 3, "name": "scripts_3" },
                { "type": "categories", "id": 1, "name": "categories_1" },
            ],
            "hcl": "single",
            "bundle_hcl": "bundle",
            "success": true,
        })))
        .mount(&server)
        .await;

    orch.navigate(NavEvent::ChooseType("policies".into())).unwrap();
    orch.settle().await;
    orch.open_preview(5, "Install Chrome").unwrap();
    orch.settle().await;

    let preview = orch.preview();
    assert_eq!(preview.download_content(), Some("bundle"));
    assert_eq!(preview.download_filename().as_deref(), Some("install_chrome.tf"));
    let deps: Vec<_> = preview
        .detail()
        .unwrap()
        .dependencies
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(deps, ["scripts_3", "categories_1"]);

    orch.navigate(NavEvent::Back).unwrap();
    assert!(!orch.preview().is_open());
}

// ── Export ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_export_with_empty_selection_sends_nothing() {
    let (server, mut orch) = setup().await;

    mount_listing(
        &server,
        "scripts",
        json!({ "resources": [], "resource_type": "scripts", "success": true }),
        Duration::ZERO,
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/jamf/bulk-export"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    orch.navigate(NavEvent::ChooseType("scripts".into())).unwrap();
    orch.settle().await;

    let err = orch.export_selection().await.unwrap_err();
    assert!(matches!(err, CoreError::EmptySelection));
}

#[tokio::test]
async fn test_export_selection_sends_keys_and_flag() {
    let (server, mut orch) = setup().await;

    mount_listing(
        &server,
        "policies",
        json!({
            "resources": [{ "id": 2, "name": "B" }, { "id": 1, "name": "A" }],
            "success": true,
        }),
        Duration::ZERO,
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/jamf/bulk-export"))
        .and(body_partial_json(json!({
            "resources": [{ "type": "policies", "id": 1 }, { "type": "policies", "id": 2 }],
            "include_dependencies": false,
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/octet-stream")
                .set_body_bytes(b"PK".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    orch.navigate(NavEvent::ChooseType("policies".into())).unwrap();
    orch.settle().await;
    orch.toggle(2);
    orch.toggle(1);
    orch.set_include_dependencies(false);

    let archive = orch.export_selection().await.unwrap();
    assert_eq!(archive.bytes.as_ref(), b"PK");
}

#[tokio::test]
async fn test_export_all_exports_every_scanned_item_with_dependencies() {
    let (server, mut orch) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/jamf/instance-export"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "summary": [{
                "resource_type": "policies",
                "count": 2,
                "items": [{ "id": 1, "name": "A" }, { "id": 2, "name": "B" }],
            }],
            "success": true,
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/jamf/bulk-export"))
        .and(body_json(json!({
            "credentials": {
                "url": "https://acme.jamfcloud.com",
                "username": "admin",
                "password": "hunter2",
            },
            "resources": [{ "type": "policies", "id": 1 }, { "type": "policies", "id": 2 }],
            "include_dependencies": true,
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/zip")
                .set_body_bytes(b"PK\x03\x04".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    orch.navigate(NavEvent::RequestScan).unwrap();
    orch.settle().await;
    let archive = orch.export_all().await.unwrap();

    assert_eq!(archive.len(), 4);
    assert_eq!(*orch.scan_progress().borrow(), ScanProgress::Idle);
}

#[tokio::test]
async fn test_export_all_refused_while_scanning() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/jamf/instance-export"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "summary": [], "success": true }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let client =
        ProporterClient::with_client(reqwest::Client::new(), Url::parse(&server.uri()).unwrap());
    let scanner = InstanceScanCoordinator::new(client);
    let mut progress = scanner.subscribe();

    let background = scanner.clone();
    let scan = tokio::spawn(async move { background.scan(&creds()).await });
    progress
        .wait_for(|p| *p == ScanProgress::Scanning)
        .await
        .unwrap();

    let err = scanner.export_all(&creds(), &[]).await.unwrap_err();
    assert!(matches!(err, CoreError::ScanInProgress));

    assert!(scan.await.unwrap().unwrap().is_empty());
    assert_eq!(scanner.progress(), ScanProgress::Idle);
}

#[tokio::test]
async fn test_html_archive_response_fails_export() {
    let (server, mut orch) = setup().await;

    mount_listing(
        &server,
        "policies",
        json!({ "resources": [{ "id": 1, "name": "A" }], "success": true }),
        Duration::ZERO,
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/jamf/bulk-export"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<html/>"),
        )
        .mount(&server)
        .await;

    orch.navigate(NavEvent::ChooseType("policies".into())).unwrap();
    orch.settle().await;
    orch.toggle(1);

    let err = orch.export_selection().await.unwrap_err();
    assert!(matches!(err, CoreError::NotAnArchive { .. }));
}

// ── Scan ────────────────────────────────────────────────────────────

async fn mount_slow_scan(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/jamf/instance-export"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "summary": [{
                        "resource_type": "policies",
                        "count": 1,
                        "items": [{ "id": 1, "name": "A" }],
                    }],
                    "success": true,
                }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(server)
        .await;
}

fn scanned_types(orch: &Orchestrator) -> Option<Vec<String>> {
    orch.navigation()
        .summary()
        .and_then(Loadable::loaded)
        .map(|entries| entries.iter().map(|e| e.resource_type.clone()).collect())
}

#[tokio::test]
async fn test_rescan_after_back_loads_while_earlier_scan_runs() {
    let (server, mut orch) = setup().await;
    mount_slow_scan(&server).await;

    orch.navigate(NavEvent::RequestScan).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    orch.navigate(NavEvent::Back).unwrap();
    orch.navigate(NavEvent::RequestScan).unwrap();
    orch.settle().await;

    assert_eq!(orch.navigation().error(), None);
    assert_eq!(scanned_types(&orch), Some(vec!["policies".to_owned()]));
}

#[tokio::test]
async fn test_scan_retry_while_loading_supersedes_first_request() {
    let (server, mut orch) = setup().await;
    mount_slow_scan(&server).await;

    orch.navigate(NavEvent::RequestScan).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    orch.retry().unwrap();
    orch.settle().await;

    assert_eq!(scanned_types(&orch), Some(vec!["policies".to_owned()]));

    let mut progress = orch.scan_progress();
    progress
        .wait_for(|p| *p == ScanProgress::Idle)
        .await
        .unwrap();
}
