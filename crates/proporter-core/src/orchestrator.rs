// ── Orchestrator ──
//
// The single session object. Fetches run as spawned tasks and report back
// through an outcome channel; the orchestrator applies outcomes one at a
// time, so navigation, selection and preview state need no locks. Every
// outcome carries the ticket it was issued under and is dropped if the
// view has moved on.

use std::sync::Arc;

use proporter_api::{
    Credentials, ExportArchive, InstanceSummaryEntry, ProporterClient, RemoteResource,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::export::BulkExportCoordinator;
use crate::fetch::{FetchTarget, Loadable, RequestTicket};
use crate::navigation::{NavEvent, NavigationController, View};
use crate::preview::{DependencyPreviewService, ResourceDetail};
use crate::scan::{InstanceScanCoordinator, ScanProgress};
use crate::selection::{SelectionKey, SelectionStore};
use crate::session::CredentialContext;

/// Result of a spawned fetch, tagged with its ticket.
#[derive(Debug)]
pub enum Outcome {
    Listing {
        ticket: RequestTicket,
        result: Result<Vec<RemoteResource>, CoreError>,
    },
    Scan {
        ticket: RequestTicket,
        result: Result<Vec<InstanceSummaryEntry>, CoreError>,
    },
    Detail {
        ticket: RequestTicket,
        result: Result<ResourceDetail, CoreError>,
    },
}

impl Outcome {
    pub fn ticket(&self) -> &RequestTicket {
        match self {
            Self::Listing { ticket, .. } | Self::Scan { ticket, .. } | Self::Detail { ticket, .. } => {
                ticket
            }
        }
    }
}

pub struct Orchestrator {
    client: ProporterClient,
    credentials: CredentialContext,
    nav: NavigationController,
    preview: DependencyPreviewService,
    exporter: BulkExportCoordinator,
    scanner: InstanceScanCoordinator,
    outcome_tx: mpsc::UnboundedSender<Outcome>,
    outcome_rx: mpsc::UnboundedReceiver<Outcome>,
}

impl Orchestrator {
    pub fn new(client: ProporterClient) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            exporter: BulkExportCoordinator::new(client.clone()),
            scanner: InstanceScanCoordinator::new(client.clone()),
            client,
            credentials: CredentialContext::new(),
            nav: NavigationController::new(),
            preview: DependencyPreviewService::new(),
            outcome_tx,
            outcome_rx,
        }
    }

    pub fn client(&self) -> &ProporterClient {
        &self.client
    }

    // ── Session ──────────────────────────────────────────────────────

    pub fn credentials(&self) -> &CredentialContext {
        &self.credentials
    }

    /// Adopt credentials that were already verified elsewhere.
    pub fn connect(&mut self, credentials: Credentials) {
        self.credentials.connect(credentials);
    }

    /// Verify credentials with the backend, then adopt them.
    pub async fn login(&mut self, credentials: Credentials) -> Result<(), CoreError> {
        self.credentials.login(&self.client, credentials).await
    }

    /// Drop credentials and every piece of derived state.
    pub fn disconnect(&mut self) {
        self.close();
        self.credentials.disconnect();
    }

    // ── Navigation ───────────────────────────────────────────────────

    pub fn navigation(&self) -> &NavigationController {
        &self.nav
    }

    pub fn view(&self) -> &View {
        self.nav.view()
    }

    /// Feed a navigation event. Spawns the new view's fetch, if it has one.
    pub fn navigate(&mut self, event: NavEvent) -> Result<Option<RequestTicket>, CoreError> {
        let credentials = match event {
            NavEvent::ChooseType(_) | NavEvent::RequestScan => Some(self.credentials.require()?),
            NavEvent::Back | NavEvent::Close => {
                self.preview.close();
                None
            }
        };

        let ticket = self.nav.handle(event);
        if let (Some(ticket), Some(credentials)) = (&ticket, credentials) {
            self.spawn_fetch(ticket.clone(), credentials);
        }
        Ok(ticket)
    }

    /// Return to root and drop all derived state.
    pub fn close(&mut self) {
        self.preview.close();
        self.nav.handle(NavEvent::Close);
    }

    /// Re-issue the current view's fetch, keeping its selection.
    pub fn retry(&mut self) -> Result<Option<RequestTicket>, CoreError> {
        let credentials = self.credentials.require()?;
        let ticket = self.nav.retry();
        if let Some(ticket) = &ticket {
            self.spawn_fetch(ticket.clone(), credentials);
        }
        Ok(ticket)
    }

    // ── Selection ────────────────────────────────────────────────────

    pub fn selection(&self) -> Option<&SelectionStore> {
        self.nav.selection()
    }

    /// Toggle a resource of the type being browsed.
    pub fn toggle(&mut self, id: u64) -> Option<bool> {
        self.nav.toggle(id)
    }

    pub fn set_include_dependencies(&mut self, include: bool) {
        if let Some(selection) = self.nav.selection_mut() {
            selection.set_include_dependencies(include);
        }
    }

    // ── Preview ──────────────────────────────────────────────────────

    pub fn preview(&self) -> &DependencyPreviewService {
        &self.preview
    }

    /// Preview a resource of the type being browsed.
    pub fn open_preview(
        &mut self,
        id: u64,
        name: impl Into<String>,
    ) -> Result<Option<RequestTicket>, CoreError> {
        let Some(descriptor) = self.nav.current_type() else {
            debug!(id, "preview requested outside a browse view");
            return Ok(None);
        };
        let credentials = self.credentials.require()?;
        let ticket = self
            .preview
            .select(SelectionKey::new(descriptor.id, id), name);
        self.spawn_fetch(ticket.clone(), credentials);
        Ok(Some(ticket))
    }

    pub fn retry_preview(&mut self) -> Result<Option<RequestTicket>, CoreError> {
        let credentials = self.credentials.require()?;
        let ticket = self.preview.retry();
        if let Some(ticket) = &ticket {
            self.spawn_fetch(ticket.clone(), credentials);
        }
        Ok(ticket)
    }

    pub fn close_preview(&mut self) {
        self.preview.close();
    }

    // ── Export ───────────────────────────────────────────────────────

    /// Export the current browse selection.
    pub async fn export_selection(&self) -> Result<ExportArchive, CoreError> {
        let credentials = self.credentials.require()?;
        let Some(selection) = self.nav.selection() else {
            return Err(CoreError::EmptySelection);
        };
        self.exporter.export_store(&credentials, selection).await
    }

    /// Export everything the last scan found.
    pub async fn export_all(&self) -> Result<ExportArchive, CoreError> {
        let credentials = self.credentials.require()?;
        let summary = self
            .nav
            .summary()
            .and_then(Loadable::loaded)
            .map_or(&[][..], Vec::as_slice);
        self.scanner.export_all(&credentials, summary).await
    }

    pub fn scan_progress(&self) -> watch::Receiver<ScanProgress> {
        self.scanner.subscribe()
    }

    // ── Outcomes ─────────────────────────────────────────────────────

    /// Wait for the next fetch outcome.
    pub async fn next_outcome(&mut self) -> Option<Outcome> {
        self.outcome_rx.recv().await
    }

    /// Commit an outcome. Returns `false` if it was stale and dropped.
    pub fn apply(&mut self, outcome: Outcome) -> bool {
        let target = outcome.ticket().target.clone();
        let applied = match outcome {
            Outcome::Listing { ticket, result } => self.nav.apply_listing(&ticket, result),
            Outcome::Scan { ticket, result } => self.nav.apply_scan(&ticket, result),
            Outcome::Detail { ticket, result } => self.preview.apply(&ticket, result),
        };
        if !applied {
            warn!(%target, "discarding stale response");
        }
        applied
    }

    /// True while the current view or preview waits on a fetch.
    pub fn is_loading(&self) -> bool {
        self.nav.listing().is_some_and(Loadable::is_loading)
            || self.nav.summary().is_some_and(Loadable::is_loading)
            || self.preview.state().is_some_and(Loadable::is_loading)
    }

    /// Apply outcomes until nothing the user can see is loading.
    ///
    /// Stale outcomes that arrive in the meantime are applied (and
    /// dropped) along the way.
    pub async fn settle(&mut self) {
        while self.is_loading() {
            let Some(outcome) = self.outcome_rx.recv().await else {
                break;
            };
            self.apply(outcome);
        }
    }

    // ── Fetch dispatch ───────────────────────────────────────────────

    fn spawn_fetch(&self, ticket: RequestTicket, credentials: Arc<Credentials>) {
        let tx = self.outcome_tx.clone();
        debug!(ticket = ticket.id, target = %ticket.target, "dispatching fetch");

        match ticket.target.clone() {
            FetchTarget::Listing { resource_type } => {
                let client = self.client.clone();
                tokio::spawn(async move {
                    let result = client
                        .list_resources(&credentials, &resource_type)
                        .await
                        .map(|resp| resp.resources)
                        .map_err(CoreError::from);
                    let _ = tx.send(Outcome::Listing { ticket, result });
                });
            }
            FetchTarget::Scan => {
                let scanner = self.scanner.clone();
                tokio::spawn(async move {
                    let result = scanner.scan(&credentials).await;
                    let _ = tx.send(Outcome::Scan { ticket, result });
                });
            }
            FetchTarget::Detail { resource_type, id } => {
                let client = self.client.clone();
                tokio::spawn(async move {
                    let result = client
                        .get_resource_detail(&credentials, &resource_type, id)
                        .await
                        .map(ResourceDetail::from)
                        .map_err(CoreError::from);
                    let _ = tx.send(Outcome::Detail { ticket, result });
                });
            }
        }
    }
}
