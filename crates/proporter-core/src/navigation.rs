// ── Navigation state machine ──
//
// root ──ChooseType──▶ browsing(type) ──Back──▶ root
// root ──RequestScan─▶ scanning       ──Back──▶ root
// any  ──Close───────▶ root
//
// View-local data (listing, selection, summary, errors) lives inside the
// view variant, so leaving a view drops all of it in one assignment.

use proporter_api::{InstanceSummaryEntry, RemoteResource};
use tracing::debug;

use crate::catalog::{self, ResourceTypeDescriptor};
use crate::error::CoreError;
use crate::fetch::{FetchTarget, Loadable, RequestTicket, TicketCounter};
use crate::selection::SelectionStore;

/// Input to the navigation state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    ChooseType(String),
    RequestScan,
    Back,
    Close,
}

/// Single-type browse view.
#[derive(Debug)]
pub struct BrowseView {
    pub descriptor: &'static ResourceTypeDescriptor,
    pub listing: Loadable<Vec<RemoteResource>>,
    pub selection: SelectionStore,
}

/// Whole-instance scan view.
#[derive(Debug, Default)]
pub struct ScanView {
    pub summary: Loadable<Vec<InstanceSummaryEntry>>,
}

#[derive(Debug, Default)]
pub enum View {
    #[default]
    Root,
    Browsing(BrowseView),
    Scanning(ScanView),
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Browsing(_) => "browsing",
            Self::Scanning(_) => "scanning",
        }
    }
}

/// Owns the current view and issues fetch tickets on transitions.
#[derive(Debug, Default)]
pub struct NavigationController {
    view: View,
    tickets: TicketCounter,
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn is_root(&self) -> bool {
        matches!(self.view, View::Root)
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Apply a navigation event. Returns the fetch the new view needs, if
    /// any. Events that are not valid in the current view are ignored.
    pub fn handle(&mut self, event: NavEvent) -> Option<RequestTicket> {
        match (&self.view, event) {
            (View::Root, NavEvent::ChooseType(type_id)) => {
                let Some(descriptor) = catalog::descriptor(&type_id) else {
                    debug!(type_id, "ignoring unknown resource type");
                    return None;
                };
                let ticket = self.tickets.issue(FetchTarget::Listing {
                    resource_type: descriptor.id.to_owned(),
                });
                self.view = View::Browsing(BrowseView {
                    descriptor,
                    listing: Loadable::Loading { ticket: ticket.id },
                    selection: SelectionStore::new(),
                });
                Some(ticket)
            }
            (View::Root, NavEvent::RequestScan) => {
                let ticket = self.tickets.issue(FetchTarget::Scan);
                self.view = View::Scanning(ScanView {
                    summary: Loadable::Loading { ticket: ticket.id },
                });
                Some(ticket)
            }
            (View::Browsing(_) | View::Scanning(_), NavEvent::Back) | (_, NavEvent::Close) => {
                self.view = View::Root;
                None
            }
            (view, event) => {
                debug!(view = view.name(), ?event, "ignoring navigation event");
                None
            }
        }
    }

    /// Re-issue the current view's fetch under a fresh ticket.
    ///
    /// The selection is kept; the listing or summary goes back to loading.
    pub fn retry(&mut self) -> Option<RequestTicket> {
        match &mut self.view {
            View::Root => None,
            View::Browsing(browse) => {
                let ticket = self.tickets.issue(FetchTarget::Listing {
                    resource_type: browse.descriptor.id.to_owned(),
                });
                browse.listing = Loadable::Loading { ticket: ticket.id };
                Some(ticket)
            }
            View::Scanning(scan) => {
                let ticket = self.tickets.issue(FetchTarget::Scan);
                scan.summary = Loadable::Loading { ticket: ticket.id };
                Some(ticket)
            }
        }
    }

    // ── Results ──────────────────────────────────────────────────────

    /// Commit a listing result. Returns `false` if it was stale.
    pub fn apply_listing(
        &mut self,
        ticket: &RequestTicket,
        result: Result<Vec<RemoteResource>, CoreError>,
    ) -> bool {
        let FetchTarget::Listing { resource_type } = &ticket.target else {
            return false;
        };
        match &mut self.view {
            View::Browsing(browse) if browse.descriptor.id == resource_type.as_str() => {
                browse.listing.settle(ticket.id, result)
            }
            _ => false,
        }
    }

    /// Commit a scan result. Returns `false` if it was stale.
    pub fn apply_scan(
        &mut self,
        ticket: &RequestTicket,
        result: Result<Vec<InstanceSummaryEntry>, CoreError>,
    ) -> bool {
        if ticket.target != FetchTarget::Scan {
            return false;
        }
        match &mut self.view {
            View::Scanning(scan) => scan.summary.settle(ticket.id, result),
            _ => false,
        }
    }

    // ── View accessors ───────────────────────────────────────────────

    pub fn current_type(&self) -> Option<&'static ResourceTypeDescriptor> {
        match &self.view {
            View::Browsing(browse) => Some(browse.descriptor),
            _ => None,
        }
    }

    pub fn listing(&self) -> Option<&Loadable<Vec<RemoteResource>>> {
        match &self.view {
            View::Browsing(browse) => Some(&browse.listing),
            _ => None,
        }
    }

    pub fn summary(&self) -> Option<&Loadable<Vec<InstanceSummaryEntry>>> {
        match &self.view {
            View::Scanning(scan) => Some(&scan.summary),
            _ => None,
        }
    }

    pub fn selection(&self) -> Option<&SelectionStore> {
        match &self.view {
            View::Browsing(browse) => Some(&browse.selection),
            _ => None,
        }
    }

    pub fn selection_mut(&mut self) -> Option<&mut SelectionStore> {
        match &mut self.view {
            View::Browsing(browse) => Some(&mut browse.selection),
            _ => None,
        }
    }

    /// Toggle a resource of the type being browsed. `None` outside a
    /// browse view.
    pub fn toggle(&mut self, id: u64) -> Option<bool> {
        match &mut self.view {
            View::Browsing(browse) => Some(browse.selection.toggle(browse.descriptor.id, id)),
            _ => None,
        }
    }

    /// The error shown in the current view, if any.
    pub fn error(&self) -> Option<&str> {
        match &self.view {
            View::Root => None,
            View::Browsing(browse) => browse.listing.error(),
            View::Scanning(scan) => scan.summary.error(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn resources(names: &[(u64, &str)]) -> Vec<RemoteResource> {
        names
            .iter()
            .map(|(id, name)| RemoteResource {
                id: *id,
                name: (*name).to_owned(),
            })
            .collect()
    }

    #[test]
    fn choose_type_enters_loading_browse_view() {
        let mut nav = NavigationController::new();
        let ticket = nav.handle(NavEvent::ChooseType("scripts".into())).unwrap();

        assert_eq!(
            ticket.target,
            FetchTarget::Listing {
                resource_type: "scripts".into()
            }
        );
        assert_eq!(nav.current_type().map(|d| d.id), Some("scripts"));
        assert!(nav.listing().unwrap().is_loading());
        assert_eq!(nav.selection().map(SelectionStore::size), Some(0));
    }

    #[test]
    fn invalid_events_are_ignored() {
        let mut nav = NavigationController::new();
        assert!(nav.handle(NavEvent::Back).is_none());
        assert!(nav.handle(NavEvent::ChooseType("widgets".into())).is_none());
        assert!(nav.is_root());

        nav.handle(NavEvent::RequestScan).unwrap();
        assert!(nav.handle(NavEvent::ChooseType("policies".into())).is_none());
        assert!(nav.summary().is_some());
    }

    #[test]
    fn back_clears_selection_listing_and_error() {
        let mut nav = NavigationController::new();
        let ticket = nav.handle(NavEvent::ChooseType("policies".into())).unwrap();
        nav.apply_listing(&ticket, Ok(resources(&[(1, "A"), (2, "B")])));
        nav.toggle(1);
        nav.toggle(2);
        let retry = nav.retry().unwrap();
        nav.apply_listing(
            &retry,
            Err(CoreError::Rejected {
                message: "Failed to fetch resources".into(),
            }),
        );
        assert!(nav.error().is_some());
        assert_eq!(nav.selection().unwrap().size(), 2);

        nav.handle(NavEvent::Back);

        assert!(nav.is_root());
        assert!(nav.selection().is_none());
        assert!(nav.listing().is_none());
        assert!(nav.error().is_none());

        nav.handle(NavEvent::ChooseType("policies".into()));
        assert_eq!(nav.selection().unwrap().size(), 0);
    }

    #[test]
    fn stale_listing_for_other_type_is_discarded() {
        let mut nav = NavigationController::new();
        let first = nav.handle(NavEvent::ChooseType("policies".into())).unwrap();
        nav.handle(NavEvent::Back);
        let second = nav.handle(NavEvent::ChooseType("scripts".into())).unwrap();

        assert!(nav.apply_listing(&second, Ok(resources(&[(9, "cleanup.sh")]))));
        assert!(!nav.apply_listing(&first, Ok(resources(&[(1, "Install Chrome")]))));

        let listed = nav.listing().unwrap().loaded().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "cleanup.sh");
    }

    #[test]
    fn stale_listing_for_same_type_is_discarded() {
        let mut nav = NavigationController::new();
        let first = nav.handle(NavEvent::ChooseType("policies".into())).unwrap();
        let second = nav.retry().unwrap();

        assert!(!nav.apply_listing(&first, Ok(resources(&[(1, "old")]))));
        assert!(nav.listing().unwrap().is_loading());
        assert!(nav.apply_listing(&second, Ok(resources(&[(1, "new")]))));
    }

    #[test]
    fn retry_keeps_selection() {
        let mut nav = NavigationController::new();
        let ticket = nav.handle(NavEvent::ChooseType("policies".into())).unwrap();
        nav.apply_listing(&ticket, Ok(resources(&[(1, "A")])));
        nav.toggle(1);

        let retry = nav.retry().unwrap();
        assert_ne!(retry.id, ticket.id);
        assert!(nav.selection().unwrap().has("policies", 1));
    }

    #[test]
    fn close_resets_scan_view() {
        let mut nav = NavigationController::new();
        let ticket = nav.handle(NavEvent::RequestScan).unwrap();
        nav.handle(NavEvent::Close);
        assert!(nav.is_root());
        assert!(!nav.apply_scan(&ticket, Ok(Vec::new())));
    }
}
