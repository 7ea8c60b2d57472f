// ── Instance scan ──
//
// Full-instance inventory and "export everything". Progress is published
// on a watch channel. Scans may overlap each other (the caller's ticket
// decides which result counts); a download never overlaps a scan.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use proporter_api::{Credentials, ExportArchive, InstanceSummaryEntry, ProporterClient};
use strum::Display;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::export::BulkExportCoordinator;
use crate::selection::SelectionKey;

/// What the scan coordinator is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ScanProgress {
    Idle,
    Scanning,
    Downloading,
}

/// Releases progress when dropped, so an error or a dropped future never
/// leaves the coordinator stuck. A scan guard returns to `Idle` only once
/// the last overlapping scan is gone.
struct ProgressGuard {
    progress: Arc<watch::Sender<ScanProgress>>,
    scans: Option<Arc<AtomicUsize>>,
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        let scans = self.scans.as_deref();
        self.progress.send_if_modified(|current| {
            // The count only changes under the channel's write lock.
            if scans.is_some_and(|n| n.fetch_sub(1, Ordering::Relaxed) > 1) {
                return false;
            }
            *current = ScanProgress::Idle;
            true
        });
    }
}

#[derive(Clone)]
pub struct InstanceScanCoordinator {
    client: ProporterClient,
    exporter: BulkExportCoordinator,
    progress: Arc<watch::Sender<ScanProgress>>,
    scans: Arc<AtomicUsize>,
}

impl InstanceScanCoordinator {
    pub fn new(client: ProporterClient) -> Self {
        let (progress, _) = watch::channel(ScanProgress::Idle);
        Self {
            exporter: BulkExportCoordinator::new(client.clone()),
            client,
            progress: Arc::new(progress),
            scans: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn progress(&self) -> ScanProgress {
        *self.progress.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanProgress> {
        self.progress.subscribe()
    }

    /// Inventory every supported type on the instance.
    ///
    /// May run alongside another scan; refused while a download runs.
    pub async fn scan(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<InstanceSummaryEntry>, CoreError> {
        let _guard = self.enter(ScanProgress::Scanning)?;
        let resp = self.client.scan_instance(credentials).await?;
        let total: u64 = resp.summary.iter().map(|e| e.count).sum();
        info!(types = resp.summary.len(), total, "instance scan complete");
        Ok(resp.summary)
    }

    /// Export every item in `summary`, always with dependencies.
    ///
    /// Refused with [`CoreError::ScanInProgress`] while a scan is running.
    pub async fn export_all(
        &self,
        credentials: &Credentials,
        summary: &[InstanceSummaryEntry],
    ) -> Result<ExportArchive, CoreError> {
        let _guard = self.enter(ScanProgress::Downloading)?;
        let keys = flatten_summary(summary);
        debug!(resources = keys.len(), "exporting whole instance");
        self.exporter
            .export_selection(credentials, &keys, true)
            .await
    }

    /// Move to `next`, or refuse if it conflicts with what is running.
    /// `Scanning` joins a scan already in flight.
    fn enter(&self, next: ScanProgress) -> Result<ProgressGuard, CoreError> {
        let scanning = next == ScanProgress::Scanning;
        let mut busy = None;
        self.progress.send_if_modified(|current| match (*current, next) {
            (ScanProgress::Idle, _) => {
                if scanning {
                    self.scans.fetch_add(1, Ordering::Relaxed);
                }
                *current = next;
                true
            }
            (ScanProgress::Scanning, ScanProgress::Scanning) => {
                self.scans.fetch_add(1, Ordering::Relaxed);
                false
            }
            (running, _) => {
                busy = Some(running);
                false
            }
        });
        match busy {
            None => Ok(ProgressGuard {
                progress: Arc::clone(&self.progress),
                scans: scanning.then(|| Arc::clone(&self.scans)),
            }),
            Some(ScanProgress::Downloading) => Err(CoreError::ExportInProgress),
            Some(_) => Err(CoreError::ScanInProgress),
        }
    }
}

/// Every item across every entry as selection keys, in summary order,
/// without duplicates.
pub fn flatten_summary(summary: &[InstanceSummaryEntry]) -> Vec<SelectionKey> {
    let mut seen = HashSet::new();
    summary
        .iter()
        .flat_map(|entry| {
            entry
                .items
                .iter()
                .map(|item| SelectionKey::new(entry.resource_type.as_str(), item.id))
        })
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use proporter_api::RemoteResource;
    use url::Url;

    use super::*;

    fn entry(resource_type: &str, ids: &[u64]) -> InstanceSummaryEntry {
        InstanceSummaryEntry {
            resource_type: resource_type.into(),
            count: ids.len().try_into().expect("small test list"),
            items: ids
                .iter()
                .map(|id| RemoteResource {
                    id: *id,
                    name: format!("{resource_type}_{id}"),
                })
                .collect(),
        }
    }

    #[test]
    fn flatten_keeps_order_and_drops_duplicates() {
        let keys = flatten_summary(&[
            entry("policies", &[1, 2]),
            entry("scripts", &[]),
            entry("categories", &[2, 2]),
        ]);
        let text: Vec<_> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(text, ["policies:1", "policies:2", "categories:2"]);
    }

    #[test]
    fn enter_refuses_while_busy_and_guard_resets() {
        let client = ProporterClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:9").expect("static url"),
        );
        let scan = InstanceScanCoordinator::new(client);

        let guard = scan.enter(ScanProgress::Scanning).ok();
        assert_eq!(scan.progress(), ScanProgress::Scanning);
        assert!(matches!(
            scan.enter(ScanProgress::Downloading),
            Err(CoreError::ScanInProgress)
        ));

        drop(guard);
        assert_eq!(scan.progress(), ScanProgress::Idle);
        assert_eq!(ScanProgress::Downloading.to_string(), "downloading");
    }

    #[test]
    fn overlapping_scans_stay_scanning_until_the_last_ends() {
        let client = ProporterClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:9").expect("static url"),
        );
        let scan = InstanceScanCoordinator::new(client);

        let first = scan.enter(ScanProgress::Scanning).ok();
        let second = scan.enter(ScanProgress::Scanning).ok();
        assert!(first.is_some() && second.is_some());

        drop(first);
        assert_eq!(scan.progress(), ScanProgress::Scanning);
        assert!(matches!(
            scan.enter(ScanProgress::Downloading),
            Err(CoreError::ScanInProgress)
        ));

        drop(second);
        assert_eq!(scan.progress(), ScanProgress::Idle);

        let download = scan.enter(ScanProgress::Downloading).ok();
        assert!(matches!(
            scan.enter(ScanProgress::Scanning),
            Err(CoreError::ExportInProgress)
        ));
        drop(download);
        assert_eq!(scan.progress(), ScanProgress::Idle);
    }
}
