// ── Backend health monitor ──
//
// Polls `/healthz` on a fixed period and publishes online/offline on a
// watch channel. A failed probe is a status, never an error.

use std::time::Duration;

use proporter_api::ProporterClient;
use strum::Display;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Default polling period.
pub const DEFAULT_HEALTH_PERIOD: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum BackendStatus {
    /// No probe has completed yet.
    Unknown,
    Online,
    Offline,
}

/// Handle to the background poller. Dropping it stops polling.
pub struct HealthMonitor {
    status: watch::Receiver<BackendStatus>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl HealthMonitor {
    /// Start polling. The first probe runs immediately.
    pub fn spawn(client: ProporterClient, period: Duration) -> Self {
        let (tx, status) = watch::channel(BackendStatus::Unknown);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_task(client, period, tx, cancel.clone()));
        Self {
            status,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn status(&self) -> BackendStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<BackendStatus> {
        self.status.clone()
    }

    /// Stop polling and wait for the task to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_task(
    client: ProporterClient,
    period: Duration,
    tx: watch::Sender<BackendStatus>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let next = if client.health_check().await {
                    BackendStatus::Online
                } else {
                    BackendStatus::Offline
                };
                let prev = tx.send_replace(next);
                if prev != next {
                    if next == BackendStatus::Offline {
                        warn!(url = %client.base_url(), "backend is offline");
                    } else {
                        debug!(status = %next, "backend status changed");
                    }
                }
            }
        }
    }
}
