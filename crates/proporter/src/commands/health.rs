//! `proporter health`: backend reachability, once or continuously.

use std::time::Duration;

use serde::Serialize;

use proporter_core::{BackendStatus, HealthMonitor, ProporterClient};

use crate::cli::{GlobalOpts, HealthArgs};
use crate::error::CliError;
use crate::output::{self, Painter};

#[derive(Serialize)]
struct HealthReport {
    backend: String,
    status: String,
}

pub async fn handle(
    args: HealthArgs,
    client: &ProporterClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if args.watch {
        return watch(args.interval, client, global).await;
    }

    let online = client.health_check().await;
    let status = if online {
        BackendStatus::Online
    } else {
        BackendStatus::Offline
    };
    print_status(client, status, global);

    if online {
        Ok(())
    } else {
        Err(CliError::BackendOffline {
            url: client.base_url().to_string(),
        })
    }
}

/// Poll until ctrl-c, printing every status change.
async fn watch(interval: u64, client: &ProporterClient, global: &GlobalOpts) -> Result<(), CliError> {
    let monitor = HealthMonitor::spawn(client.clone(), Duration::from_secs(interval.max(1)));
    let mut status = monitor.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *status.borrow_and_update();
                print_status(client, current, global);
            }
        }
    }

    monitor.shutdown().await;
    Ok(())
}

fn print_status(client: &ProporterClient, status: BackendStatus, global: &GlobalOpts) {
    let report = HealthReport {
        backend: client.base_url().to_string(),
        status: status.to_string(),
    };
    let painter = Painter::new(&global.color);
    let out = output::render_single(
        &global.output,
        &report,
        |r| {
            let label = match status {
                BackendStatus::Online => painter.success(&r.status),
                BackendStatus::Offline => painter.failure(&r.status),
                BackendStatus::Unknown => painter.dim(&r.status),
            };
            format!("{}: {label}", r.backend)
        },
        |r| r.status.clone(),
    );
    output::print_output(&out, global.quiet);
}
