//! `proporter scan`: whole-instance inventory, optionally exported.

use tabled::Tabled;

use proporter_config::BackendSettings;
use proporter_core::{
    InstanceScanCoordinator, InstanceSummaryEntry, ProporterClient, ScanProgress, flatten_summary,
    icon_for,
};

use crate::cli::{GlobalOpts, OutputFormat, ScanArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::{export, util};

#[derive(Tabled)]
pub(crate) struct SummaryRow {
    #[tabled(rename = "")]
    icon: &'static str,
    #[tabled(rename = "Type")]
    resource_type: String,
    #[tabled(rename = "Count")]
    count: u64,
}

impl From<&InstanceSummaryEntry> for SummaryRow {
    fn from(e: &InstanceSummaryEntry) -> Self {
        Self {
            icon: icon_for(&e.resource_type),
            resource_type: e.resource_type.clone(),
            count: e.count,
        }
    }
}

pub async fn handle(
    args: ScanArgs,
    client: &ProporterClient,
    settings: &BackendSettings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let creds = config::resolve_credentials(global)?;
    let scanner = InstanceScanCoordinator::new(client.clone());

    let pb = util::spinner("Scanning instance...", global.quiet);
    let mut progress = scanner.subscribe();
    let follow = {
        let pb = pb.clone();
        tokio::spawn(async move {
            while progress.changed().await.is_ok() {
                let label = match *progress.borrow_and_update() {
                    ScanProgress::Scanning => "Scanning instance...",
                    ScanProgress::Downloading => "Downloading archive...",
                    ScanProgress::Idle => continue,
                };
                pb.set_message(label);
            }
        })
    };

    let summary = scanner.scan(&creds).await;
    let summary = match summary {
        Ok(summary) => summary,
        Err(err) => {
            follow.abort();
            pb.finish_and_clear();
            return Err(err.into());
        }
    };
    pb.suspend(|| {
        let out = output::render_list(&global.output, &summary, SummaryRow::from, |e| {
            format!("{}\t{}", e.resource_type, e.count)
        });
        output::print_output(&out, global.quiet);
        if matches!(global.output, OutputFormat::Table) && !global.quiet {
            let total: u64 = summary.iter().map(|e| e.count).sum();
            println!("Total: {total} resource(s)");
        }
    });

    if !args.export {
        follow.abort();
        pb.finish_and_clear();
        return Ok(());
    }

    let keys = flatten_summary(&summary);
    let proceed = pb.suspend(|| {
        util::confirm(
            &format!("Export all {} resource(s) with dependencies?", keys.len()),
            global.yes,
        )
    });
    if !proceed? {
        follow.abort();
        pb.finish_and_clear();
        return Ok(());
    }

    let archive = scanner.export_all(&creds, &summary).await;
    follow.abort();
    pb.finish_and_clear();
    let archive = archive?;

    let dir = util::output_dir(args.out_dir.as_deref(), settings);
    export::report_saved(&archive, &dir, keys.len(), true, global)
}
