//! `proporter export`: bulk export of explicitly named resources.

use std::path::Path;

use serde::Serialize;

use proporter_config::BackendSettings;
use proporter_core::{
    BulkExportCoordinator, ExportArchive, ProporterClient, SelectionKey, SelectionStore,
    save_archive,
};

use crate::cli::{ExportArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

/// Printed after an archive is written.
#[derive(Serialize)]
pub(crate) struct SavedArchive {
    pub path: String,
    pub bytes: usize,
    pub resources: usize,
    pub include_dependencies: bool,
}

pub async fn handle(
    args: ExportArgs,
    client: &ProporterClient,
    settings: &BackendSettings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut store: SelectionStore = args
        .resources
        .iter()
        .map(|raw| raw.parse::<SelectionKey>())
        .collect::<Result<_, _>>()?;
    store.set_include_dependencies(!args.no_deps);

    let painter = Painter::new(&global.color);
    if store.is_any_package_selected() {
        output::print_status(
            &painter.warning("Package exports can be large and may take a while."),
            global.quiet,
        );
    }

    let creds = config::resolve_credentials(global)?;
    let exporter = BulkExportCoordinator::new(client.clone());

    let pb = util::spinner(
        format!("Exporting {} resource(s)...", store.size()),
        global.quiet,
    );
    let archive = exporter.export_store(&creds, &store).await;
    pb.finish_and_clear();
    let archive = archive?;

    let dir = util::output_dir(args.out_dir.as_deref(), settings);
    report_saved(
        &archive,
        &dir,
        store.size(),
        store.include_dependencies(),
        global,
    )
}

/// Write the archive and print where it went.
pub(crate) fn report_saved(
    archive: &ExportArchive,
    dir: &Path,
    resources: usize,
    include_dependencies: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let path = save_archive(archive, dir)?;
    let saved = SavedArchive {
        path: path.display().to_string(),
        bytes: archive.len(),
        resources,
        include_dependencies,
    };

    let painter = Painter::new(&global.color);
    let out = output::render_single(
        &global.output,
        &saved,
        |s| {
            painter.success(&format!(
                "Saved {} ({}, {} resource(s){})",
                s.path,
                util::human_size(s.bytes),
                s.resources,
                if s.include_dependencies {
                    " with dependencies"
                } else {
                    ""
                }
            ))
        },
        |s| s.path.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
