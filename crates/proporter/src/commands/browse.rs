//! `proporter browse`: interactive session over the orchestrator.
//!
//! Root menu → browse one type (select, preview, export) or scan the whole
//! instance (export everything). Failures are shown inline with a hint and
//! the session stays where it was.

use std::io::IsTerminal;

use dialoguer::{MultiSelect, Select};

use proporter_config::BackendSettings;
use proporter_core::{
    InstanceSummaryEntry, Loadable, NavEvent, Orchestrator, ProporterClient, RESOURCE_TYPES,
    RemoteResource, ScanProgress, View, classify,
};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util::{self, prompt_err};
use super::scan::SummaryRow;
use super::{export, resources};

/// What the loop does after a menu returns.
enum Flow {
    Continue,
    Quit,
}

pub async fn handle(
    client: &ProporterClient,
    settings: &BackendSettings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NotInteractive {
            command: "browse".into(),
        });
    }

    let creds = config::resolve_credentials(global)?;
    let mut session = Session {
        orch: Orchestrator::new(client.clone()),
        settings,
        global,
        painter: Painter::new(&global.color),
    };

    let pb = util::spinner(format!("Connecting to {}...", creds.url()), global.quiet);
    let login = session.orch.login(creds).await;
    pb.finish_and_clear();
    login?;

    let result = session.run().await;
    session.orch.disconnect();
    result
}

struct Session<'a> {
    orch: Orchestrator,
    settings: &'a BackendSettings,
    global: &'a GlobalOpts,
    painter: Painter,
}

impl Session<'_> {
    async fn run(&mut self) -> Result<(), CliError> {
        loop {
            let browsing = matches!(self.orch.view(), View::Browsing(_));
            let scanning = matches!(self.orch.view(), View::Scanning(_));
            let flow = if browsing {
                self.browse_menu().await?
            } else if scanning {
                self.scan_menu().await?
            } else {
                self.root_menu().await?
            };
            if matches!(flow, Flow::Quit) {
                return Ok(());
            }
        }
    }

    // ── Shared ───────────────────────────────────────────────────────

    /// Wait for outstanding fetches behind a spinner.
    async fn settle(&mut self, label: &str) {
        let pb = util::spinner(label, self.global.quiet);
        self.orch.settle().await;
        pb.finish_and_clear();
    }

    fn show_failure(&self, message: &str) {
        eprintln!("{}", self.painter.failure(&format!("✗ {message}")));
        eprintln!("  {}", self.painter.dim(classify(message).hint()));
    }

    fn report(&self, err: &CliError) {
        self.show_failure(&err.to_string());
    }

    fn choose(prompt: &str, items: &[String]) -> Result<Option<usize>, CliError> {
        Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact_opt()
            .map_err(prompt_err)
    }

    // ── Root ─────────────────────────────────────────────────────────

    async fn root_menu(&mut self) -> Result<Flow, CliError> {
        let mut items: Vec<String> = RESOURCE_TYPES
            .iter()
            .map(|d| format!("{} {}", d.icon, d.name))
            .collect();
        items.push("🔍 Scan entire instance".into());
        items.push("Quit".into());

        let Some(choice) = Self::choose("What do you want to export?", &items)? else {
            return Ok(Flow::Quit);
        };

        let event = match RESOURCE_TYPES.get(choice) {
            Some(descriptor) => NavEvent::ChooseType(descriptor.id.to_owned()),
            None if choice == RESOURCE_TYPES.len() => NavEvent::RequestScan,
            None => return Ok(Flow::Quit),
        };
        let label = match &event {
            NavEvent::RequestScan => "Scanning instance...".to_owned(),
            _ => format!("Loading {}...", items[choice]),
        };
        self.orch.navigate(event)?;
        self.settle(&label).await;
        Ok(Flow::Continue)
    }

    // ── Browsing ─────────────────────────────────────────────────────

    async fn browse_menu(&mut self) -> Result<Flow, CliError> {
        let Some(descriptor) = self.orch.navigation().current_type() else {
            return Ok(Flow::Continue);
        };

        if let Some(message) = self.orch.navigation().error().map(str::to_owned) {
            self.show_failure(&message);
            return self.failed_view_menu().await;
        }

        let resources: Vec<RemoteResource> = self
            .orch
            .navigation()
            .listing()
            .and_then(Loadable::loaded)
            .cloned()
            .unwrap_or_default();
        let (selected, include_deps) = self
            .orch
            .selection()
            .map_or((0, true), |s| (s.size(), s.include_dependencies()));

        println!(
            "\n{}",
            self.painter.heading(&format!(
                "{} {}: {} available, {} selected",
                descriptor.icon,
                descriptor.name,
                resources.len(),
                selected
            ))
        );

        let items = vec![
            "Select resources".to_owned(),
            "Preview a resource".to_owned(),
            format!(
                "Include dependencies: {}",
                if include_deps { "on" } else { "off" }
            ),
            format!("Export {selected} selected"),
            "Back".to_owned(),
            "Quit".to_owned(),
        ];
        match Self::choose("Action", &items)? {
            Some(0) => self.pick_resources(&resources)?,
            Some(1) => self.preview_menu(&resources).await?,
            Some(2) => self.orch.set_include_dependencies(!include_deps),
            Some(3) => self.export_selection().await?,
            Some(4) | None => {
                self.orch.navigate(NavEvent::Back)?;
            }
            Some(_) => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Retry or leave a view whose fetch failed.
    async fn failed_view_menu(&mut self) -> Result<Flow, CliError> {
        let items = ["Retry".to_owned(), "Back".to_owned(), "Quit".to_owned()];
        match Self::choose("Action", &items)? {
            Some(0) => {
                self.orch.retry()?;
                self.settle("Retrying...").await;
            }
            Some(1) | None => {
                self.orch.navigate(NavEvent::Back)?;
            }
            Some(_) => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn pick_resources(&mut self, resources: &[RemoteResource]) -> Result<(), CliError> {
        if resources.is_empty() {
            println!("{}", self.painter.dim("Nothing to select."));
            return Ok(());
        }
        let Some(selection) = self.orch.selection() else {
            return Ok(());
        };
        let Some(descriptor) = self.orch.navigation().current_type() else {
            return Ok(());
        };
        let current: Vec<bool> = resources
            .iter()
            .map(|r| selection.has(descriptor.id, r.id))
            .collect();
        let labels: Vec<String> = resources
            .iter()
            .map(|r| format!("#{} {}", r.id, r.name))
            .collect();

        let Some(chosen) = MultiSelect::new()
            .with_prompt("Space to toggle, enter to confirm")
            .items(&labels)
            .defaults(&current)
            .interact_opt()
            .map_err(prompt_err)?
        else {
            return Ok(());
        };

        for (idx, resource) in resources.iter().enumerate() {
            if chosen.contains(&idx) != current[idx] {
                self.orch.toggle(resource.id);
            }
        }
        Ok(())
    }

    async fn export_selection(&mut self) -> Result<(), CliError> {
        let Some(selection) = self.orch.selection() else {
            return Ok(());
        };
        if selection.is_empty() {
            self.report(&CliError::EmptySelection);
            return Ok(());
        }
        let (count, include_deps) = (selection.size(), selection.include_dependencies());
        if selection.is_any_package_selected() {
            eprintln!(
                "{}",
                self.painter
                    .warning("Package exports can be large and may take a while.")
            );
            if !util::confirm("Continue?", self.global.yes)? {
                return Ok(());
            }
        }

        let pb = util::spinner(format!("Exporting {count} resource(s)..."), self.global.quiet);
        let archive = self.orch.export_selection().await;
        pb.finish_and_clear();

        match archive {
            Ok(archive) => {
                let dir = self.settings.output_dir.clone();
                if let Err(err) =
                    export::report_saved(&archive, &dir, count, include_deps, self.global)
                {
                    self.report(&err);
                }
            }
            Err(err) => self.report(&err.into()),
        }
        Ok(())
    }

    // ── Preview ──────────────────────────────────────────────────────

    async fn preview_menu(&mut self, resources: &[RemoteResource]) -> Result<(), CliError> {
        if resources.is_empty() {
            return Ok(());
        }
        let labels: Vec<String> = resources
            .iter()
            .map(|r| format!("#{} {}", r.id, r.name))
            .collect();
        let Some(idx) = Self::choose("Preview which resource?", &labels)? else {
            return Ok(());
        };
        let resource = &resources[idx];
        self.orch.open_preview(resource.id, resource.name.clone())?;
        self.settle("Loading dependencies...").await;

        loop {
            let preview = self.orch.preview();
            if let Some(message) = preview.state().and_then(Loadable::error) {
                let message = message.to_owned();
                self.show_failure(&message);
                let items = ["Retry".to_owned(), "Close".to_owned()];
                if Self::choose("Action", &items)? == Some(0) {
                    self.orch.retry_preview()?;
                    self.settle("Loading dependencies...").await;
                    continue;
                }
                break;
            }

            let Some(detail) = preview.detail() else {
                break;
            };
            println!(
                "\n{}",
                self.painter.heading(&format!(
                    "{}: {} dependencies",
                    resource.name,
                    detail.dependencies.len()
                ))
            );
            if detail.dependencies.is_empty() {
                println!("{}", self.painter.dim("No dependencies"));
            } else {
                println!("{}", resources::dependency_table(&detail.dependencies));
            }
            println!("\n{}", detail.hcl);

            let items = ["Download .tf".to_owned(), "Close".to_owned()];
            if Self::choose("Action", &items)? == Some(0) {
                self.download_preview();
            }
            break;
        }

        self.orch.close_preview();
        Ok(())
    }

    fn download_preview(&self) {
        let preview = self.orch.preview();
        let (Some(content), Some(filename)) =
            (preview.download_content(), preview.download_filename())
        else {
            return;
        };
        let dir = &self.settings.output_dir;
        let path = dir.join(filename);
        let written = std::fs::create_dir_all(dir).and_then(|()| std::fs::write(&path, content));
        match written {
            Ok(()) => println!(
                "{}",
                self.painter
                    .success(&format!("Saved {}", path.display()))
            ),
            Err(source) => self.report(&CliError::WriteFailed {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    // ── Scanning ─────────────────────────────────────────────────────

    async fn scan_menu(&mut self) -> Result<Flow, CliError> {
        if let Some(message) = self.orch.navigation().error().map(str::to_owned) {
            self.show_failure(&message);
            return self.failed_view_menu().await;
        }

        let summary: Vec<InstanceSummaryEntry> = self
            .orch
            .navigation()
            .summary()
            .and_then(Loadable::loaded)
            .cloned()
            .unwrap_or_default();
        let total: u64 = summary.iter().map(|e| e.count).sum();

        let rows: Vec<SummaryRow> = summary.iter().map(SummaryRow::from).collect();
        println!("\n{}", output::render_table(&rows));
        println!("Total: {total} resource(s)");

        let items = [
            format!("Export everything ({total} resources)"),
            "Back".to_owned(),
            "Quit".to_owned(),
        ];
        match Self::choose("Action", &items)? {
            Some(0) => self.export_all(total).await?,
            Some(1) | None => {
                self.orch.navigate(NavEvent::Back)?;
            }
            Some(_) => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn export_all(&mut self, total: u64) -> Result<(), CliError> {
        if !util::confirm(
            &format!("Export all {total} resource(s) with dependencies?"),
            self.global.yes,
        )? {
            return Ok(());
        }

        let pb = util::spinner("Downloading archive...", self.global.quiet);
        let mut progress = self.orch.scan_progress();
        let follow = {
            let pb = pb.clone();
            tokio::spawn(async move {
                while progress.changed().await.is_ok() {
                    let state = *progress.borrow_and_update();
                    if state != ScanProgress::Idle {
                        pb.set_message(format!("{state}..."));
                    }
                }
            })
        };
        let archive = self.orch.export_all().await;
        follow.abort();
        pb.finish_and_clear();

        match archive {
            Ok(archive) => {
                let count = usize::try_from(total).unwrap_or(usize::MAX);
                let dir = self.settings.output_dir.clone();
                if let Err(err) = export::report_saved(&archive, &dir, count, true, self.global) {
                    self.report(&err);
                }
            }
            Err(err) => self.report(&err.into()),
        }
        Ok(())
    }
}
