//! `proporter list` / `proporter show`: one-shot browsing.

use serde::Serialize;
use tabled::Tabled;

use proporter_config::BackendSettings;
use proporter_core::catalog::require_descriptor;
use proporter_core::preview::download_filename;
use proporter_core::{ProporterClient, RemoteResource, ResourceDependency, ResourceDetail, icon_for};

use crate::cli::{GlobalOpts, ListArgs, ShowArgs};
use crate::config;
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&RemoteResource> for ResourceRow {
    fn from(r: &RemoteResource) -> Self {
        Self {
            id: r.id,
            name: r.name.clone(),
        }
    }
}

#[derive(Tabled)]
struct DependencyRow {
    #[tabled(rename = "")]
    icon: &'static str,
    #[tabled(rename = "Type")]
    resource_type: String,
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&ResourceDependency> for DependencyRow {
    fn from(d: &ResourceDependency) -> Self {
        Self {
            icon: icon_for(&d.resource_type),
            resource_type: d.resource_type.clone(),
            id: d.id,
            name: d.name.clone(),
        }
    }
}

/// Structured form of `show` for json/yaml output.
#[derive(Serialize)]
struct ShowOutput<'a> {
    resource_type: &'a str,
    id: u64,
    resource: &'a serde_json::Value,
    dependencies: &'a [ResourceDependency],
    hcl: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    bundle_hcl: Option<&'a str>,
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn list(
    args: ListArgs,
    client: &ProporterClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let descriptor = require_descriptor(&args.resource_type)?;
    let creds = config::resolve_credentials(global)?;

    let pb = util::spinner(format!("Loading {}...", descriptor.name), global.quiet);
    let resp = client.list_resources(&creds, descriptor.id).await;
    pb.finish_and_clear();
    let resources = resp?.resources;

    let out = output::render_list(&global.output, &resources, ResourceRow::from, |r| {
        r.id.to_string()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn show(
    args: ShowArgs,
    client: &ProporterClient,
    settings: &BackendSettings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let descriptor = require_descriptor(&args.resource_type)?;
    let creds = config::resolve_credentials(global)?;

    let pb = util::spinner("Loading dependencies...", global.quiet);
    let resp = client
        .get_resource_detail(&creds, descriptor.id, args.id)
        .await;
    pb.finish_and_clear();
    let detail = ResourceDetail::from(resp?);

    let view = ShowOutput {
        resource_type: descriptor.id,
        id: args.id,
        resource: &detail.resource,
        dependencies: &detail.dependencies,
        hcl: &detail.hcl,
        bundle_hcl: detail.bundle_hcl.as_deref(),
    };
    let painter = Painter::new(&global.color);
    let out = output::render_single(
        &global.output,
        &view,
        |v| render_detail(v, painter),
        |v| v.hcl.to_owned(),
    );
    output::print_output(&out, global.quiet);

    if args.download {
        let name = resource_name(&detail.resource)
            .map_or_else(|| format!("{}_{}", descriptor.id, args.id), str::to_owned);
        let dir = util::output_dir(args.out_dir.as_deref(), settings);
        std::fs::create_dir_all(&dir).map_err(|source| CliError::WriteFailed {
            path: dir.display().to_string(),
            source,
        })?;
        let path = dir.join(download_filename(&name));
        std::fs::write(&path, detail.download_content()).map_err(|source| {
            CliError::WriteFailed {
                path: path.display().to_string(),
                source,
            }
        })?;
        output::print_status(
            &painter.success(&format!("Saved {}", path.display())),
            global.quiet,
        );
    }
    Ok(())
}

// ── Detail rendering ────────────────────────────────────────────────

fn render_detail(v: &ShowOutput<'_>, painter: Painter) -> String {
    let mut lines = Vec::new();
    let title = resource_name(v.resource).unwrap_or("(unnamed)");
    lines.push(painter.heading(&format!(
        "{} {} #{}: {title}",
        icon_for(v.resource_type),
        v.resource_type,
        v.id
    )));
    lines.push(String::new());

    if v.dependencies.is_empty() {
        lines.push(painter.dim("No dependencies"));
    } else {
        lines.push(format!("Dependencies ({}):", v.dependencies.len()));
        lines.push(dependency_table(v.dependencies));
    }

    lines.push(String::new());
    lines.push(painter.heading("HCL"));
    lines.push(v.hcl.to_owned());
    if v.bundle_hcl.is_some() {
        lines.push(painter.dim("(bundle with dependencies available via --download)"));
    }
    lines.join("\n")
}

pub(crate) fn dependency_table(dependencies: &[ResourceDependency]) -> String {
    let rows: Vec<DependencyRow> = dependencies.iter().map(DependencyRow::from).collect();
    output::render_table(&rows)
}

/// Display name from the raw resource attributes, if the backend sent one.
fn resource_name(resource: &serde_json::Value) -> Option<&str> {
    resource
        .get("name")
        .or_else(|| resource.get("general").and_then(|g| g.get("name")))
        .or_else(|| resource.get("displayName"))
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
}
