//! Command handlers, one module per top-level subcommand.

pub mod browse;
pub mod config_cmd;
pub mod cookbook;
pub mod export;
pub mod generate;
pub mod health;
pub mod resources;
pub mod scan;
pub mod types;
pub mod util;
pub mod verify;

use proporter_config::BackendSettings;
use proporter_core::ProporterClient;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a backend-bound command to its handler.
pub async fn dispatch(
    cmd: Command,
    client: &ProporterClient,
    settings: &BackendSettings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::List(args) => resources::list(args, client, global).await,
        Command::Show(args) => resources::show(args, client, settings, global).await,
        Command::Export(args) => export::handle(args, client, settings, global).await,
        Command::Scan(args) => scan::handle(args, client, settings, global).await,
        Command::Verify => verify::handle(client, global).await,
        Command::Health(args) => health::handle(args, client, global).await,
        Command::Generate(args) => generate::handle(args, client, global).await,
        Command::Cookbook(args) => cookbook::handle(args, client, global).await,
        Command::Browse => browse::handle(client, settings, global).await,
        // Handled before a client exists
        Command::Types | Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
