mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::{CommandFactory, FromArgMatches};
use tracing_subscriber::EnvFilter;

use proporter_core::ProporterClient;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let matches = Cli::command().get_matches();
    let mut cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    };

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Config [defaults] fill display flags the user left unset
    let cfg = config::load_config_or_default();
    config::apply_display_defaults(&mut cli.global, &matches, &cfg.defaults);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli, cfg).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, cfg: config::Config) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't talk to the backend
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "proporter", &mut std::io::stdout());
            Ok(())
        }

        // Types is a static catalog
        Command::Types => commands::types::handle(&cli.global),

        // Everything else needs a backend client
        cmd => {
            let settings = config::resolve_backend(&cli.global, &cfg)?;
            let client = ProporterClient::new(settings.base_url.clone(), &settings.transport)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &client, &settings, &cli.global).await
        }
    }
}
