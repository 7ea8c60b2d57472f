//! `proporter verify`: check Jamf Pro credentials through the backend.

use proporter_core::ProporterClient;

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

pub async fn handle(client: &ProporterClient, global: &GlobalOpts) -> Result<(), CliError> {
    let creds = config::resolve_credentials(global)?;

    let pb = util::spinner(format!("Connecting to {}...", creds.url()), global.quiet);
    let result = client.verify_credentials(&creds).await;
    pb.finish_and_clear();
    result?;

    let painter = Painter::new(&global.color);
    output::print_output(
        &painter.success(&format!(
            "Connected to {} as {}",
            creds.url(),
            creds.username()
        )),
        global.quiet,
    );
    Ok(())
}
