//! `proporter generate`: natural-language prompt to HCL.

use proporter_core::ProporterClient;

use crate::cli::{GenerateArgs, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

pub async fn handle(
    args: GenerateArgs,
    client: &ProporterClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if args.prompt.trim().is_empty() {
        return Err(CliError::Validation {
            field: "prompt".into(),
            reason: "must not be empty".into(),
        });
    }

    let pb = util::spinner("Generating...", global.quiet);
    let resp = client
        .generate_hcl(&args.prompt, args.context.as_deref())
        .await;
    pb.finish_and_clear();
    let hcl = resp?.hcl;

    match args.file {
        Some(path) => {
            std::fs::write(&path, &hcl).map_err(|source| CliError::WriteFailed {
                path: path.display().to_string(),
                source,
            })?;
            let painter = Painter::new(&global.color);
            output::print_status(
                &painter.success(&format!("Saved {}", path.display())),
                global.quiet,
            );
        }
        None => output::print_output(&hcl, global.quiet),
    }
    Ok(())
}
