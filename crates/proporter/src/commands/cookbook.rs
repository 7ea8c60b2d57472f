//! `proporter cookbook`: prompt recipes served by the backend.

use tabled::Tabled;

use proporter_api::CookbookModule;
use proporter_core::ProporterClient;

use crate::cli::{CookbookArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct RecipeRow {
    #[tabled(rename = "")]
    icon: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

impl From<&CookbookModule> for RecipeRow {
    fn from(m: &CookbookModule) -> Self {
        Self {
            icon: m.icon.clone(),
            id: m.id.clone(),
            title: m.title.clone(),
            category: m.category.clone(),
            tags: m.tags.join(", "),
        }
    }
}

pub async fn handle(
    args: CookbookArgs,
    client: &ProporterClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut modules = client.cookbook().await?.modules;
    if let Some(ref category) = args.category {
        modules.retain(|m| m.category.eq_ignore_ascii_case(category));
    }

    let out = output::render_list(&global.output, &modules, RecipeRow::from, |m| {
        m.id.clone()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
