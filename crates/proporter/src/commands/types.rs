//! `proporter types`: the browsable resource catalog.

use tabled::Tabled;

use proporter_core::{RESOURCE_TYPES, ResourceTypeDescriptor};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "")]
    icon: &'static str,
    #[tabled(rename = "Type")]
    id: &'static str,
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Description")]
    description: &'static str,
}

impl From<&ResourceTypeDescriptor> for TypeRow {
    fn from(d: &ResourceTypeDescriptor) -> Self {
        Self {
            icon: d.icon,
            id: d.id,
            name: d.name,
            description: d.description,
        }
    }
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_list(
        &global.output,
        RESOURCE_TYPES,
        TypeRow::from,
        |d| d.id.to_owned(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
