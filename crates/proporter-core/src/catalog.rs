// ── Resource type catalog ──
//
// The browsable resource types, fixed at compile time. Scan summaries can
// also mention types that are not browsable (categories, buildings); those
// still get an icon through `icon_for`.

use serde::Serialize;

use crate::error::CoreError;

/// Type id whose selection triggers the package-size warning.
pub const PACKAGES_TYPE: &str = "packages";

/// Icon shown for a type id with no dedicated icon.
pub const FALLBACK_ICON: &str = "📄";

/// One browsable resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceTypeDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

/// All browsable types, in menu order.
pub const RESOURCE_TYPES: &[ResourceTypeDescriptor] = &[
    ResourceTypeDescriptor {
        id: "policies",
        name: "Policies",
        icon: "📋",
        description: "Import Jamf Pro policies",
    },
    ResourceTypeDescriptor {
        id: "smart-groups",
        name: "Smart Groups",
        icon: "👥",
        description: "Import computer/mobile smart groups",
    },
    ResourceTypeDescriptor {
        id: "config-profiles",
        name: "Configuration Profiles",
        icon: "⚙️",
        description: "Import macOS/iOS configuration profiles",
    },
    ResourceTypeDescriptor {
        id: "scripts",
        name: "Scripts",
        icon: "📜",
        description: "Import scripts from Jamf Pro",
    },
    ResourceTypeDescriptor {
        id: PACKAGES_TYPE,
        name: "Packages",
        icon: "📦",
        description: "Import package definitions",
    },
    ResourceTypeDescriptor {
        id: "jamf-app-catalog",
        name: "Jamf App Catalog",
        icon: "🍎",
        description: "Import App Installers from the Jamf App Catalog",
    },
];

/// Look up a browsable type by id.
pub fn descriptor(id: &str) -> Option<&'static ResourceTypeDescriptor> {
    RESOURCE_TYPES.iter().find(|d| d.id == id)
}

/// Like [`descriptor`], but an unknown id is an error.
pub fn require_descriptor(id: &str) -> Result<&'static ResourceTypeDescriptor, CoreError> {
    descriptor(id).ok_or_else(|| CoreError::UnknownResourceType(id.to_owned()))
}

/// Icon for any type id, browsable or not.
pub fn icon_for(type_id: &str) -> &'static str {
    if let Some(d) = descriptor(type_id) {
        return d.icon;
    }
    match type_id {
        "categories" => "🏷️",
        "buildings" => "🏢",
        _ => FALLBACK_ICON,
    }
}
