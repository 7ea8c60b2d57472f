// ── Selection store ──
//
// Resources chosen for bulk export, keyed by (type id, numeric id). Numeric
// ids are only unique within a type, so the type is part of the key.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use proporter_api::ExportResourceRef;

use crate::catalog::PACKAGES_TYPE;
use crate::error::CoreError;

/// Globally unique resource identity. Text form is `type:id`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectionKey {
    pub resource_type: String,
    pub id: u64,
}

impl SelectionKey {
    pub fn new(resource_type: impl Into<String>, id: u64) -> Self {
        Self {
            resource_type: resource_type.into(),
            id,
        }
    }

    pub fn to_export_ref(&self) -> ExportResourceRef {
        ExportResourceRef {
            resource_type: self.resource_type.clone(),
            id: self.id,
        }
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.id)
    }
}

impl FromStr for SelectionKey {
    type Err = CoreError;

    /// Splits at the last `:` so type ids may themselves contain colons.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidSelectionKey(s.to_owned());
        let (resource_type, id) = s.rsplit_once(':').ok_or_else(invalid)?;
        if resource_type.is_empty() {
            return Err(invalid());
        }
        let id = id.parse().map_err(|_| invalid())?;
        Ok(Self::new(resource_type, id))
    }
}

/// Set of selected resources plus the include-dependencies flag.
///
/// Ordered, so export requests list resources deterministically.
#[derive(Debug, Clone)]
pub struct SelectionStore {
    keys: BTreeSet<SelectionKey>,
    include_dependencies: bool,
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self {
            keys: BTreeSet::new(),
            include_dependencies: true,
        }
    }
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `(resource_type, id)`. Returns `true` if the key
    /// is selected afterwards.
    pub fn toggle(&mut self, resource_type: &str, id: u64) -> bool {
        let key = SelectionKey::new(resource_type, id);
        if self.keys.remove(&key) {
            false
        } else {
            self.keys.insert(key);
            true
        }
    }

    /// Drop every key. The include-dependencies flag is kept.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn has(&self, resource_type: &str, id: u64) -> bool {
        self.keys.contains(&SelectionKey::new(resource_type, id))
    }

    pub fn size(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// True if any selected key is a package. Drives a warning only;
    /// package binaries are never part of an export.
    pub fn is_any_package_selected(&self) -> bool {
        self.keys.iter().any(|k| k.resource_type == PACKAGES_TYPE)
    }

    pub fn include_dependencies(&self) -> bool {
        self.include_dependencies
    }

    pub fn set_include_dependencies(&mut self, include: bool) {
        self.include_dependencies = include;
    }

    pub fn keys(&self) -> impl Iterator<Item = &SelectionKey> {
        self.keys.iter()
    }

    /// The selection as bulk-export request entries.
    pub fn to_export_refs(&self) -> Vec<ExportResourceRef> {
        self.keys.iter().map(SelectionKey::to_export_ref).collect()
    }
}

impl FromIterator<SelectionKey> for SelectionStore {
    fn from_iter<I: IntoIterator<Item = SelectionKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
            include_dependencies: true,
        }
    }
}
