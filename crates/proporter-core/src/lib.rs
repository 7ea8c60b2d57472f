// proporter-core: Export orchestration between proporter-api and the CLI.

pub mod catalog;
pub mod error;
pub mod export;
pub mod fetch;
pub mod health;
pub mod hint;
pub mod navigation;
pub mod orchestrator;
pub mod preview;
pub mod scan;
pub mod selection;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::{RESOURCE_TYPES, ResourceTypeDescriptor, descriptor, icon_for};
pub use error::CoreError;
pub use export::{BulkExportCoordinator, save_archive};
pub use fetch::{FetchTarget, Loadable, RequestTicket};
pub use health::{BackendStatus, HealthMonitor};
pub use hint::{FailureKind, classify};
pub use navigation::{NavEvent, NavigationController, View};
pub use orchestrator::{Orchestrator, Outcome};
pub use preview::{DependencyPreviewService, ResourceDetail};
pub use scan::{InstanceScanCoordinator, ScanProgress, flatten_summary};
pub use selection::{SelectionKey, SelectionStore};
pub use session::{ConnectionState, CredentialContext};

// The API crate's boundary types are part of this crate's surface.
pub use proporter_api::{
    ARCHIVE_FILENAME, Credentials, ExportArchive, InstanceSummaryEntry, ProporterClient,
    RemoteResource, ResourceDependency,
};
