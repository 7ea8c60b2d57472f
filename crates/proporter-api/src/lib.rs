// proporter-api: Async Rust client for the Jamf-to-Terraform export backend

pub mod client;
pub mod credentials;
pub mod error;
pub mod export;
pub mod models;
mod resources;
mod system;
pub mod transport;

pub use client::{DEFAULT_BASE_URL, ProporterClient};
pub use credentials::Credentials;
pub use error::Error;
pub use export::{ARCHIVE_FILENAME, ExportArchive};
pub use models::{
    CookbookData, CookbookModule, ExportResourceRef, GenerateResponse, InstanceExportResponse,
    InstanceSummaryEntry, RemoteResource, ResourceDependency, ResourceDetailResponse,
    ResourceListResponse,
};
pub use transport::{TlsMode, TransportConfig};
