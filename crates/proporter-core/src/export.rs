// ── Bulk export ──
//
// Turns a selection into one export request and persists the validated
// archive. Content-type verification happens in the API client; this layer
// owns the empty-selection guard and the file on disk.

use std::path::{Path, PathBuf};

use proporter_api::{ARCHIVE_FILENAME, Credentials, ExportArchive, ProporterClient};
use tracing::info;

use crate::error::CoreError;
use crate::selection::{SelectionKey, SelectionStore};

#[derive(Debug, Clone)]
pub struct BulkExportCoordinator {
    client: ProporterClient,
}

impl BulkExportCoordinator {
    pub fn new(client: ProporterClient) -> Self {
        Self { client }
    }

    /// Export `keys` as a single archive.
    ///
    /// No keys means no request: fails with [`CoreError::EmptySelection`].
    pub async fn export_selection<'a>(
        &self,
        credentials: &Credentials,
        keys: impl IntoIterator<Item = &'a SelectionKey>,
        include_dependencies: bool,
    ) -> Result<ExportArchive, CoreError> {
        let refs: Vec<_> = keys.into_iter().map(SelectionKey::to_export_ref).collect();
        if refs.is_empty() {
            return Err(CoreError::EmptySelection);
        }

        let archive = self
            .client
            .bulk_export(credentials, &refs, include_dependencies)
            .await?;
        info!(
            resources = refs.len(),
            include_dependencies,
            size = archive.len(),
            "export complete"
        );
        Ok(archive)
    }

    /// Export everything in `store`, honouring its dependency flag.
    pub async fn export_store(
        &self,
        credentials: &Credentials,
        store: &SelectionStore,
    ) -> Result<ExportArchive, CoreError> {
        self.export_selection(credentials, store.keys(), store.include_dependencies())
            .await
    }
}

/// Write `archive` into `dir` under the fixed archive filename.
///
/// Creates `dir` if needed and returns the written path.
pub fn save_archive(archive: &ExportArchive, dir: &Path) -> Result<PathBuf, CoreError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| CoreError::Io { path, source }
    };

    std::fs::create_dir_all(dir).map_err(io_err(dir))?;
    let path = dir.join(ARCHIVE_FILENAME);
    std::fs::write(&path, &archive.bytes).map_err(io_err(&path))?;
    info!(path = %path.display(), size = archive.len(), "archive saved");
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn save_writes_fixed_filename() {
        let dir = tempfile::tempdir().unwrap();
        let archive = ExportArchive {
            bytes: Bytes::from_static(b"PK\x03\x04"),
            content_type: Some("application/zip".into()),
        };

        let path = save_archive(&archive, &dir.path().join("out")).unwrap();

        assert_eq!(path.file_name().unwrap(), "jamf_export.zip");
        assert_eq!(std::fs::read(path).unwrap(), b"PK\x03\x04");
    }
}
