// Crash-safe file replacement shared by the stores

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::error::StoreError;

/// Sibling path used while a new version of `path` is being written
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `contents` to a temporary sibling, flush it, then rename it over `path`.
///
/// Readers of `path` observe either the previous file or the complete new one.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))?;
    }

    let tmp_path = temp_path(path);

    let mut file = tokio::fs::File::create(&tmp_path)
        .await
        .map_err(|e| StoreError::io(&tmp_path, e))?;
    file.write_all(contents)
        .await
        .map_err(|e| StoreError::io(&tmp_path, e))?;
    file.sync_all()
        .await
        .map_err(|e| StoreError::io(&tmp_path, e))?;
    drop(file);

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| StoreError::io(path, e))?;

    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Read a file, treating a missing or blank file as "no prior state"
pub async fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) if contents.trim().is_empty() => Ok(None),
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}
