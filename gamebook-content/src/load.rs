//! Asynchronous content file access.
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::ContentError;

/// Read `path` and parse it as JSON.
///
/// # Errors
///
/// Returns [`ContentError::Io`] if the file cannot be read and
/// [`ContentError::Json`] if it is not valid JSON.
pub async fn read_json(path: &Path) -> Result<Value, ContentError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_slice(&bytes).map_err(|source| ContentError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// List the `*.json` files directly inside `dir`, sorted by path.
///
/// # Errors
///
/// Returns [`ContentError::Io`] if the directory cannot be listed.
pub async fn json_files(dir: &Path) -> Result<Vec<PathBuf>, ContentError> {
    let io_err = |source| ContentError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let path = entry.path();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json && entry.file_type().await.map_err(io_err)?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Returns true when `path` exists. Errors other than "not found" count as present
/// so that the subsequent read reports them.
pub async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(true)
}
