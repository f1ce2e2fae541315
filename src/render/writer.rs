use log::{debug, info};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::RenderError;

// Wipes the previous render so stale files never linger
pub async fn reset_output_dir(dir: &Path) -> Result<(), RenderError> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => info!("Removed previous output in {}", dir.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(RenderError::io(dir, e)),
    }
    ensure_output_dir(dir).await
}

pub async fn ensure_output_dir(dir: &Path) -> Result<(), RenderError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| RenderError::io(dir, e))
}

/// Serializes `value` to `<dir>/<filename>`, replacing any existing file.
pub async fn write_json_file<T: Serialize>(
    dir: &Path,
    filename: &str,
    value: &T,
) -> Result<PathBuf, RenderError> {
    let path = dir.join(filename);
    let body = serde_json::to_vec(value).map_err(|source| RenderError::Json {
        name: filename.to_string(),
        source,
    })?;
    tokio::fs::write(&path, body)
        .await
        .map_err(|e| RenderError::io(&path, e))?;
    debug!("Wrote {}", path.display());
    Ok(path)
}
