// SPDX-License-Identifier: Apache-2.0

//! JSON file helpers shared by the seen-key and history stores.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ScoutError;

fn storage_error(action: &str, path: &Path, e: impl std::fmt::Display) -> ScoutError {
    ScoutError::Storage {
        message: format!("Failed to {action} {}: {e}", path.display()),
    }
}

/// Reads a JSON document, returning `T::default()` if the file is missing.
///
/// # Errors
///
/// Returns `ScoutError::Storage` if the file cannot be read or parsed.
pub async fn read_json<T>(path: &Path) -> Result<T, ScoutError>
where
    T: DeserializeOwned + Default,
{
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => {
            serde_json::from_str(&contents).map_err(|e| storage_error("parse", path, e))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(storage_error("read", path, e)),
    }
}

/// Writes a JSON document atomically.
///
/// Creates the parent directory if needed, writes to a temp file and renames
/// it over the target.
///
/// # Errors
///
/// Returns `ScoutError::Storage` if any step fails.
pub async fn write_json_atomic<T>(path: &Path, value: &T) -> Result<(), ScoutError>
where
    T: Serialize + ?Sized,
{
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| storage_error("create directory for", path, e))?;
    }

    let contents =
        serde_json::to_string_pretty(value).map_err(|e| storage_error("serialize", path, e))?;

    let temp_path = path.with_extension("tmp");
    tokio::fs::write(&temp_path, contents)
        .await
        .map_err(|e| storage_error("write", &temp_path, e))?;
    tokio::fs::rename(&temp_path, path)
        .await
        .map_err(|e| storage_error("rename", path, e))?;

    Ok(())
}
