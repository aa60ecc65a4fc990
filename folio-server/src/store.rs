use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/*----- */
// Store Error
/*----- */
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {error}")]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("malformed JSON in {path}: {error}")]
    Json {
        path: PathBuf,
        error: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: &Path, error: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            error,
        }
    }
}

/*----- */
// JSON files
/*----- */
// A missing file reads as None, anything else unreadable is an error
pub async fn read_json<T>(path: &Path) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
{
    let payload = match tokio::fs::read(path).await {
        Ok(payload) => payload,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(StoreError::io(path, error)),
    };

    serde_json::from_slice(&payload)
        .map(Some)
        .map_err(|error| StoreError::Json {
            path: path.to_path_buf(),
            error,
        })
}

// Writes a sibling temp file then renames it over the target, readers never
// see a half written document
pub async fn write_json<T>(path: &Path, value: &T) -> Result<(), StoreError>
where
    T: Serialize,
{
    let payload = serde_json::to_vec_pretty(value).map_err(|error| StoreError::Json {
        path: path.to_path_buf(),
        error,
    })?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|error| StoreError::io(parent, error))?;
    }

    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    let temp_path = PathBuf::from(temp_path);

    tokio::fs::write(&temp_path, payload)
        .await
        .map_err(|error| StoreError::io(&temp_path, error))?;
    tokio::fs::rename(&temp_path, path)
        .await
        .map_err(|error| StoreError::io(path, error))
}
