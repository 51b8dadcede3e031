//! Small helpers shared by the flat-file stores under the data directory.
//! Every store is read whole at startup and rewritten whole on change.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading or writing a flat-file store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Malformed line {line} in {path}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Reads a file, treating a missing file as `None`.
pub fn read_optional(path: &Path) -> StoreResult<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Replaces a file's contents, creating parent directories as needed.
pub fn write_whole(path: &Path, contents: &str) -> StoreResult<()> {
    let io_error = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, contents).map_err(io_error)
}

/// Splits a `key,value` line, numbering errors from 1.
pub(crate) fn split_pair<'a>(
    path: &Path,
    index: usize,
    line: &'a str,
) -> StoreResult<(&'a str, &'a str)> {
    line.split_once(',')
        .map(|(key, value)| (key.trim(), value.trim()))
        .ok_or_else(|| StoreError::Malformed {
            path: path.to_path_buf(),
            line: index + 1,
            reason: "expected two comma-separated fields".to_string(),
        })
}
