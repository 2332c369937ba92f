//! Reading and writing repository documents.

use std::fs;
use std::path::Path;

use crate::error::{GirError, Result};
use crate::gir::Repository;

/// Read a repository document and remember where it came from.
pub fn read_repository<P: AsRef<Path>>(file_path: P) -> Result<Repository> {
    let path = file_path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| GirError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut repo: Repository =
        serde_json::from_str(&content).map_err(|source| GirError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    repo.path = path.to_string_lossy().into_owned();
    Ok(repo)
}

/// Write a repository document, pretty-printed.
pub fn write_repository<P: AsRef<Path>>(file_path: P, repo: &Repository) -> Result<()> {
    let path = file_path.as_ref();
    let content = serde_json::to_string_pretty(repo).map_err(|source| GirError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, content).map_err(|source| GirError::Io {
        path: path.to_path_buf(),
        source,
    })
}
