//! Read-access gate for the music root.
//!
//! The catalog is never walked unless the root can actually be listed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("permission denied: cannot read {}", .path.display())]
    PermissionDenied { path: PathBuf },
    #[error("music directory not found: {}", .path.display())]
    NotFound { path: PathBuf },
    #[error("not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AccessError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::NotADirectory => Self::NotADirectory { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Check that `dir` is a directory this process may list.
pub fn check_access(dir: &Path) -> Result<(), AccessError> {
    let meta = fs::metadata(dir).map_err(|e| AccessError::from_io(dir, e))?;
    if !meta.is_dir() {
        return Err(AccessError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    fs::read_dir(dir).map_err(|e| AccessError::from_io(dir, e))?;
    Ok(())
}
