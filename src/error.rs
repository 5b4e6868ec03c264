//! Error taxonomy for snapshotting and reconciliation.
//!
//! Every filesystem failure is classified into one of three kinds so callers
//! can distinguish a vanished path from a permission problem from a plain
//! I/O failure. Errors abort the directory level that raised them; the next
//! scheduled pass retries from the tree root.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by the snapshot builder, planner, and reconciler
#[derive(Debug, Error)]
pub enum SyncError {
    /// A directory or file disappeared between listing and processing
    #[error("path not found: {0}")]
    PathNotFound(PathBuf),

    /// Permission failure on a path
    #[error("access denied: {0}")]
    AccessDenied(PathBuf),

    /// Any other I/O failure (hash read, copy, delete)
    #[error("i/o failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid or unloadable configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Classify an `io::Error` observed while operating on `path`
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => SyncError::PathNotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => SyncError::AccessDenied(path.to_path_buf()),
            _ => SyncError::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}
