//! Error taxonomy for path resolution and directory listing.

use std::io;
use std::path::{Path, PathBuf};

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised while resolving a request path or building a listing.
#[derive(Debug, Error)]
pub enum ListingError {
    /// Nothing exists at the resolved path.
    #[error("path does not exist: {0}")]
    NotFound(PathBuf),

    /// The path exists but is not a directory.
    #[error("path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The directory exists but cannot be read.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The percent-encoded request path does not decode to UTF-8.
    #[error("request path is not valid UTF-8: {0}")]
    InvalidPath(String),

    /// The request path resolves outside the browsing root.
    #[error("path escapes the browsing root: {0}")]
    PathEscape(String),

    /// A single entry could not be stat'ed. Callers skip the entry.
    #[error("failed to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ListingError {
    /// Translate an `io::Error` raised for `path` into the matching variant.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ListingError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => ListingError::PermissionDenied(path.to_path_buf()),
            _ => ListingError::Io(err),
        }
    }

    /// HTTP status reported to the client.
    ///
    /// Every variant answers 404 so a client cannot tell a missing path from
    /// an unreadable or out-of-root one.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::NOT_FOUND
    }
}
