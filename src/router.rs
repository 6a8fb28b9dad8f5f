//! Decides what a request path turns into: a listing, a file, or a 404.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{error, info, warn};

use crate::error::ListingError;
use crate::listing::{build_listing, ListingViewModel};
use crate::paths::{resolve, RequestPath};

#[derive(Debug)]
pub enum RouteDecision {
    ServeListing(ListingViewModel),
    /// A regular file inside the root.
    ServeFile {
        /// Canonical path, symlinks resolved.
        path: PathBuf,
        /// Last segment of the request, which is the link's name when a
        /// symlink was requested.
        name: String,
    },
    NotFound,
}

/// Routes a decoded request path (leading `/` optional) against `root`.
///
/// `root` must be canonical. Every failure collapses into
/// [`RouteDecision::NotFound`] after being logged.
pub async fn route(root: &Path, raw_path: &str) -> RouteDecision {
    match try_route(root, raw_path).await {
        Ok(decision) => decision,
        Err(err) => {
            log_rejection(raw_path, &err);
            RouteDecision::NotFound
        }
    }
}

async fn try_route(root: &Path, raw_path: &str) -> Result<RouteDecision, ListingError> {
    let request = RequestPath::parse(raw_path)?;
    let resolved = resolve(root, &request).await?;

    let metadata = fs::metadata(&resolved)
        .await
        .map_err(|e| ListingError::from_io(&resolved, e))?;

    if metadata.is_dir() {
        let view = build_listing(root, &request).await?;
        Ok(RouteDecision::ServeListing(view))
    } else if metadata.is_file() {
        let name = request
            .segments()
            .last()
            .cloned()
            .unwrap_or_else(|| "download".to_string());
        Ok(RouteDecision::ServeFile {
            path: resolved,
            name,
        })
    } else {
        info!("Not a file or directory: {}", resolved.display());
        Ok(RouteDecision::NotFound)
    }
}

fn log_rejection(raw_path: &str, err: &ListingError) {
    match err {
        ListingError::PathEscape(_) => warn!("Path traversal attempt: {:?}: {}", raw_path, err),
        ListingError::InvalidPath(_) => info!("Rejected {:?}: {}", raw_path, err),
        ListingError::PermissionDenied(_) => warn!("Refusing {:?}: {}", raw_path, err),
        ListingError::Io(_) | ListingError::Stat { .. } => {
            error!("Failed to route {:?}: {}", raw_path, err)
        }
        ListingError::NotFound(_) | ListingError::NotADirectory(_) => {
            info!("Not found: {:?}: {}", raw_path, err)
        }
    }
}
