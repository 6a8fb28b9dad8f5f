//! Maps a filesystem entry to the kind of view it gets in a listing.

use std::fs::Metadata;
use std::path::Path;

use serde::Serialize;
use tokio::fs;

use crate::error::ListingError;

/// Extensions rendered inline as `<img>`.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp"];
/// Extensions rendered inline as `<video>`.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov"];
/// Extensions rendered with the 3D model viewer.
pub const MODEL_EXTENSIONS: &[&str] = &["glb", "gltf"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    SymLink,
    Image,
    Video,
    Model3D,
    File,
}

impl EntryKind {
    /// Short lowercase tag, used as a CSS class and in JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Directory => "directory",
            EntryKind::SymLink => "symlink",
            EntryKind::Image => "image",
            EntryKind::Video => "video",
            EntryKind::Model3D => "model3d",
            EntryKind::File => "file",
        }
    }
}

/// Classifies from the three inputs that decide the kind.
///
/// First match wins: symlink, then directory, then the extension tables.
pub fn classify_parts(is_symlink: bool, is_dir: bool, extension: Option<&str>) -> EntryKind {
    if is_symlink {
        return EntryKind::SymLink;
    }
    if is_dir {
        return EntryKind::Directory;
    }

    let ext = match extension {
        Some(ext) => ext.to_ascii_lowercase(),
        None => return EntryKind::File,
    };

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        EntryKind::Image
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        EntryKind::Video
    } else if MODEL_EXTENSIONS.contains(&ext.as_str()) {
        EntryKind::Model3D
    } else {
        EntryKind::File
    }
}

/// Classifies `path` given its `lstat` metadata (symlinks not followed).
pub fn classify_metadata(path: &Path, link_metadata: &Metadata) -> EntryKind {
    classify_parts(
        link_metadata.file_type().is_symlink(),
        link_metadata.is_dir(),
        path.extension().and_then(|ext| ext.to_str()),
    )
}

/// Stats `path` without following symlinks and classifies it.
pub async fn classify(path: &Path) -> Result<EntryKind, ListingError> {
    let metadata = fs::symlink_metadata(path)
        .await
        .map_err(|source| ListingError::Stat {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(classify_metadata(path, &metadata))
}
