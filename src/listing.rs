//! Builds the view model for a single directory listing.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs;
use tracing::debug;

use crate::classify::{classify_metadata, EntryKind};
use crate::error::ListingError;
use crate::paths::{self, compose_parent_url, compose_url, RequestPath};

/// One visible entry of a listed directory.
#[derive(Serialize, Debug, Clone)]
pub struct DirEntry {
    pub name: String,
    #[serde(skip)]
    pub absolute_path: PathBuf,
    pub kind: EntryKind,
    /// `name/` for directories, `name@` for symlinks.
    pub display_name: String,
    /// Percent-encoded, rooted at `/`. Ends with `/` when the entry (or the
    /// symlink's target) is a directory.
    pub url: String,
    pub size_bytes: u64,
    pub modified: DateTime<Utc>,
}

impl DirEntry {
    /// Whether following the link leads to another listing.
    pub fn is_navigable(&self) -> bool {
        self.url.ends_with('/')
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct ListingViewModel {
    pub title: String,
    /// Decoded request path of the listed directory, e.g. `/sub/`.
    pub path: String,
    /// Filesystem path of the parent. At the root this is the root itself.
    #[serde(skip)]
    pub parent_path: String,
    pub parent_url: String,
    pub is_root: bool,
    pub entries: Vec<DirEntry>,
}

impl ListingViewModel {
    pub fn has_kind(&self, kind: EntryKind) -> bool {
        self.entries.iter().any(|entry| entry.kind == kind)
    }
}

/// Lists the directory at `request` under `root`.
///
/// `root` must be canonical. Hidden entries are dropped, entries that fail to
/// stat are skipped, and the rest are sorted by name, case-insensitively.
pub async fn build_listing(
    root: &Path,
    request: &RequestPath,
) -> Result<ListingViewModel, ListingError> {
    let dir = paths::resolve(root, request).await?;

    let metadata = fs::metadata(&dir)
        .await
        .map_err(|e| ListingError::from_io(&dir, e))?;
    if !metadata.is_dir() {
        return Err(ListingError::NotADirectory(dir));
    }

    let mut reader = fs::read_dir(&dir)
        .await
        .map_err(|e| ListingError::from_io(&dir, e))?;

    let mut entries = Vec::new();
    loop {
        let entry = match reader.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => return Err(ListingError::from_io(&dir, e)),
        };

        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                debug!("Skipping non-UTF8 entry {:?} in {}", raw, dir.display());
                continue;
            }
        };
        if name.starts_with('.') {
            continue;
        }

        match describe_entry(request, entry.path(), name).await {
            Ok(item) => entries.push(item),
            Err(e) => debug!("Skipping entry: {}", e),
        }
    }

    sort_entries(&mut entries);

    let parent = request.parent();
    let parent_path = if parent.is_root() {
        root.to_path_buf()
    } else {
        root.join(parent.to_relative())
    };

    Ok(ListingViewModel {
        title: format!("Directory listing for {}", request),
        path: request.to_string(),
        parent_path: parent_path.display().to_string(),
        parent_url: compose_parent_url(request),
        is_root: request.is_root(),
        entries,
    })
}

/// Case-insensitive by name; exact name breaks ties so output is stable.
pub fn sort_entries(entries: &mut [DirEntry]) {
    entries.sort_by_cached_key(|entry| (entry.name.to_lowercase(), entry.name.clone()));
}

async fn describe_entry(
    prefix: &RequestPath,
    path: PathBuf,
    name: String,
) -> Result<DirEntry, ListingError> {
    let stat_error = |source| ListingError::Stat {
        path: path.clone(),
        source,
    };

    let link_metadata = fs::symlink_metadata(&path).await.map_err(stat_error)?;
    let kind = classify_metadata(&path, &link_metadata);

    // Size, mtime and navigability come from the target; a dangling link fails here.
    let metadata = if link_metadata.file_type().is_symlink() {
        fs::metadata(&path).await.map_err(stat_error)?
    } else {
        link_metadata
    };

    let mut url = compose_url(prefix, &name);
    if metadata.is_dir() {
        url.push('/');
    }

    let display_name = match kind {
        EntryKind::Directory => format!("{}/", name),
        EntryKind::SymLink => format!("{}@", name),
        _ => name.clone(),
    };

    let modified: DateTime<Utc> = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH).into();

    Ok(DirEntry {
        name,
        absolute_path: path,
        kind,
        display_name,
        url,
        size_bytes: metadata.len(),
        modified,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    fn canonical_root(temp_dir: &TempDir) -> PathBuf {
        temp_dir.path().canonicalize().unwrap()
    }

    fn create_test_structure(dir: &Path) {
        std::fs::write(dir.join("a.txt"), vec![b'x'; 100]).unwrap();
        std::fs::write(dir.join("b.png"), b"png").unwrap();
        std::fs::write(dir.join(".hidden"), b"hidden").unwrap();
        std::fs::create_dir(dir.join("sub")).unwrap();
        std::fs::write(dir.join("sub/inner.glb"), b"glb").unwrap();
    }

    fn names(view: &ListingViewModel) -> Vec<&str> {
        view.entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_root_listing_scenario() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);
        create_test_structure(&root);

        let view = build_listing(&root, &RequestPath::root()).await.unwrap();

        assert_eq!(names(&view), ["a.txt", "b.png", "sub"]);
        assert_eq!(view.entries[0].kind, EntryKind::File);
        assert_eq!(view.entries[0].size_bytes, 100);
        assert_eq!(view.entries[1].kind, EntryKind::Image);
        assert_eq!(view.entries[2].kind, EntryKind::Directory);
        assert_eq!(view.entries[2].display_name, "sub/");
        assert_eq!(view.entries[2].url, "/sub/");
        assert_eq!(view.entries[0].absolute_path, root.join("a.txt"));
    }

    #[tokio::test]
    async fn test_root_parent_is_self() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);

        let view = build_listing(&root, &RequestPath::root()).await.unwrap();

        assert!(view.is_root);
        assert_eq!(view.parent_url, "/");
        assert_eq!(view.parent_path, root.display().to_string());
        assert_eq!(view.title, "Directory listing for /");
    }

    #[tokio::test]
    async fn test_nested_listing_urls() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);
        create_test_structure(&root);

        let request = RequestPath::parse("sub").unwrap();
        let view = build_listing(&root, &request).await.unwrap();

        assert!(!view.is_root);
        assert_eq!(view.path, "/sub/");
        assert_eq!(view.parent_url, "/");
        assert_eq!(view.entries.len(), 1);
        assert_eq!(view.entries[0].kind, EntryKind::Model3D);
        assert_eq!(view.entries[0].url, "/sub/inner.glb");
    }

    #[tokio::test]
    async fn test_sort_is_case_insensitive() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);
        for name in ["banana", "Cherry", "apple", "Apple2"] {
            std::fs::write(root.join(name), b"").unwrap();
        }

        let view = build_listing(&root, &RequestPath::root()).await.unwrap();
        assert_eq!(names(&view), ["apple", "Apple2", "banana", "Cherry"]);
    }

    #[tokio::test]
    async fn test_hidden_entries_never_listed() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);
        std::fs::create_dir(root.join(".git")).unwrap();
        std::fs::write(root.join(".env"), b"").unwrap();
        std::fs::write(root.join("visible"), b"").unwrap();

        let view = build_listing(&root, &RequestPath::root()).await.unwrap();
        assert_eq!(names(&view), ["visible"]);
    }

    #[tokio::test]
    async fn test_symlinks_display_with_marker() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);
        create_test_structure(&root);
        symlink(root.join("sub"), root.join("to_sub")).unwrap();
        symlink(root.join("a.txt"), root.join("to_file")).unwrap();

        let view = build_listing(&root, &RequestPath::root()).await.unwrap();

        let to_sub = view.entries.iter().find(|e| e.name == "to_sub").unwrap();
        assert_eq!(to_sub.kind, EntryKind::SymLink);
        assert_eq!(to_sub.display_name, "to_sub@");
        assert_eq!(to_sub.url, "/to_sub/");
        assert!(to_sub.is_navigable());

        let to_file = view.entries.iter().find(|e| e.name == "to_file").unwrap();
        assert_eq!(to_file.display_name, "to_file@");
        assert_eq!(to_file.url, "/to_file");
        assert_eq!(to_file.size_bytes, 100);
    }

    #[tokio::test]
    async fn test_dangling_symlink_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);
        std::fs::write(root.join("kept.txt"), b"").unwrap();
        symlink(root.join("vanished"), root.join("dangling")).unwrap();

        let view = build_listing(&root, &RequestPath::root()).await.unwrap();
        assert_eq!(names(&view), ["kept.txt"]);
    }

    #[tokio::test]
    async fn test_reserved_characters_encoded() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);
        std::fs::create_dir(root.join("my dir")).unwrap();
        std::fs::write(root.join("my dir/a #1 & b.jpg"), b"").unwrap();

        let request = RequestPath::parse("my dir").unwrap();
        let view = build_listing(&root, &request).await.unwrap();

        let entry = &view.entries[0];
        assert_eq!(entry.url, "/my%20dir/a%20%231%20%26%20b.jpg");
        let decoded = urlencoding::decode(&entry.url).unwrap();
        assert!(decoded.ends_with("/a #1 & b.jpg"));
        assert_eq!(view.parent_url, "/");
    }

    #[tokio::test]
    async fn test_listing_is_repeatable() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);
        create_test_structure(&root);

        let first = build_listing(&root, &RequestPath::root()).await.unwrap();
        let second = build_listing(&root, &RequestPath::root()).await.unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_not_found_and_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);
        create_test_structure(&root);

        let missing = RequestPath::parse("missing").unwrap();
        assert!(matches!(
            build_listing(&root, &missing).await,
            Err(ListingError::NotFound(_))
        ));

        let file = RequestPath::parse("a.txt").unwrap();
        assert!(matches!(
            build_listing(&root, &file).await,
            Err(ListingError::NotADirectory(_))
        ));
    }

    #[tokio::test]
    async fn test_symlink_out_of_root_refused() {
        let temp_dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);
        symlink(outside.path(), root.join("escape")).unwrap();

        let request = RequestPath::parse("escape").unwrap();
        assert!(matches!(
            build_listing(&root, &request).await,
            Err(ListingError::PathEscape(_))
        ));
    }

    #[tokio::test]
    async fn test_unreadable_directory() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);
        let locked = root.join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users read through mode bits; nothing to check then.
        let readable = std::fs::read_dir(&locked).is_ok();
        let result = build_listing(&root, &RequestPath::parse("locked").unwrap()).await;
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        if !readable {
            assert!(matches!(result, Err(ListingError::PermissionDenied(_))));
        }
    }
}
