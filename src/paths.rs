//! Request path normalisation, root containment and URL composition.
//!
//! Every URL produced here is rooted at `/` and built from percent-encoded
//! segments, so links stay valid at any listing depth and a decoded URL
//! always maps back onto the entry name it was built from.

use std::fmt;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::ListingError;

/// A client-supplied path, already URL-decoded and lexically normalised.
///
/// Holds only plain name segments: no empty, `.` or `..` components survive
/// [`RequestPath::parse`], so joining it onto the root can never climb out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestPath {
    segments: Vec<String>,
}

impl RequestPath {
    /// The browsing root itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Normalises a decoded request path such as `sub/./dir/` or `a/../b`.
    ///
    /// A `..` that would climb above the root, or a segment containing NUL,
    /// is rejected with [`ListingError::PathEscape`].
    pub fn parse(raw: &str) -> Result<Self, ListingError> {
        let mut segments: Vec<String> = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(ListingError::PathEscape(raw.to_string()));
                    }
                }
                s if s.contains('\0') => {
                    return Err(ListingError::PathEscape(raw.to_string()));
                }
                s => segments.push(s.to_string()),
            }
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The enclosing directory. The root is its own parent.
    pub fn parent(&self) -> Self {
        let mut segments = self.segments.clone();
        segments.pop();
        Self { segments }
    }

    /// Path relative to the browsing root, suitable for `Path::join`.
    pub fn to_relative(&self) -> PathBuf {
        self.segments.iter().collect()
    }
}

impl fmt::Display for RequestPath {
    /// Decoded, root-anchored form: `/` or `/sub/dir/`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for segment in &self.segments {
            write!(f, "{segment}/")?;
        }
        Ok(())
    }
}

/// Percent-decodes the path component of a request URI.
pub fn decode_uri_path(uri_path: &str) -> Result<String, ListingError> {
    urlencoding::decode(uri_path)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| ListingError::InvalidPath(uri_path.to_string()))
}

/// Joins `request` onto `root` and checks the result stays inside it.
///
/// `root` must already be canonical. The joined path is canonicalised so a
/// symlink pointing outside the root is caught as well as lexical tricks.
pub async fn resolve(root: &Path, request: &RequestPath) -> Result<PathBuf, ListingError> {
    let joined = root.join(request.to_relative());
    let canonical = fs::canonicalize(&joined)
        .await
        .map_err(|e| ListingError::from_io(&joined, e))?;

    if !canonical.starts_with(root) {
        return Err(ListingError::PathEscape(request.to_string()));
    }
    Ok(canonical)
}

fn encode_segments<'a>(segments: impl Iterator<Item = &'a str>) -> String {
    let mut url = String::new();
    for segment in segments {
        url.push('/');
        url.push_str(&urlencoding::encode(segment));
    }
    url
}

/// URL of `name` inside the directory `prefix`, e.g. `/sub/my%20file.txt`.
pub fn compose_url(prefix: &RequestPath, name: &str) -> String {
    encode_segments(
        prefix
            .segments
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(name)),
    )
}

/// URL of the directory `path` itself, always with a trailing `/`.
pub fn compose_dir_url(path: &RequestPath) -> String {
    let mut url = encode_segments(path.segments.iter().map(String::as_str));
    url.push('/');
    url
}

/// URL of the parent of `prefix`. At the root this is `/`.
pub fn compose_parent_url(prefix: &RequestPath) -> String {
    compose_dir_url(&prefix.parent())
}
