//! Command-line arguments and the immutable configuration built from them.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tokio::fs;

use crate::error::ListingError;

// --- Configuration ---
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Root of the filesystem browser
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Host to bind the server to
    #[arg(short, long, value_name = "HOST", default_value = "127.0.0.1")]
    pub bind: String,

    /// Port to bind the server to
    #[arg(short, long, value_name = "PORT", default_value_t = 8081)]
    pub port: u16,

    /// How directory entries are rendered
    #[arg(long, value_enum, default_value_t = Layout::Gallery)]
    pub layout: Layout,

    /// Whether files are sent as downloads or displayed in the browser
    #[arg(long, value_enum, default_value_t = Disposition::Attachment)]
    pub disposition: Disposition,

    /// Maximum height in pixels of inline images and videos
    #[arg(long, value_name = "PX", default_value_t = 400)]
    pub height: u32,
}

/// Listing markup style.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// One link per entry with size and modification time.
    List,
    /// Like `list`, with images, videos and 3D models embedded inline.
    #[default]
    Gallery,
}

/// `Content-Disposition` used for file transfers.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    #[default]
    Attachment,
    Inline,
}

impl Disposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::Attachment => "attachment",
            Disposition::Inline => "inline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub layout: Layout,
    pub media_height: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            media_height: 400,
        }
    }
}

/// Everything a request handler needs. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Canonical browsing root.
    pub root: PathBuf,
    pub render: RenderOptions,
    pub disposition: Disposition,
}

impl AppConfig {
    /// Defaults for everything but the root, which must already be canonical.
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            root,
            render: RenderOptions::default(),
            disposition: Disposition::default(),
        }
    }

    /// Canonicalises the root and checks that it is a directory.
    pub async fn from_args(args: &Args) -> Result<Self, ListingError> {
        let root = fs::canonicalize(&args.root)
            .await
            .map_err(|e| ListingError::from_io(&args.root, e))?;

        let metadata = fs::metadata(&root)
            .await
            .map_err(|e| ListingError::from_io(&root, e))?;
        if !metadata.is_dir() {
            return Err(ListingError::NotADirectory(root));
        }

        Ok(Self {
            root,
            render: RenderOptions {
                layout: args.layout,
                media_height: args.height,
            },
            disposition: args.disposition,
        })
    }
}
