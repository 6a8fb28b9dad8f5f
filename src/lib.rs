//! Read-only HTTP browser for a single directory tree.
//!
//! Directories are rendered as HTML listings that embed images, videos and
//! 3D models inline; regular files are streamed back for download.

pub mod classify;
pub mod config;
pub mod error;
pub mod listing;
pub mod paths;
pub mod render;
pub mod router;
pub mod server;
pub mod transfer;

pub use classify::{classify, EntryKind};
pub use config::{AppConfig, Args};
pub use error::ListingError;
pub use listing::{build_listing, DirEntry, ListingViewModel};
pub use paths::{compose_parent_url, compose_url, RequestPath};
pub use router::{route, RouteDecision};
pub use server::app;
