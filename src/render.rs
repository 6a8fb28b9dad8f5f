//! Turns a [`ListingViewModel`] into a response body.
//!
//! The listing logic never builds markup; these functions are the only place
//! that knows about HTML or JSON.

use chrono::Local;
use humansize::{format_size, BINARY};
use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::classify::EntryKind;
use crate::config::{Layout, RenderOptions};
use crate::listing::{DirEntry, ListingViewModel};

const MODEL_VIEWER_SRC: &str =
    "https://ajax.googleapis.com/ajax/libs/model-viewer/3.5.0/model-viewer.min.js";

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 1.5em; }
img { image-rendering: pixelated; }
ul.listing { list-style: none; padding: 0; }
ul.listing li { padding: 4px 0; border-bottom: 1px solid #eee; }
ul.listing li.directory > a, ul.listing li.symlink > a { font-weight: bold; }
.meta { color: #666; font-size: 0.85em; margin-left: 1em; }
.media { display: block; margin-top: 4px; }
"#;

/// Renders the full listing page.
pub fn render_listing(view: &ListingViewModel, options: &RenderOptions) -> Markup {
    let embed_models = options.layout == Layout::Gallery && view.has_kind(EntryKind::Model3D);

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (view.title) }
                style { (PreEscaped(STYLE)) }
                @if embed_models {
                    script type="module" src=(MODEL_VIEWER_SRC) {}
                }
            }
            body {
                h1 { (view.title) }
                hr;
                p class="parent" {
                    "back to parent: "
                    a href=(view.parent_url) { (view.parent_path) }
                }
                hr;
                ul class="listing" {
                    @for entry in &view.entries {
                        (entry_row(entry, options))
                    }
                }
                hr;
            }
        }
    }
}

fn entry_row(entry: &DirEntry, options: &RenderOptions) -> Markup {
    let media_style = format!("max-height: {}px; max-width: 100%;", options.media_height);

    html! {
        li class=(entry.kind.as_str()) {
            @match (options.layout, entry.kind) {
                (Layout::Gallery, EntryKind::Image) => {
                    (download_link(entry))
                    img class="media" src=(entry.url) alt=(entry.name) style=(media_style) loading="lazy";
                }
                (Layout::Gallery, EntryKind::Video) => {
                    @let mime = mime_guess::from_path(&entry.name).first_or_octet_stream();
                    (download_link(entry))
                    video class="media" controls autoplay preload="metadata" style=(media_style) {
                        source src=(entry.url) type=(mime.essence_str());
                    }
                }
                (Layout::Gallery, EntryKind::Model3D) => {
                    (download_link(entry))
                    model-viewer class="media" src=(entry.url) alt=(entry.name) camera-controls style=(media_style) {}
                }
                _ => {
                    a href=(entry.url) { (entry.display_name) }
                    (entry_meta(entry))
                }
            }
        }
    }
}

fn download_link(entry: &DirEntry) -> Markup {
    html! {
        a href=(entry.url) download { (entry.display_name) }
        (entry_meta(entry))
    }
}

fn entry_meta(entry: &DirEntry) -> Markup {
    let modified = entry
        .modified
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string();

    html! {
        span class="meta" {
            @if !entry.is_navigable() {
                (format_size(entry.size_bytes, BINARY)) " "
            }
            (modified)
        }
    }
}

/// Machine-readable form of the same listing.
pub fn render_json(view: &ListingViewModel) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(view)
}
