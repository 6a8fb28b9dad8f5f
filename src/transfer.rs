//! Streams a regular file back to the client.

use std::path::Path;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;
use tracing::{error, info};

use crate::config::Disposition;
use crate::error::ListingError;
use crate::server::error_response;

/// Sends `path` with a guessed `Content-Type` and the configured disposition.
///
/// `path` must already be resolved inside the root. `name` is the name the
/// client asked for; it drives the content type and the download name, so a
/// symlink downloads under its own name rather than its target's.
pub async fn serve_file(path: &Path, name: &str, disposition: Disposition) -> Response {
    info!("Serving file: {}", path.display());

    let metadata = match tokio::fs::metadata(path).await {
        Ok(meta) => meta,
        Err(e) => {
            let err = ListingError::from_io(path, e);
            error!("Failed to get metadata for file {}: {}", path.display(), err);
            return error_response(err.status_code(), "Not found");
        }
    };

    let file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) => {
            let err = ListingError::from_io(path, e);
            error!("Failed to open file {}: {}", path.display(), err);
            return error_response(err.status_code(), "Not found");
        }
    };

    let mime_type = mime_guess::from_path(name).first_or_octet_stream();

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime_type.as_ref())
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(metadata.len()));
    headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition(disposition, name),
    );

    let body = Body::from_stream(ReaderStream::new(file));
    (StatusCode::OK, headers, body).into_response()
}

/// Builds `attachment; filename="..."; filename*=UTF-8''...`.
///
/// The quoted form is an ASCII fallback; the extended form carries the exact
/// UTF-8 name.
pub fn content_disposition(disposition: Disposition, filename: &str) -> HeaderValue {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();

    let value = format!(
        "{}; filename=\"{}\"; filename*=UTF-8''{}",
        disposition.as_str(),
        fallback,
        urlencoding::encode(filename)
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static(disposition.as_str()))
}
