//! HTTP surface: the axum router and the responses it produces.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use http::Method;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::listing::ListingViewModel;
use crate::paths::decode_uri_path;
use crate::render::{render_json, render_listing};
use crate::router::{route, RouteDecision};
use crate::transfer::serve_file;

// --- State ---
pub type SharedConfig = Arc<AppConfig>;

// --- Request Payloads ---
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ListingFormat {
    #[default]
    Html,
    Json,
}

impl ListingFormat {
    /// Reads `?format=`. Anything but `json` renders HTML.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        match params.get("format").map(String::as_str) {
            Some(format) if format.eq_ignore_ascii_case("json") => ListingFormat::Json,
            _ => ListingFormat::Html,
        }
    }
}

/// Builds the application router.
///
/// Only `GET` is routed (axum answers `HEAD` from it); any other method gets
/// `405 Method Not Allowed`.
pub fn app(config: SharedConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD])
        .allow_origin(Any);

    Router::new()
        .route("/", get(browse_handler))
        .route("/*path", get(browse_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(config)
}

/// Serves both `/` and `/*path`.
///
/// The path is decoded here rather than by an extractor so that malformed
/// paths and query strings still end in this crate's own 404.
async fn browse_handler(
    State(config): State<SharedConfig>,
    OriginalUri(uri): OriginalUri,
    query: Option<Query<HashMap<String, String>>>,
) -> Response {
    let raw_path = match decode_uri_path(uri.path()) {
        Ok(path) => path,
        Err(e) => {
            info!("Rejected request path {:?}: {}", uri.path(), e);
            return error_response(StatusCode::NOT_FOUND, "Not found");
        }
    };

    match route(&config.root, &raw_path).await {
        RouteDecision::ServeListing(view) => {
            let format = query
                .map(|Query(params)| ListingFormat::from_query(&params))
                .unwrap_or_default();
            listing_response(&config, &view, format)
        }
        RouteDecision::ServeFile { path, name } => {
            serve_file(&path, &name, config.disposition).await
        }
        RouteDecision::NotFound => error_response(StatusCode::NOT_FOUND, "Not found"),
    }
}

fn listing_response(config: &AppConfig, view: &ListingViewModel, format: ListingFormat) -> Response {
    match format {
        ListingFormat::Html => render_listing(view, &config.render).into_response(),
        ListingFormat::Json => match render_json(view) {
            Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
            Err(e) => {
                error!("Failed to serialize listing {}: {}", view.path, e);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            }
        },
    }
}

// --- Utility Functions ---

/// Plain-text error body with the given status.
pub fn error_response(status_code: StatusCode, message: &'static str) -> Response {
    (
        status_code,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        message,
    )
        .into_response()
}
