//! Stremio addon HTTP surface
//!
//! Route groups live in the commands/ directory; this module assembles them
//! into one router with CORS, tracing and a request timeout.

pub mod catalog_commands;
pub mod manifest_commands;

use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::{BoxError, Router};
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::application::CatalogService;
pub use manifest_commands::Manifest;

/// Upper bound for serving one request; reads only touch memory
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AddonState {
    pub catalog: CatalogService,
    pub manifest: Arc<Manifest>,
}

impl AddonState {
    pub fn new(catalog: CatalogService) -> Self {
        Self {
            catalog,
            manifest: Arc::new(Manifest::movieleaks()),
        }
    }
}

/// Build the addon router.
pub fn addon_router(state: AddonState) -> Router {
    Router::new()
        .merge(manifest_commands::routes())
        .merge(catalog_commands::routes())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn handle_timeout_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "request timed out".to_string())
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("unhandled internal error: {err}"))
    }
}

/// Stremio appends `.json` to the last path segment
pub(crate) fn strip_json_suffix(segment: &str) -> &str {
    segment.strip_suffix(".json").unwrap_or(segment)
}
