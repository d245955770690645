//! Catalog and meta resource endpoints

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tracing::debug;

use super::{strip_json_suffix, AddonState};
use crate::application::{parse_extra, CatalogPage, MetaLookup};

pub fn routes() -> Router<AddonState> {
    Router::new()
        .route("/catalog/:type/:id", get(get_catalog))
        .route("/catalog/:type/:id/:extra", get(get_catalog_with_extra))
        .route("/meta/:type/:id", get(get_meta))
}

/// `GET /catalog/{type}/{id}.json`
pub async fn get_catalog(
    State(state): State<AddonState>,
    Path((catalog_type, catalog_id)): Path<(String, String)>,
) -> Json<CatalogPage> {
    let catalog_id = strip_json_suffix(&catalog_id);
    Json(state.catalog.list(&catalog_type, catalog_id, 0).await)
}

/// `GET /catalog/{type}/{id}/{extra}.json`
pub async fn get_catalog_with_extra(
    State(state): State<AddonState>,
    Path((catalog_type, catalog_id, extra)): Path<(String, String, String)>,
) -> Json<CatalogPage> {
    let skip = parse_extra(strip_json_suffix(&extra));
    debug!("Catalog {}/{} skip={}", catalog_type, catalog_id, skip);
    Json(state.catalog.list(&catalog_type, &catalog_id, skip).await)
}

/// `GET /meta/{type}/{id}.json`; 404 with a null meta lets other addons answer
pub async fn get_meta(
    State(state): State<AddonState>,
    Path((_meta_type, id)): Path<(String, String)>,
) -> Response {
    match state.catalog.get(strip_json_suffix(&id)).await {
        MetaLookup::Found(item) => Json(json!({ "meta": item })).into_response(),
        MetaLookup::NotFound => (StatusCode::NOT_FOUND, Json(json!({ "meta": null }))).into_response(),
    }
}
