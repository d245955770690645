//! Addon manifest and health endpoints

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;

use super::AddonState;
use crate::application::{HealthReport, CATALOG_ID};
use crate::domain::{FALLBACK_ID_PREFIX, MEDIA_TYPE};

pub const ADDON_ID: &str = "org.reddit.movieleaks.v3";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub resources: Vec<String>,
    pub types: Vec<String>,
    pub catalogs: Vec<ManifestCatalog>,
    pub id_prefixes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestCatalog {
    #[serde(rename = "type")]
    pub catalog_type: String,
    pub id: String,
    pub name: String,
    pub extra: Vec<ManifestExtra>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestExtra {
    pub name: String,
    pub is_required: bool,
}

impl Manifest {
    pub fn movieleaks() -> Self {
        Self {
            id: ADDON_ID.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            name: "Reddit Movie Leaks".to_string(),
            description: "Latest r/MovieLeaks releases with official Stremio posters.".to_string(),
            resources: vec!["catalog".to_string(), "meta".to_string()],
            types: vec![MEDIA_TYPE.to_string()],
            catalogs: vec![ManifestCatalog {
                catalog_type: MEDIA_TYPE.to_string(),
                id: CATALOG_ID.to_string(),
                name: "Movie Leaks".to_string(),
                extra: vec![ManifestExtra {
                    name: "skip".to_string(),
                    is_required: false,
                }],
            }],
            id_prefixes: vec!["tt".to_string(), FALLBACK_ID_PREFIX.to_string()],
        }
    }
}

pub fn routes() -> Router<AddonState> {
    Router::new()
        .route("/manifest.json", get(get_manifest))
        .route("/health", get(get_health))
}

/// `GET /manifest.json`
pub async fn get_manifest(State(state): State<AddonState>) -> Json<Arc<Manifest>> {
    Json(Arc::clone(&state.manifest))
}

/// `GET /health`
pub async fn get_health(State(state): State<AddonState>) -> Json<HealthReport> {
    Json(state.catalog.health().await)
}
