//! Shared mock upstreams for integration tests
#![allow(dead_code)]

use std::sync::Arc;

use mockito::{Matcher, Mock, Server, ServerGuard};
use movieleaks_catalog::application::{CatalogStore, RefreshService};
use movieleaks_catalog::infrastructure::config::AppConfig;
use serde_json::json;

pub const FEED_PATH: &str = "/r/movieleaks/new.json";
pub const RESOLVER_BASE: &str = "/catalog/movie/top";
pub const OMDB_PATH: &str = "/omdb/";

/// Config pointing every upstream at `server`, with pacing and limiting off
pub fn test_config(server: &ServerGuard) -> AppConfig {
    let mut config = AppConfig {
        feed_url: format!("{}{}", server.url(), FEED_PATH),
        resolver_url: format!("{}{}", server.url(), RESOLVER_BASE),
        omdb_url: format!("{}{}", server.url(), OMDB_PATH),
        score_enrichment: false,
        request_delay_ms: 0,
        request_jitter_ms: 0,
        max_requests_per_second: 0,
        max_age_hours: None,
        ..AppConfig::default()
    };
    config.logging.file_output = false;
    config
}

pub fn listing(posts: &[(&str, &str)]) -> String {
    let children: Vec<_> = posts
        .iter()
        .enumerate()
        .map(|(i, (id, title))| {
            json!({
                "kind": "t3",
                "data": {
                    "id": id,
                    "title": title,
                    "thumbnail": format!("https://b.thumbs.redditmedia.com/{id}.jpg"),
                    "created_utc": 1_700_000_000.0 - (i as f64) * 60.0,
                }
            })
        })
        .collect();
    json!({ "kind": "Listing", "data": { "after": null, "children": children } }).to_string()
}

pub async fn mock_feed(server: &mut Server, posts: &[(&str, &str)]) -> Mock {
    server
        .mock("GET", FEED_PATH)
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(listing(posts))
        .create_async()
        .await
}

/// Resolver answer for `"{title} {year}"`
pub async fn mock_resolver(server: &mut Server, query: &str, id: &str, name: &str, year: &str) -> Mock {
    let path = format!("{}/search={}.json", RESOLVER_BASE, urlencoding::encode(query));
    server
        .mock("GET", path.as_str())
        .with_body(
            json!({ "metas": [{
                "id": id,
                "type": "movie",
                "name": name,
                "releaseInfo": year,
                "description": format!("{name} synopsis"),
            }]})
            .to_string(),
        )
        .create_async()
        .await
}

/// Any resolver query not mocked otherwise comes back empty
pub async fn mock_resolver_miss(server: &mut Server) -> Mock {
    server
        .mock("GET", Matcher::Regex(format!("^{RESOLVER_BASE}/search=.*")))
        .with_body(r#"{"metas":[]}"#)
        .create_async()
        .await
}

pub fn refresh_service(config: &AppConfig) -> (Arc<CatalogStore>, RefreshService) {
    let store = Arc::new(CatalogStore::new());
    let service = RefreshService::from_config(Arc::clone(&store), config).unwrap();
    (store, service)
}
