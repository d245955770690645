//! Read side of the addon: catalog pages and single-item lookups
//!
//! Never fails. An empty catalog answers with one status placeholder,
//! unknown catalogs and out-of-range offsets answer with an empty page.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::application::catalog_store::CatalogStore;
use crate::domain::{CatalogItem, MEDIA_TYPE};

/// Catalog served by this addon
pub const CATALOG_ID: &str = "movieleaks_imdb";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogPage {
    pub metas: Vec<Arc<CatalogItem>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaLookup {
    Found(Arc<CatalogItem>),
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogState {
    Empty,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub state: CatalogState,
    pub status: String,
    pub items: usize,
    pub generation: u64,
    pub refreshing: bool,
}

/// `skip` from a Stremio extra segment such as `skip=100&genre=Drama`; 0 when absent or malformed
pub fn parse_extra(extra: &str) -> usize {
    url::form_urlencoded::parse(extra.as_bytes())
        .find(|(key, _)| key == "skip")
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<CatalogStore>,
    page_size: usize,
}

impl CatalogService {
    pub fn new(store: Arc<CatalogStore>, page_size: usize) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub async fn state(&self) -> CatalogState {
        if self.store.current_snapshot().await.is_empty() {
            CatalogState::Empty
        } else {
            CatalogState::Ready
        }
    }

    /// Up to one page of items starting at `skip`
    pub async fn list(&self, catalog_type: &str, catalog_id: &str, skip: usize) -> CatalogPage {
        if catalog_type != MEDIA_TYPE || catalog_id != CATALOG_ID {
            debug!("Unknown catalog {}/{}", catalog_type, catalog_id);
            return CatalogPage::default();
        }

        let snapshot = self.store.current_snapshot().await;
        if snapshot.is_empty() {
            let status = self.store.status().await;
            return CatalogPage {
                metas: vec![Arc::new(CatalogItem::placeholder(&status))],
            };
        }

        CatalogPage {
            metas: snapshot.page(skip, self.page_size).to_vec(),
        }
    }

    pub async fn get(&self, id: &str) -> MetaLookup {
        match self.store.current_snapshot().await.find(id) {
            Some(item) => MetaLookup::Found(Arc::clone(item)),
            None => MetaLookup::NotFound,
        }
    }

    pub async fn health(&self) -> HealthReport {
        let snapshot = self.store.current_snapshot().await;
        HealthReport {
            state: if snapshot.is_empty() { CatalogState::Empty } else { CatalogState::Ready },
            status: self.store.status().await.to_string(),
            items: snapshot.len(),
            generation: snapshot.generation(),
            refreshing: self.store.is_refreshing(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RefreshStatus, Snapshot, PLACEHOLDER_ID};
    use rstest::rstest;

    async fn ready_service(count: usize, page_size: usize) -> CatalogService {
        let store = Arc::new(CatalogStore::new());
        let items = (0..count)
            .map(|i| Arc::new(CatalogItem::new(format!("tt{i}"), format!("Movie {i}"), "2024")))
            .collect();
        store.publish(Snapshot::new(items, 1)).await;
        CatalogService::new(store, page_size)
    }

    #[tokio::test]
    async fn test_empty_catalog_serves_single_placeholder() {
        let store = Arc::new(CatalogStore::new());
        store.set_status(RefreshStatus::Scraping).await;
        let service = CatalogService::new(store, 100);

        for skip in [0, 100, 5000] {
            let page = service.list("movie", CATALOG_ID, skip).await;
            assert_eq!(page.metas.len(), 1);
            assert_eq!(page.metas[0].id, PLACEHOLDER_ID);
            assert_eq!(page.metas[0].name, "Movie Leaks: Scraping...");
        }
        assert_eq!(service.state().await, CatalogState::Empty);
        // the placeholder is list-only; its id is outside the advertised prefixes
        assert_eq!(service.get(PLACEHOLDER_ID).await, MetaLookup::NotFound);
    }

    #[rstest]
    #[case(250, 0, 100)]
    #[case(250, 200, 50)]
    #[case(250, 250, 0)]
    #[case(250, 9999, 0)]
    #[case(3, 1, 2)]
    #[tokio::test]
    async fn test_pagination_window(#[case] count: usize, #[case] skip: usize, #[case] expected: usize) {
        let service = ready_service(count, 100).await;
        let page = service.list("movie", CATALOG_ID, skip).await;

        assert_eq!(page.metas.len(), expected);
        if expected > 0 {
            assert_eq!(page.metas[0].id, format!("tt{skip}"));
        }
    }

    #[tokio::test]
    async fn test_unknown_catalog_is_empty() {
        let service = ready_service(5, 100).await;
        assert!(service.list("series", CATALOG_ID, 0).await.metas.is_empty());
        assert!(service.list("movie", "top", 0).await.metas.is_empty());
    }

    #[tokio::test]
    async fn test_get_finds_by_id() {
        let service = ready_service(5, 100).await;
        assert!(matches!(service.get("tt3").await, MetaLookup::Found(item) if item.name == "Movie 3"));
        assert_eq!(service.get("tt99").await, MetaLookup::NotFound);
        assert_eq!(service.get(PLACEHOLDER_ID).await, MetaLookup::NotFound);
    }

    #[rstest]
    #[case("skip=100", 100)]
    #[case("genre=Drama&skip=25", 25)]
    #[case("skip=abc", 0)]
    #[case("skip=-5", 0)]
    #[case("", 0)]
    #[case("search=the%20thing", 0)]
    fn test_parse_extra(#[case] extra: &str, #[case] expected: usize) {
        assert_eq!(parse_extra(extra), expected);
    }
}
