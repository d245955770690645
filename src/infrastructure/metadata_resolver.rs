//! Canonical metadata lookup against the Cinemeta catalog

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::http_client::HttpClient;

/// Canonical metadata record for one title
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalMeta {
    /// IMDb id, e.g. `tt21192142`
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub release_info: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
}

/// Resolves a title/year pair to canonical metadata
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// First match for `"{title} {year}"`, or `None` when nothing (or an error) came back.
    async fn resolve(&self, title: &str, year: &str) -> Option<CanonicalMeta>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    metas: Vec<CanonicalMeta>,
}

/// Cinemeta search: `{base}/search={query}.json`
pub struct CinemetaResolver {
    client: HttpClient,
    base_url: String,
}

impl CinemetaResolver {
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search={}.json",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(query)
        )
    }
}

#[async_trait]
impl MetadataResolver for CinemetaResolver {
    async fn resolve(&self, title: &str, year: &str) -> Option<CanonicalMeta> {
        let query = format!("{title} {year}");
        let response: SearchResponse = self.client.fetch_optional(&self.search_url(&query), &[]).await?;
        let first = response.metas.into_iter().find(|meta| !meta.id.is_empty());
        if first.is_none() {
            debug!("No resolver match for '{}'", query);
        }
        first
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::HttpClientConfig;

    fn resolver(server: &mockito::Server) -> CinemetaResolver {
        let client = HttpClient::new(HttpClientConfig {
            max_requests_per_second: 0,
            ..HttpClientConfig::default()
        })
        .unwrap();
        CinemetaResolver::new(client, format!("{}/catalog/movie/top/", server.url()))
    }

    #[test]
    fn test_search_url_encoding() {
        let client = HttpClient::new(HttpClientConfig::default()).unwrap();
        let resolver = CinemetaResolver::new(client, "https://v3-cinemeta.strem.io/catalog/movie/top");
        assert_eq!(
            resolver.search_url("Poor Things 2023"),
            "https://v3-cinemeta.strem.io/catalog/movie/top/search=Poor%20Things%202023.json"
        );
    }

    #[tokio::test]
    async fn test_resolve_takes_first_match() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/catalog/movie/top/search=Saltburn%202023.json")
            .with_body(
                r#"{"metas":[
                    {"id":"tt17351924","type":"movie","name":"Saltburn","releaseInfo":"2023","description":"A student at Oxford..."},
                    {"id":"tt0000001","type":"movie","name":"Saltburn by the Sea","releaseInfo":"1999"}
                ]}"#,
            )
            .create_async()
            .await;

        let meta = resolver(&server).resolve("Saltburn", "2023").await.unwrap();
        assert_eq!(meta.id, "tt17351924");
        assert_eq!(meta.name, "Saltburn");
        assert_eq!(meta.release_info.as_deref(), Some("2023"));
        assert!(meta.description.is_some());
    }

    #[tokio::test]
    async fn test_entries_without_id_are_skipped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/catalog/movie/top/search=Wonka%202023.json")
            .with_body(
                r#"{"metas":[
                    {"type":"movie","name":"Wonka (fan edit)"},
                    {"id":"","type":"movie","name":"Wonka"},
                    {"id":"tt6166392","type":"movie","name":"Wonka","releaseInfo":"2023"}
                ]}"#,
            )
            .create_async()
            .await;

        let meta = resolver(&server).resolve("Wonka", "2023").await.unwrap();
        assert_eq!(meta.id, "tt6166392");
    }

    #[tokio::test]
    async fn test_no_match_or_failure_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/catalog/movie/top/search=Nothing%202023.json")
            .with_body(r#"{"metas":[]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/catalog/movie/top/search=Broken%202023.json")
            .with_status(502)
            .create_async()
            .await;

        let resolver = resolver(&server);
        assert!(resolver.resolve("Nothing", "2023").await.is_none());
        assert!(resolver.resolve("Broken", "2023").await.is_none());
    }
}
