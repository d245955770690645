//! Critic score lookups
//!
//! Two providers, both best-effort: OMDb (Rotten Tomatoes rating, keyed by
//! IMDb id) and TMDb (audience rating, keyed by a title search with a ±1 year
//! tolerance on the release date).

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{Score, ScoreSource};
use super::http_client::HttpClient;

/// Release-year slack when matching search candidates
pub const YEAR_TOLERANCE: i32 = 1;

/// What a provider may key its lookup on
#[derive(Debug, Clone, Copy)]
pub struct ScoreQuery<'a> {
    pub imdb_id: &'a str,
    pub title: &'a str,
    pub year: Option<&'a str>,
}

#[async_trait]
pub trait ScoreProvider: Send + Sync {
    fn source(&self) -> ScoreSource;

    async fn score(&self, query: &ScoreQuery<'_>) -> Option<Score>;
}

/// `"93%"` → 93
pub fn parse_percent(value: &str) -> Option<u8> {
    value.trim().strip_suffix('%')?.trim().parse::<u8>().ok().filter(|p| *p <= 100)
}

/// True when `release_date` (`YYYY-MM-DD` or `YYYY`) is within ±[`YEAR_TOLERANCE`] of `year`
pub fn year_within_tolerance(release_date: &str, year: &str) -> bool {
    let candidate = release_date.get(..4).and_then(|y| y.parse::<i32>().ok());
    let wanted = year.trim().parse::<i32>().ok();
    match (candidate, wanted) {
        (Some(candidate), Some(wanted)) => (candidate - wanted).abs() <= YEAR_TOLERANCE,
        _ => false,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    ratings: Vec<OmdbRating>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbRating {
    source: String,
    value: String,
}

/// Primary provider: Rotten Tomatoes score through OMDb
pub struct OmdbScoreProvider {
    client: HttpClient,
    base_url: String,
    api_key: String,
}

impl OmdbScoreProvider {
    pub fn new(client: HttpClient, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ScoreProvider for OmdbScoreProvider {
    fn source(&self) -> ScoreSource {
        ScoreSource::RottenTomatoes
    }

    async fn score(&self, query: &ScoreQuery<'_>) -> Option<Score> {
        let response: OmdbResponse = self
            .client
            .fetch_optional(&self.base_url, &[("i", query.imdb_id), ("apikey", self.api_key.as_str())])
            .await?;

        if response.response.as_deref() == Some("False") {
            debug!("OMDb has no record for {}", query.imdb_id);
            return None;
        }

        response
            .ratings
            .iter()
            .find(|rating| rating.source == "Rotten Tomatoes")
            .and_then(|rating| parse_percent(&rating.value))
            .map(|percent| Score::new(percent, self.source()))
    }
}

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    #[serde(default)]
    results: Vec<TmdbMovie>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovie {
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    vote_average: f64,
    #[serde(default)]
    vote_count: u64,
}

/// Secondary provider: TMDb vote average scaled to a percentage
pub struct TmdbScoreProvider {
    client: HttpClient,
    base_url: String,
    api_key: String,
}

impl TmdbScoreProvider {
    pub fn new(client: HttpClient, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn search_url(&self) -> String {
        format!("{}/search/movie", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ScoreProvider for TmdbScoreProvider {
    fn source(&self) -> ScoreSource {
        ScoreSource::Tmdb
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    async fn score(&self, query: &ScoreQuery<'_>) -> Option<Score> {
        let year = query.year?;
        let response: TmdbSearchResponse = self
            .client
            .fetch_optional(&self.search_url(), &[("query", query.title), ("api_key", self.api_key.as_str())])
            .await?;

        response
            .results
            .iter()
            .filter(|movie| movie.vote_count > 0 && movie.vote_average > 0.0)
            .find(|movie| {
                movie
                    .release_date
                    .as_deref()
                    .is_some_and(|date| year_within_tolerance(date, year))
            })
            .map(|movie| {
                let percent = (movie.vote_average * 10.0).round().clamp(0.0, 100.0) as u8;
                Score::new(percent, self.source())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::HttpClientConfig;
    use mockito::Matcher;
    use rstest::rstest;

    fn client() -> HttpClient {
        HttpClient::new(HttpClientConfig {
            max_requests_per_second: 0,
            ..HttpClientConfig::default()
        })
        .unwrap()
    }

    #[rstest]
    #[case("93%", Some(93))]
    #[case(" 100% ", Some(100))]
    #[case("101%", None)]
    #[case("7.1/10", None)]
    #[case("N/A", None)]
    fn test_parse_percent(#[case] raw: &str, #[case] expected: Option<u8>) {
        assert_eq!(parse_percent(raw), expected);
    }

    #[rstest]
    #[case("2023-11-17", "2023", true)]
    #[case("2022-12-31", "2023", true)]
    #[case("2024-01-05", "2023", true)]
    #[case("2021-06-01", "2023", false)]
    #[case("", "2023", false)]
    #[case("2023", "abcd", false)]
    fn test_year_tolerance(#[case] date: &str, #[case] year: &str, #[case] expected: bool) {
        assert_eq!(year_within_tolerance(date, year), expected);
    }

    #[tokio::test]
    async fn test_omdb_rotten_tomatoes_score() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("i".into(), "tt17351924".into()),
                Matcher::UrlEncoded("apikey".into(), "key".into()),
            ]))
            .with_body(
                r#"{"Title":"Saltburn","Ratings":[
                    {"Source":"Internet Movie Database","Value":"7.0/10"},
                    {"Source":"Rotten Tomatoes","Value":"71%"}
                ],"Response":"True"}"#,
            )
            .create_async()
            .await;

        let provider = OmdbScoreProvider::new(client(), format!("{}/", server.url()), "key");
        let query = ScoreQuery {
            imdb_id: "tt17351924",
            title: "Saltburn",
            year: Some("2023"),
        };
        let score = provider.score(&query).await.unwrap();
        assert_eq!(score, Score::new(71, ScoreSource::RottenTomatoes));
    }

    #[tokio::test]
    async fn test_omdb_missing_record_or_rating() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(Matcher::UrlEncoded("i".into(), "tt0".into()))
            .with_body(r#"{"Response":"False","Error":"Incorrect IMDb ID."}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/")
            .match_query(Matcher::UrlEncoded("i".into(), "tt1".into()))
            .with_body(r#"{"Response":"True","Ratings":[{"Source":"Metacritic","Value":"60/100"}]}"#)
            .create_async()
            .await;

        let provider = OmdbScoreProvider::new(client(), format!("{}/", server.url()), "key");
        for id in ["tt0", "tt1"] {
            let query = ScoreQuery { imdb_id: id, title: "x", year: None };
            assert!(provider.score(&query).await.is_none());
        }
    }

    #[tokio::test]
    async fn test_tmdb_search_with_year_tolerance() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/3/search/movie")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "Poor Things".into()),
                Matcher::UrlEncoded("api_key".into(), "key".into()),
                // year tolerance is applied locally, never sent upstream
                Matcher::Regex(r"^query=Poor\+Things&api_key=key$".into()),
            ]))
            .with_body(
                r#"{"results":[
                    {"title":"Poor Things","release_date":"1999-03-01","vote_average":5.0,"vote_count":10},
                    {"title":"Poor Things","release_date":"2023-12-07","vote_average":7.76,"vote_count":5000}
                ]}"#,
            )
            .create_async()
            .await;

        let provider = TmdbScoreProvider::new(client(), format!("{}/3", server.url()), "key");
        let query = ScoreQuery {
            imdb_id: "tt14230458",
            title: "Poor Things",
            year: Some("2024"),
        };
        assert_eq!(provider.score(&query).await, Some(Score::new(78, ScoreSource::Tmdb)));

        let no_year = ScoreQuery { year: None, ..query };
        assert_eq!(provider.score(&no_year).await, None);
    }
}
