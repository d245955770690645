//! Infrastructure layer: configuration, logging and upstream HTTP clients
//!
//! Provides the rate-limited fetch client, the paginated feed reader, the
//! metadata resolver and the score providers used by the refresh pipeline.

pub mod config;
pub mod feed_reader;
pub mod fetch_error;
pub mod http_client;
pub mod logging;
pub mod metadata_resolver;
pub mod score_providers;

// Re-export commonly used items
pub use config::{AppConfig, LoggingConfig, PosterStrategy};
pub use feed_reader::{FeedBatch, FeedReader, FeedReaderConfig, FeedStop};
pub use fetch_error::{FetchError, FetchResult};
pub use http_client::{HttpClient, HttpClientConfig, RequestPacer};
pub use metadata_resolver::{CanonicalMeta, CinemetaResolver, MetadataResolver};
pub use score_providers::{OmdbScoreProvider, ScoreProvider, ScoreQuery, TmdbScoreProvider};
