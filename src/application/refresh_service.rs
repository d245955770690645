//! One refresh cycle: read feed, reconcile, publish
//!
//! At most one cycle runs at a time. A cycle that cannot read the feed at all
//! keeps the previous snapshot and records the failure in the status.

use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::application::catalog_store::CatalogStore;
use crate::application::reconciler::{ReconcileReport, Reconciler};
use crate::application::resolution_chain::{PosterPolicy, ResolutionChain};
use crate::domain::RefreshStatus;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::feed_reader::{FeedReader, FeedReaderConfig, FeedStop};
use crate::infrastructure::http_client::{HttpClient, HttpClientConfig, RequestPacer};
use crate::infrastructure::metadata_resolver::CinemetaResolver;
use crate::infrastructure::score_providers::{OmdbScoreProvider, TmdbScoreProvider};

/// Why a cycle produced no new snapshot
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    #[error("A refresh cycle is already running")]
    AlreadyRunning,

    #[error("Feed unavailable: no page of {feed_url} could be read")]
    FeedUnavailable { feed_url: String },
}

/// Outcome of a successful cycle
#[derive(Debug, Clone)]
pub struct RefreshSummary {
    pub generation: u64,
    pub items: usize,
    pub pages_fetched: u32,
    pub feed_stop: FeedStop,
    pub report: ReconcileReport,
    pub elapsed: Duration,
}

pub struct RefreshService {
    store: Arc<CatalogStore>,
    feed: FeedReader,
    reconciler: Reconciler,
}

impl RefreshService {
    pub fn new(store: Arc<CatalogStore>, feed: FeedReader, reconciler: Reconciler) -> Self {
        Self { store, feed, reconciler }
    }

    /// Wire the production clients from configuration.
    pub fn from_config(store: Arc<CatalogStore>, config: &AppConfig) -> anyhow::Result<Self> {
        let client = HttpClient::new(HttpClientConfig::from_app_config(config))?;
        let pacer = RequestPacer::from_app_config(config);

        let feed = FeedReader::new(client.clone(), pacer, FeedReaderConfig::from_app_config(config));

        let resolver = Arc::new(CinemetaResolver::new(client.clone(), config.resolver_url.clone()));
        let poster = PosterPolicy::new(config.poster_strategy, config.poster_template.clone());
        let mut chain = ResolutionChain::new(resolver, poster, pacer);

        if config.enrichment_enabled() {
            if let Some(key) = &config.omdb_api_key {
                chain = chain.with_primary_score(Arc::new(OmdbScoreProvider::new(
                    client.clone(),
                    config.omdb_url.clone(),
                    key.clone(),
                )));
            }
            if let Some(key) = &config.tmdb_api_key {
                chain = chain.with_secondary_score(Arc::new(TmdbScoreProvider::new(
                    client,
                    config.tmdb_url.clone(),
                    key.clone(),
                )));
            }
            info!("🍅 Score enrichment enabled");
        } else if config.score_enrichment {
            warn!("Score enrichment requested but no provider key is configured");
        }

        Ok(Self::new(store, feed, Reconciler::new(chain)))
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    /// Run one full cycle.
    pub async fn run_cycle(&self) -> Result<RefreshSummary, RefreshError> {
        let Some(_guard) = self.store.try_begin_refresh() else {
            warn!("⏭️ Refresh skipped: previous cycle still running");
            return Err(RefreshError::AlreadyRunning);
        };

        let started = Instant::now();
        info!("🔄 Refresh cycle started");
        self.store.set_status(RefreshStatus::Scraping).await;

        let batch = self.feed.read_latest().await;
        if batch.is_unavailable() {
            let err = RefreshError::FeedUnavailable {
                feed_url: self.feed.config().feed_url.clone(),
            };
            error!("❌ Refresh cycle failed: {}", err);
            self.store.set_status(RefreshStatus::Error(err.to_string())).await;
            return Err(err);
        }

        self.store.set_status(RefreshStatus::Processing(batch.posts.len())).await;
        let previous = self.store.current_snapshot().await;
        let (snapshot, report) = self.reconciler.reconcile(&previous, &batch.posts).await;

        let published = self.store.publish(snapshot).await;
        self.store.set_status(RefreshStatus::Ready(published.len())).await;

        let summary = RefreshSummary {
            generation: published.generation(),
            items: published.len(),
            pages_fetched: batch.pages_fetched,
            feed_stop: batch.stop,
            report,
            elapsed: started.elapsed(),
        };
        info!(
            "✅ Refresh cycle finished: {} items (generation {}) in {:.2?}",
            summary.items, summary.generation, summary.elapsed
        );
        Ok(summary)
    }
}
