//! Per-candidate resolution: canonical metadata, optional score, item construction
//!
//! Every step is best-effort. A candidate that cannot be resolved still
//! produces exactly one item, built from the raw post.

use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::{CatalogItem, ParsedCandidate, RawPost, Score, UNKNOWN_RELEASE};
use crate::infrastructure::config::PosterStrategy;
use crate::infrastructure::http_client::RequestPacer;
use crate::infrastructure::metadata_resolver::{CanonicalMeta, MetadataResolver};
use crate::infrastructure::score_providers::{ScoreProvider, ScoreQuery};

/// How posters are built for resolved items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterPolicy {
    pub strategy: PosterStrategy,
    /// `{id}` is replaced by the canonical id
    pub template: String,
}

impl PosterPolicy {
    pub fn new(strategy: PosterStrategy, template: impl Into<String>) -> Self {
        Self {
            strategy,
            template: template.into(),
        }
    }

    pub fn poster_for(&self, meta: &CanonicalMeta) -> String {
        let from_template = || self.template.replace("{id}", &meta.id);
        match self.strategy {
            PosterStrategy::Metahub => from_template(),
            PosterStrategy::Resolver => meta
                .poster
                .as_deref()
                .filter(|poster| poster.starts_with("http://") || poster.starts_with("https://"))
                .map_or_else(from_template, str::to_string),
        }
    }
}

/// Which path produced an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Matched { scored: bool },
    Fallback,
}

/// Metadata resolver plus an optional primary → secondary score chain
pub struct ResolutionChain {
    resolver: Arc<dyn MetadataResolver>,
    primary: Option<Arc<dyn ScoreProvider>>,
    secondary: Option<Arc<dyn ScoreProvider>>,
    poster: PosterPolicy,
    pacer: RequestPacer,
}

impl ResolutionChain {
    pub fn new(resolver: Arc<dyn MetadataResolver>, poster: PosterPolicy, pacer: RequestPacer) -> Self {
        Self {
            resolver,
            primary: None,
            secondary: None,
            poster,
            pacer,
        }
    }

    #[must_use]
    pub fn with_primary_score(mut self, provider: Arc<dyn ScoreProvider>) -> Self {
        self.primary = Some(provider);
        self
    }

    #[must_use]
    pub fn with_secondary_score(mut self, provider: Arc<dyn ScoreProvider>) -> Self {
        self.secondary = Some(provider);
        self
    }

    pub fn enrichment_enabled(&self) -> bool {
        self.primary.is_some() || self.secondary.is_some()
    }

    /// Resolve one candidate into exactly one catalog item.
    pub async fn resolve(&self, post: &RawPost, candidate: &ParsedCandidate) -> (CatalogItem, ResolutionOutcome) {
        let Some(year) = candidate.year.as_deref() else {
            debug!("No year in '{}', using raw listing", post.title);
            return (fallback_item(post, candidate), ResolutionOutcome::Fallback);
        };

        let meta = self.resolver.resolve(&candidate.title, year).await;
        self.pacer.pause().await;

        match meta {
            Some(meta) => {
                let score = self.enrich(&meta, candidate).await;
                info!(
                    "✅ Matched: {} ({}) -> {}{}",
                    candidate.title,
                    year,
                    meta.id,
                    score.map(|s| format!(" [{} {}]", s.source.label(), s)).unwrap_or_default()
                );
                let item = self.matched_item(&meta, candidate, score);
                (item, ResolutionOutcome::Matched { scored: score.is_some() })
            }
            None => {
                debug!("Unmatched: {} ({})", candidate.title, year);
                (fallback_item(post, candidate), ResolutionOutcome::Fallback)
            }
        }
    }

    /// Primary provider by id, then secondary by title search
    async fn enrich(&self, meta: &CanonicalMeta, candidate: &ParsedCandidate) -> Option<Score> {
        let title = if meta.name.is_empty() { candidate.title.as_str() } else { meta.name.as_str() };
        let query = ScoreQuery {
            imdb_id: &meta.id,
            title,
            year: candidate.year.as_deref(),
        };

        for provider in [&self.primary, &self.secondary].into_iter().flatten() {
            let score = provider.score(&query).await;
            self.pacer.pause().await;
            if score.is_some() {
                return score;
            }
            debug!("{} had no score for {}", provider.source().label(), meta.id);
        }
        None
    }

    fn matched_item(&self, meta: &CanonicalMeta, candidate: &ParsedCandidate, score: Option<Score>) -> CatalogItem {
        let name = if meta.name.trim().is_empty() { candidate.title.as_str() } else { meta.name.as_str() };
        let release_info = meta
            .release_info
            .clone()
            .filter(|r| !r.trim().is_empty())
            .or_else(|| candidate.year.clone())
            .unwrap_or_else(|| UNKNOWN_RELEASE.to_string());

        let description = match (score, meta.description.as_deref()) {
            (Some(score), Some(text)) => Some(format!("{}: {}\n\n{}", score.source.label(), score, text)),
            (Some(score), None) => Some(format!("{}: {}", score.source.label(), score)),
            (None, text) => text.map(str::to_string),
        };

        let mut item = CatalogItem::new(meta.id.clone(), CatalogItem::annotated_name(name, score), release_info);
        item.poster = Some(self.poster.poster_for(meta));
        item.description = description;
        item.source_title = Some(candidate.title.clone());
        item.score = score;
        item
    }
}

/// Item for a post the resolver could not match
pub fn fallback_item(post: &RawPost, candidate: &ParsedCandidate) -> CatalogItem {
    let release_info = candidate.year.clone().unwrap_or_else(|| UNKNOWN_RELEASE.to_string());
    let mut item = CatalogItem::new(CatalogItem::fallback_id(&post.id), candidate.title.clone(), release_info);
    item.poster = post.absolute_thumbnail().map(str::to_string);
    item.description = Some(format!("Unmatched r/MovieLeaks listing: {}", post.title));
    item.source_title = Some(candidate.title.clone());
    item
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{parse_permissive, ScoreSource};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory resolver keyed by `"title year"`
    #[derive(Default)]
    pub(crate) struct FakeResolver {
        pub metas: HashMap<String, CanonicalMeta>,
        pub calls: AtomicUsize,
    }

    impl FakeResolver {
        pub fn with(entries: &[(&str, &str, &str)]) -> Self {
            let metas = entries
                .iter()
                .map(|(query, id, name)| {
                    let year = query.rsplit(' ').next().unwrap_or_default();
                    (
                        (*query).to_string(),
                        CanonicalMeta {
                            id: (*id).to_string(),
                            name: (*name).to_string(),
                            description: Some(format!("About {name}")),
                            release_info: Some(year.to_string()),
                            poster: Some(format!("https://cdn.example/{id}.jpg")),
                        },
                    )
                })
                .collect();
            Self { metas, calls: AtomicUsize::new(0) }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MetadataResolver for FakeResolver {
        async fn resolve(&self, title: &str, year: &str) -> Option<CanonicalMeta> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.metas.get(&format!("{title} {year}")).cloned()
        }
    }

    pub(crate) struct FixedScore {
        pub source: ScoreSource,
        pub percent: Option<u8>,
        pub calls: AtomicUsize,
    }

    impl FixedScore {
        pub fn new(source: ScoreSource, percent: Option<u8>) -> Self {
            Self { source, percent, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl ScoreProvider for FixedScore {
        fn source(&self) -> ScoreSource {
            self.source
        }

        async fn score(&self, _query: &ScoreQuery<'_>) -> Option<Score> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.percent.map(|p| Score::new(p, self.source))
        }
    }

    pub(crate) fn metahub() -> PosterPolicy {
        PosterPolicy::new(PosterStrategy::Metahub, "https://images.metahub.space/poster/medium/{id}/img")
    }

    fn chain(resolver: FakeResolver) -> ResolutionChain {
        ResolutionChain::new(Arc::new(resolver), metahub(), RequestPacer::disabled())
    }

    #[tokio::test]
    async fn test_matched_item_uses_canonical_metadata_and_template_poster() {
        let chain = chain(FakeResolver::with(&[("Saltburn 2023", "tt17351924", "Saltburn")]));
        let post = RawPost::new("1abc", "Saltburn.2023.1080p.WEB", 1_700_000_000);
        let (item, outcome) = chain.resolve(&post, &parse_permissive(&post.title)).await;

        assert_eq!(outcome, ResolutionOutcome::Matched { scored: false });
        assert_eq!(item.id, "tt17351924");
        assert_eq!(item.name, "Saltburn");
        assert_eq!(item.release_info, "2023");
        assert_eq!(
            item.poster.as_deref(),
            Some("https://images.metahub.space/poster/medium/tt17351924/img")
        );
        assert_eq!(item.description.as_deref(), Some("About Saltburn"));
        assert_eq!(item.source_title.as_deref(), Some("Saltburn"));
    }

    #[tokio::test]
    async fn test_unmatched_and_yearless_posts_fall_back() {
        let resolver = Arc::new(FakeResolver::default());
        let chain = ResolutionChain::new(resolver.clone(), metahub(), RequestPacer::disabled());

        let post = RawPost::new("1abc", "Obscure.Film.2023.1080p", 0)
            .with_thumbnail("https://b.thumbs.redditmedia.com/x.jpg");
        let (item, outcome) = chain.resolve(&post, &parse_permissive(&post.title)).await;
        assert_eq!(outcome, ResolutionOutcome::Fallback);
        assert_eq!(item.id, "leaks_1abc");
        assert_eq!(item.name, "Obscure Film");
        assert_eq!(item.release_info, "2023");
        assert_eq!(item.poster.as_deref(), Some("https://b.thumbs.redditmedia.com/x.jpg"));
        assert!(item.description.unwrap().contains("Obscure.Film.2023.1080p"));
        assert_eq!(resolver.call_count(), 1);

        // no year: resolution skipped outright
        let post = RawPost::new("2def", "Weekly discussion thread", 0).with_thumbnail("self");
        let (item, outcome) = chain.resolve(&post, &parse_permissive(&post.title)).await;
        assert_eq!(outcome, ResolutionOutcome::Fallback);
        assert_eq!(item.id, "leaks_2def");
        assert_eq!(item.name, "Weekly discussion thread");
        assert_eq!(item.release_info, UNKNOWN_RELEASE);
        assert_eq!(item.poster, None);
        assert_eq!(resolver.call_count(), 1);
    }

    #[tokio::test]
    async fn test_secondary_score_used_when_primary_has_none() {
        let primary = Arc::new(FixedScore::new(ScoreSource::RottenTomatoes, None));
        let secondary = Arc::new(FixedScore::new(ScoreSource::Tmdb, Some(78)));
        let chain = chain(FakeResolver::with(&[("Poor Things 2023", "tt14230458", "Poor Things")]))
            .with_primary_score(primary.clone())
            .with_secondary_score(secondary.clone());

        let post = RawPost::new("1abc", "Poor Things (2023) 1080p", 0);
        let (item, outcome) = chain.resolve(&post, &parse_permissive(&post.title)).await;

        assert_eq!(outcome, ResolutionOutcome::Matched { scored: true });
        assert_eq!(item.name, "🍅 78% | Poor Things");
        assert_eq!(item.description.as_deref(), Some("TMDB: 78%\n\nAbout Poor Things"));
        assert_eq!(item.score, Some(Score::new(78, ScoreSource::Tmdb)));
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_primary_score_short_circuits_secondary() {
        let primary = Arc::new(FixedScore::new(ScoreSource::RottenTomatoes, Some(93)));
        let secondary = Arc::new(FixedScore::new(ScoreSource::Tmdb, Some(60)));
        let chain = chain(FakeResolver::with(&[("Saltburn 2023", "tt17351924", "Saltburn")]))
            .with_primary_score(primary)
            .with_secondary_score(secondary.clone());

        let post = RawPost::new("1abc", "Saltburn.2023.1080p", 0);
        let (item, _) = chain.resolve(&post, &parse_permissive(&post.title)).await;
        assert_eq!(item.name, "🍅 93% | Saltburn");
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 0);
        // poster never comes from enrichment
        assert!(item.poster.unwrap().contains("tt17351924"));
    }

    #[test]
    fn test_poster_policy_resolver_strategy() {
        let policy = PosterPolicy::new(PosterStrategy::Resolver, "https://images.metahub.space/poster/medium/{id}/img");
        let mut meta = CanonicalMeta {
            id: "tt1".into(),
            name: "x".into(),
            description: None,
            release_info: None,
            poster: Some("https://cdn.example/tt1.jpg".into()),
        };
        assert_eq!(policy.poster_for(&meta), "https://cdn.example/tt1.jpg");

        meta.poster = Some("/relative.jpg".into());
        assert_eq!(policy.poster_for(&meta), "https://images.metahub.space/poster/medium/tt1/img");
    }
}
