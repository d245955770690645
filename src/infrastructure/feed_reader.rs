//! Paginated reader for the reddit listing feed
//!
//! Walks the listing backwards in time using the `after` cursor. Reading stops
//! at the first post older than the age cutoff, when the feed runs out of
//! items or cursors, or when the page/item caps are hit. A failed page request
//! ends reading early with whatever was accumulated; it is never an error.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::domain::RawPost;
use super::config::AppConfig;
use super::http_client::{HttpClient, RequestPacer};

/// Reddit never returns more than 100 posts per page
pub const MAX_PAGE_SIZE: u32 = 100;

/// Reader settings
#[derive(Debug, Clone)]
pub struct FeedReaderConfig {
    pub feed_url: String,
    pub page_size: u32,
    pub max_pages: u32,
    /// Only applied when no cutoff is given
    pub max_items: usize,
    /// Maximum post age; `None` reads the newest `max_items` posts
    pub max_age: Option<chrono::Duration>,
}

impl FeedReaderConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            feed_url: config.feed_url.clone(),
            page_size: config.feed_page_size,
            max_pages: config.max_pages,
            max_items: config.max_items,
            max_age: config.age_cutoff(),
        }
    }
}

/// Why reading stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStop {
    /// A page came back with no posts
    Exhausted,
    /// The last page carried no continuation cursor
    NoCursor,
    /// A post older than the cutoff was seen
    CutoffReached,
    /// `max_items` posts collected (no-cutoff mode)
    ItemLimit,
    /// `max_pages` pages fetched
    PageLimit,
    /// A page request failed; posts hold whatever came before it
    FetchFailed,
}

/// Posts read during one cycle, newest first
#[derive(Debug, Clone)]
pub struct FeedBatch {
    pub posts: Vec<RawPost>,
    pub pages_fetched: u32,
    pub stop: FeedStop,
}

impl FeedBatch {
    /// The very first page failed, so there is nothing to build a catalog from.
    pub fn is_unavailable(&self) -> bool {
        self.stop == FeedStop::FetchFailed && self.pages_fetched == 0
    }
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
    #[serde(default)]
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: ListingPost,
}

#[derive(Debug, Deserialize)]
struct ListingPost {
    id: String,
    title: String,
    #[serde(default)]
    thumbnail: Option<String>,
    created_utc: f64,
}

impl ListingPost {
    #[allow(clippy::cast_possible_truncation)]
    fn into_raw_post(self) -> RawPost {
        RawPost {
            id: self.id,
            title: self.title,
            created_utc: self.created_utc.floor() as i64,
            thumbnail: self.thumbnail.filter(|t| !t.is_empty()),
        }
    }
}

/// Paginated feed reader
pub struct FeedReader {
    client: HttpClient,
    pacer: RequestPacer,
    config: FeedReaderConfig,
}

impl FeedReader {
    pub fn new(client: HttpClient, pacer: RequestPacer, config: FeedReaderConfig) -> Self {
        Self { client, pacer, config }
    }

    pub fn config(&self) -> &FeedReaderConfig {
        &self.config
    }

    /// Cutoff for a cycle starting at `now`
    pub fn cutoff_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.config.max_age.map(|age| now - age)
    }

    /// Read the feed using the configured age window
    pub async fn read_latest(&self) -> FeedBatch {
        self.read_until(self.cutoff_at(Utc::now())).await
    }

    /// Read newest-first until `cutoff` (or the item cap when `cutoff` is `None`)
    pub async fn read_until(&self, cutoff: Option<DateTime<Utc>>) -> FeedBatch {
        let page_size = self.config.page_size.clamp(1, MAX_PAGE_SIZE).to_string();
        let cutoff_ts = cutoff.map(|c| c.timestamp());
        let mut posts: Vec<RawPost> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages_fetched = 0u32;

        info!(
            "📥 Reading feed {} (page size {}, cutoff {:?})",
            self.config.feed_url, page_size, cutoff
        );

        let stop = loop {
            if pages_fetched >= self.config.max_pages {
                break FeedStop::PageLimit;
            }
            if pages_fetched > 0 {
                self.pacer.pause().await;
            }

            let mut query = vec![("limit", page_size.as_str())];
            if let Some(after) = cursor.as_deref() {
                query.push(("after", after));
            }

            let listing = match self
                .client
                .get_json_with_query::<Listing>(&self.config.feed_url, &query)
                .await
            {
                Ok(listing) => listing,
                Err(e) => {
                    warn!(
                        "⚠️ Feed page {} failed, keeping {} posts read so far: {}",
                        pages_fetched + 1,
                        posts.len(),
                        e
                    );
                    break FeedStop::FetchFailed;
                }
            };
            pages_fetched += 1;

            let ListingData { children, after } = listing.data;
            debug!("Feed page {} returned {} posts", pages_fetched, children.len());
            if children.is_empty() {
                break FeedStop::Exhausted;
            }

            let mut page_stop = None;
            for child in children {
                let post = child.data.into_raw_post();
                if cutoff_ts.is_some_and(|ts| post.created_utc < ts) {
                    page_stop = Some(FeedStop::CutoffReached);
                    break;
                }
                posts.push(post);
                if cutoff_ts.is_none() && posts.len() >= self.config.max_items {
                    page_stop = Some(FeedStop::ItemLimit);
                    break;
                }
            }
            if let Some(stop) = page_stop {
                break stop;
            }

            match after {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break FeedStop::NoCursor,
            }
        };

        info!(
            "📥 Feed read finished: {} posts from {} pages ({:?})",
            posts.len(),
            pages_fetched,
            stop
        );

        FeedBatch {
            posts,
            pages_fetched,
            stop,
        }
    }
}
