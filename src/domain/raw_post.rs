//! Raw listing posts as they come off the upstream feed

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// One post from the listing feed. Immutable for the duration of a refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPost {
    /// Source identifier assigned by the feed (reddit base36 id)
    pub id: String,
    /// Free-text post title, e.g. `Saltburn.2023.1080p.WEB.H264`
    pub title: String,
    /// Creation time in seconds since epoch
    pub created_utc: i64,
    /// Thumbnail as reported by the feed; may be a marker like `self` or `default`
    pub thumbnail: Option<String>,
}

impl RawPost {
    pub fn new(id: impl Into<String>, title: impl Into<String>, created_utc: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            created_utc,
            thumbnail: None,
        }
    }

    #[must_use]
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.created_utc, 0).single()
    }

    /// Thumbnail only when it is an absolute http(s) URL.
    pub fn absolute_thumbnail(&self) -> Option<&str> {
        let thumbnail = self.thumbnail.as_deref()?;
        match Url::parse(thumbnail) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Some(thumbnail),
            _ => None,
        }
    }
}
