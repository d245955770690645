//! The unit served to clients: one catalog entry in Stremio `MetaPreview` shape

use serde::{Deserialize, Serialize};
use std::fmt;

use super::refresh_status::RefreshStatus;
use super::title_parser::{normalize_title, ParsedCandidate};

/// Type tag carried by every item
pub const MEDIA_TYPE: &str = "movie";

/// Release-year sentinel when neither resolver nor parser produced a year
pub const UNKNOWN_RELEASE: &str = "unknown";

/// Namespace for items synthesized from unmatched posts
pub const FALLBACK_ID_PREFIX: &str = "leaks_";

/// Identifier of the synthetic status item served while the catalog is empty
pub const PLACEHOLDER_ID: &str = "movieleaks_status";

const SCORE_NAME_MARKER: &str = "🍅 ";
const SCORE_NAME_SEPARATOR: &str = " | ";

/// Provider a score was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreSource {
    /// Primary provider, keyed by canonical id
    RottenTomatoes,
    /// Secondary provider, keyed by title/year search
    Tmdb,
}

impl ScoreSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::RottenTomatoes => "Rotten Tomatoes",
            Self::Tmdb => "TMDB",
        }
    }
}

/// Percentage-style critic score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub percent: u8,
    pub source: ScoreSource,
}

impl Score {
    pub fn new(percent: u8, source: ScoreSource) -> Self {
        Self {
            percent: percent.min(100),
            source,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent)
    }
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub release_info: String,
    /// Parsed title that produced this item; in-memory only
    #[serde(skip)]
    pub source_title: Option<String>,
    #[serde(skip)]
    pub score: Option<Score>,
}

impl CatalogItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, release_info: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            item_type: MEDIA_TYPE.to_string(),
            name: name.into(),
            poster: None,
            description: None,
            release_info: release_info.into(),
            source_title: None,
            score: None,
        }
    }

    /// `leaks_<source id>`
    pub fn fallback_id(source_id: &str) -> String {
        format!("{FALLBACK_ID_PREFIX}{source_id}")
    }

    pub fn is_fallback(&self) -> bool {
        self.id.starts_with(FALLBACK_ID_PREFIX)
    }

    /// Synthetic item describing the refresh status, served while the catalog is empty.
    pub fn placeholder(status: &RefreshStatus) -> Self {
        let mut item = Self::new(PLACEHOLDER_ID, format!("Movie Leaks: {status}"), UNKNOWN_RELEASE);
        item.description = Some(format!(
            "The catalog is not ready yet. Current status: {status}. Check back in a few minutes."
        ));
        item
    }

    /// Prefix the display name with a score annotation: `🍅 93% | Saltburn`
    pub fn annotated_name(name: &str, score: Option<Score>) -> String {
        match score {
            Some(score) => format!("{SCORE_NAME_MARKER}{score}{SCORE_NAME_SEPARATOR}{name}"),
            None => name.to_string(),
        }
    }

    /// Display name with any score annotation removed
    pub fn plain_name(&self) -> &str {
        if let Some(rest) = self.name.strip_prefix(SCORE_NAME_MARKER) {
            if let Some((_, name)) = rest.split_once(SCORE_NAME_SEPARATOR) {
                return name;
            }
        }
        &self.name
    }

    /// True when this item was produced from (or names) the same title/year as the candidate.
    ///
    /// Candidates without a year never match; their items carry the `unknown` sentinel.
    pub fn matches_candidate(&self, candidate: &ParsedCandidate) -> bool {
        let Some(year) = candidate.year.as_deref() else {
            return false;
        };
        if self.release_info.trim() != year {
            return false;
        }

        let wanted = normalize_title(&candidate.title);
        let by_source = self
            .source_title
            .as_deref()
            .is_some_and(|source| normalize_title(source) == wanted);

        by_source || normalize_title(self.plain_name()) == wanted
    }
}
