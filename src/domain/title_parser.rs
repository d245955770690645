//! Title/year extraction from free-form listing titles
//!
//! Release posts look like `Saltburn.2023.1080p.WEB.H264-EDITH` or
//! `Poor Things (2023) 1080p WEBRip`. The pattern is conservative: a title,
//! one or more separators (`.`, whitespace, `(`), a 4-digit year and a
//! closing separator (`.`, whitespace, `)`). Anything else is not a match.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TITLE_YEAR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?)[.\s(]+(\d{4})[.\s)]+").expect("title/year pattern must compile")
});

/// Title/year pair extracted from a raw post title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCandidate {
    pub title: String,
    /// Exact 4-digit year substring, absent when the title did not parse
    pub year: Option<String>,
}

impl ParsedCandidate {
    pub fn new(title: impl Into<String>, year: Option<&str>) -> Self {
        Self {
            title: title.into(),
            year: year.map(str::to_string),
        }
    }

    pub fn has_year(&self) -> bool {
        self.year.is_some()
    }

    /// Query string used against the metadata resolver, e.g. `Saltburn 2023`
    pub fn search_query(&self) -> Option<String> {
        self.year.as_ref().map(|year| format!("{} {}", self.title, year))
    }
}

/// Strict variant: `None` when the raw title does not carry a year.
pub fn parse_strict(raw: &str) -> Option<ParsedCandidate> {
    let captures = TITLE_YEAR_PATTERN.captures(raw)?;
    let title = captures.get(1)?.as_str().replace('.', " ");
    let year = captures.get(2)?.as_str();

    Some(ParsedCandidate::new(title.trim(), Some(year)))
}

/// Permissive variant: falls back to the unchanged input with no year.
pub fn parse_permissive(raw: &str) -> ParsedCandidate {
    parse_strict(raw).unwrap_or_else(|| ParsedCandidate::new(raw, None))
}

/// Lowercased, whitespace-collapsed form used for cache keys.
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
