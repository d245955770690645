//! Domain module - catalog entities and pure parsing logic
//!
//! Everything in here is free of I/O: raw feed posts, parsed candidates,
//! the served catalog item, snapshots of the catalog and the refresh status.

pub mod catalog_item;
pub mod raw_post;
pub mod refresh_status;
pub mod snapshot;
pub mod title_parser;

// Re-export commonly used items for convenience
pub use catalog_item::{
    CatalogItem, Score, ScoreSource, FALLBACK_ID_PREFIX, MEDIA_TYPE, PLACEHOLDER_ID, UNKNOWN_RELEASE,
};
pub use raw_post::RawPost;
pub use refresh_status::RefreshStatus;
pub use snapshot::Snapshot;
pub use title_parser::{normalize_title, parse_permissive, parse_strict, ParsedCandidate};
