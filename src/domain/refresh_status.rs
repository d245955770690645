//! Progress of the current refresh cycle

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process-wide status of the refresh pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RefreshStatus {
    #[default]
    Initializing,
    Scraping,
    /// Number of posts being resolved
    Processing(usize),
    /// Number of items in the published snapshot
    Ready(usize),
    Error(String),
}

impl RefreshStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for RefreshStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => write!(f, "Initializing..."),
            Self::Scraping => write!(f, "Scraping..."),
            Self::Processing(count) => write!(f, "Processing {count} items..."),
            Self::Ready(_) => write!(f, "Ready"),
            Self::Error(message) => write!(f, "Error: {message}"),
        }
    }
}
