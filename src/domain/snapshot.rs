//! One complete generation of the catalog

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::catalog_item::CatalogItem;

/// Ordered, read-only catalog generation.
///
/// Items are reference counted so that an entry reused from the previous
/// generation is the very same allocation, not a copy.
#[derive(Debug, Clone)]
pub struct Snapshot {
    items: Vec<Arc<CatalogItem>>,
    generation: u64,
    built_at: DateTime<Utc>,
}

impl Snapshot {
    /// Generation 0, served before the first cycle completes
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            generation: 0,
            built_at: Utc::now(),
        }
    }

    /// Only the reconciler assembles populated snapshots.
    pub(crate) fn new(items: Vec<Arc<CatalogItem>>, generation: u64) -> Self {
        Self {
            items,
            generation,
            built_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn items(&self) -> &[Arc<CatalogItem>] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CatalogItem>> {
        self.items.iter()
    }

    /// Up to `size` items starting at `offset`; empty when out of range.
    pub fn page(&self, offset: usize, size: usize) -> &[Arc<CatalogItem>] {
        let start = offset.min(self.items.len());
        let end = start.saturating_add(size).min(self.items.len());
        &self.items[start..end]
    }

    pub fn find(&self, id: &str) -> Option<&Arc<CatalogItem>> {
        self.items.iter().find(|item| item.id == id)
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}
