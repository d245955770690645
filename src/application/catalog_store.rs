//! Shared holder for the published snapshot and the refresh status
//!
//! Readers clone the current `Arc<Snapshot>` and keep it for the duration of
//! a request; the refresh task swaps in a new one atomically.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::{RefreshStatus, Snapshot};

#[derive(Debug, Default)]
pub struct CatalogStore {
    snapshot: RwLock<Arc<Snapshot>>,
    status: RwLock<RefreshStatus>,
    refreshing: AtomicBool,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the served snapshot
    pub async fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let mut current = self.snapshot.write().await;
        info!(
            "📦 Publishing snapshot generation {} ({} items, previous had {})",
            snapshot.generation(),
            snapshot.len(),
            current.len()
        );
        *current = Arc::clone(&snapshot);
        snapshot
    }

    pub async fn current_snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.snapshot.read().await)
    }

    pub async fn set_status(&self, status: RefreshStatus) {
        debug!("Refresh status: {}", status);
        *self.status.write().await = status;
    }

    pub async fn status(&self) -> RefreshStatus {
        self.status.read().await.clone()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// Claim the single refresh slot. `None` while another cycle holds it.
    pub fn try_begin_refresh(&self) -> Option<RefreshGuard<'_>> {
        self.refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshGuard { store: self })
    }
}

/// Releases the refresh slot when dropped
#[derive(Debug)]
pub struct RefreshGuard<'a> {
    store: &'a CatalogStore,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.store.refreshing.store(false, Ordering::Release);
    }
}
