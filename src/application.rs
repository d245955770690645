//! Application layer module
//!
//! Orchestrates the refresh pipeline (resolution, reconciliation, scheduling)
//! and the read side served over HTTP.

pub mod catalog_service;
pub mod catalog_store;
pub mod reconciler;
pub mod refresh_service;
pub mod resolution_chain;
pub mod scheduler;

// Re-export commonly used items
pub use catalog_service::{parse_extra, CatalogPage, CatalogService, CatalogState, HealthReport, MetaLookup, CATALOG_ID};
pub use catalog_store::{CatalogStore, RefreshGuard};
pub use reconciler::{dedupe_by_id, find_reusable, ReconcileReport, Reconciler};
pub use refresh_service::{RefreshError, RefreshService, RefreshSummary};
pub use resolution_chain::{fallback_item, PosterPolicy, ResolutionChain, ResolutionOutcome};
pub use scheduler::RefreshScheduler;
