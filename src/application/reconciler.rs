//! Stale-vs-fresh reconciliation
//!
//! Builds the next snapshot from freshly read posts, reusing items from the
//! previous snapshot where the same title/year was already resolved, then
//! dropping duplicate ids.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::application::resolution_chain::{ResolutionChain, ResolutionOutcome};
use crate::domain::{parse_permissive, CatalogItem, ParsedCandidate, RawPost, Snapshot};

/// First resolved previous item carrying the candidate's normalized title and year.
///
/// Fallback items are never reused, so an unmatched post is resolved again next cycle.
pub fn find_reusable<'a>(previous: &'a Snapshot, candidate: &ParsedCandidate) -> Option<&'a Arc<CatalogItem>> {
    if !candidate.has_year() {
        return None;
    }
    previous
        .iter()
        .filter(|item| !item.is_fallback())
        .find(|item| item.matches_candidate(candidate))
}

/// Keep the first item for each id; returns the number of dropped duplicates.
pub fn dedupe_by_id(items: &mut Vec<Arc<CatalogItem>>) -> usize {
    let before = items.len();
    let mut seen = HashSet::with_capacity(before);
    items.retain(|item| {
        let first = seen.insert(item.id.clone());
        if !first {
            debug!("Dropping duplicate id {}", item.id);
        }
        first
    });
    before - items.len()
}

/// Counters for one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub posts: usize,
    pub reused: usize,
    pub resolved: usize,
    pub scored: usize,
    pub fallback: usize,
    pub duplicates: usize,
}

impl ReconcileReport {
    /// Items in the snapshot this report describes
    pub fn published(&self) -> usize {
        self.reused + self.resolved + self.fallback - self.duplicates
    }
}

pub struct Reconciler {
    chain: ResolutionChain,
}

impl Reconciler {
    pub fn new(chain: ResolutionChain) -> Self {
        Self { chain }
    }

    pub fn chain(&self) -> &ResolutionChain {
        &self.chain
    }

    /// Build the next snapshot. Order follows the feed; generation is previous + 1.
    pub async fn reconcile(&self, previous: &Snapshot, posts: &[RawPost]) -> (Snapshot, ReconcileReport) {
        let mut report = ReconcileReport {
            posts: posts.len(),
            ..ReconcileReport::default()
        };
        let mut items = Vec::with_capacity(posts.len());

        for post in posts {
            let candidate = parse_permissive(&post.title);

            if let Some(existing) = find_reusable(previous, &candidate) {
                debug!("♻️ Reusing {} for '{}'", existing.id, post.title);
                items.push(Arc::clone(existing));
                report.reused += 1;
                continue;
            }

            let (item, outcome) = self.chain.resolve(post, &candidate).await;
            match outcome {
                ResolutionOutcome::Matched { scored } => {
                    report.resolved += 1;
                    if scored {
                        report.scored += 1;
                    }
                }
                ResolutionOutcome::Fallback => report.fallback += 1,
            }
            items.push(Arc::new(item));
        }

        report.duplicates = dedupe_by_id(&mut items);
        let snapshot = Snapshot::new(items, previous.generation() + 1);

        info!(
            "🧩 Reconciled {} posts: {} reused, {} resolved ({} scored), {} fallback, {} duplicates",
            report.posts, report.reused, report.resolved, report.scored, report.fallback, report.duplicates
        );
        (snapshot, report)
    }
}
