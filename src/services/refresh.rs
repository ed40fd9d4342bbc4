//! Aggregate refresh coordination
//!
//! Mutating catalog/interaction operations mark the precomputed aggregate
//! tables stale; the recommendation paths refresh them lazily before reading.
//! Refresh is best-effort and inline: a failed procedure call is logged and
//! ranking proceeds with stale data. Two racing callers may both refresh;
//! that only costs a redundant recomputation.

use std::sync::atomic::{AtomicBool, Ordering};

use sqlx::PgPool;
use tracing::{debug, warn};

use crate::domain::recommend;

/// Shared staleness state, injected into every service that mutates or reads
/// the aggregates. Replaces a process-wide global with an explicit component.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    stale: AtomicBool,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by any operation that changes what the aggregates summarize.
    pub fn mark_stale(&self) {
        self.stale.store(true, Ordering::Relaxed);
    }

    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::Relaxed)
    }

    /// Run all three refresh procedures if anything is stale, then clear the
    /// flag. Individual procedure failures are logged, never propagated.
    pub async fn refresh_if_stale(&self, db: &PgPool) {
        if !self.stale.swap(false, Ordering::Relaxed) {
            return;
        }
        self.refresh_now(db).await;
    }

    /// Unconditional best-effort refresh of all aggregate tables.
    pub async fn refresh_now(&self, db: &PgPool) {
        if let Err(e) = recommend::refresh_video_aggregates(db).await {
            warn!("video aggregate refresh failed: {}", e);
        }
        if let Err(e) = recommend::refresh_interaction_aggregates(db).await {
            warn!("interaction aggregate refresh failed: {}", e);
        }
        if let Err(e) = recommend::refresh_video_stats(db).await {
            warn!("video stats refresh failed: {}", e);
        }
        debug!("aggregate refresh pass completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_fresh_and_marks_sticky() {
        let coordinator = RefreshCoordinator::new();
        assert!(!coordinator.is_stale());
        coordinator.mark_stale();
        coordinator.mark_stale();
        assert!(coordinator.is_stale());
    }
}
