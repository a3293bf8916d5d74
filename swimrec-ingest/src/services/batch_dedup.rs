//! In-run deduplication by canonical key
//!
//! First-seen wins. Later candidates for a key already taken this run are
//! dropped before reconciliation.

use std::collections::HashSet;

use crate::models::CanonicalKey;

/// Keys already claimed in the current run
#[derive(Debug, Default)]
pub struct BatchDeduplicator {
    seen: HashSet<CanonicalKey>,
}

impl BatchDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `key` is new to this run (and claims it)
    pub fn claim(&mut self, key: &CanonicalKey, source: &str) -> bool {
        if self.seen.contains(key) {
            tracing::debug!(key = %key, source, "Duplicate candidate in run, dropped");
            return false;
        }
        self.seen.insert(key.clone());
        true
    }
}
