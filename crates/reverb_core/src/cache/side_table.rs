//! Per-world cache slots, keyed by world identity.
//!
//! The map is copy-on-write: the tick thread swaps in a new map when a world
//! appears or goes away, readers look caches up without taking a lock.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use super::slot::SnapshotCache;
use crate::world::WorldId;

/// Side-table from [`WorldId`] to that world's [`SnapshotCache`].
#[derive(Debug, Default)]
pub struct WorldCaches {
    caches: ArcSwap<HashMap<WorldId, Arc<SnapshotCache>>>,
}

impl WorldCaches {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache of one world, if it has been created.
    #[must_use]
    pub fn get(&self, id: WorldId) -> Option<Arc<SnapshotCache>> {
        self.caches.load().get(&id).cloned()
    }

    /// Cache of one world, creating it with `create` on first use.
    ///
    /// If another thread inserts the same world first, its cache wins and
    /// the one built here is dropped.
    pub fn get_or_insert_with(
        &self,
        id: WorldId,
        create: impl FnOnce() -> SnapshotCache,
    ) -> Arc<SnapshotCache> {
        if let Some(cache) = self.get(id) {
            return cache;
        }

        let fresh = Arc::new(create());
        let previous = self.caches.rcu(|caches| {
            let mut caches = HashMap::clone(caches);
            caches.entry(id).or_insert_with(|| Arc::clone(&fresh));
            caches
        });

        match previous.get(&id) {
            Some(existing) => Arc::clone(existing),
            None => {
                tracing::debug!(world = %id, "Created level cache");
                fresh
            }
        }
    }

    /// Forgets one world's cache, returning it if it existed.
    ///
    /// Readers that already hold the cache or one of its snapshots keep them.
    pub fn remove(&self, id: WorldId) -> Option<Arc<SnapshotCache>> {
        let previous = self.caches.rcu(|caches| {
            let mut caches = HashMap::clone(caches);
            caches.remove(&id);
            caches
        });
        let removed = previous.get(&id).cloned();
        if removed.is_some() {
            tracing::debug!(world = %id, "Dropped level cache");
        }
        removed
    }

    /// Number of worlds with a cache.
    #[must_use]
    pub fn len(&self) -> usize {
        self.caches.load().len()
    }

    /// Returns true if no world has a cache.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.caches.load().is_empty()
    }

    /// Identities of all worlds with a cache, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<WorldId> {
        let mut ids: Vec<_> = self.caches.load().keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
