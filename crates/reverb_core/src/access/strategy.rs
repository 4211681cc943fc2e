//! # Access Strategies
//!
//! The host talks to one strategy, chosen once at startup:
//!
//! | Mode       | `on_tick`                      | `read_proxy`                |
//! |------------|--------------------------------|-----------------------------|
//! | `Snapshot` | refreshes the world's cache    | newest snapshot, lock-free  |
//! | `Direct`   | nothing                        | live world behind its lock  |

use std::sync::Arc;

use reverb_shared::Vec3;

use super::{DirectAccess, ReadProxy};
use crate::cache::{RefreshOutcome, SnapshotCache, WorldCaches, LEVEL_CACHE_PROFILER};
use crate::config::{AccessMode, CacheConfig};
use crate::profiling::{DurationProfiler, ProfilerRegistry};
use crate::world::{LiveWorld, WorldHandle, WorldId};

/// How reader threads get at world data, and what the tick thread does for it.
pub trait AccessStrategy<W>: Send + Sync {
    /// Mode this strategy implements.
    fn mode(&self) -> AccessMode;

    /// Called by the tick thread once per world tick.
    ///
    /// Returns what happened to the world's snapshot, or `None` if the
    /// strategy keeps no snapshots.
    fn on_tick(&self, id: WorldId, world: &W, observer: Vec3) -> Option<RefreshOutcome>;

    /// Proxy for one logical read operation, from any thread.
    ///
    /// `None` if the world is absent or has no data available yet.
    fn read_proxy(&self, world: Option<&WorldHandle<W>>) -> Option<ReadProxy>;

    /// Drops whatever the strategy holds for an unloaded world.
    fn forget(&self, id: WorldId);
}

/// Snapshot-backed access, the default.
#[derive(Debug)]
pub struct CachedAccess {
    config: CacheConfig,
    profiler: Arc<DurationProfiler>,
    caches: WorldCaches,
}

impl CachedAccess {
    /// Creates the strategy; every world's cache records into `profiler`.
    #[must_use]
    pub fn new(config: CacheConfig, profiler: Arc<DurationProfiler>) -> Self {
        Self {
            config,
            profiler,
            caches: WorldCaches::new(),
        }
    }

    /// Cache of one world, if it has been ticked.
    #[must_use]
    pub fn cache(&self, id: WorldId) -> Option<Arc<SnapshotCache>> {
        self.caches.get(id)
    }

    /// All per-world caches.
    #[must_use]
    pub fn caches(&self) -> &WorldCaches {
        &self.caches
    }
}

impl<W> AccessStrategy<W> for CachedAccess
where
    W: LiveWorld + Send + Sync + 'static,
{
    fn mode(&self) -> AccessMode {
        AccessMode::Snapshot
    }

    fn on_tick(&self, id: WorldId, world: &W, observer: Vec3) -> Option<RefreshOutcome> {
        let cache = self.caches.get_or_insert_with(id, || {
            SnapshotCache::new(&self.config, Arc::clone(&self.profiler))
        });
        Some(cache.on_tick(world, observer, world.game_time()))
    }

    fn read_proxy(&self, world: Option<&WorldHandle<W>>) -> Option<ReadProxy> {
        let Some(handle) = world else {
            tracing::warn!("Requested level does not exist");
            return None;
        };
        let Some(cache) = self.caches.get(handle.id()) else {
            tracing::warn!(world = %handle.id(), "Requested level has not been cached");
            return None;
        };
        cache.read_proxy()
    }

    fn forget(&self, id: WorldId) {
        self.caches.remove(id);
    }
}

/// Live-world access behind the world's lock. Debug and fallback only.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectAccessStrategy;

impl<W> AccessStrategy<W> for DirectAccessStrategy
where
    W: LiveWorld + Send + Sync + 'static,
{
    fn mode(&self) -> AccessMode {
        AccessMode::Direct
    }

    fn on_tick(&self, _id: WorldId, _world: &W, _observer: Vec3) -> Option<RefreshOutcome> {
        None
    }

    fn read_proxy(&self, world: Option<&WorldHandle<W>>) -> Option<ReadProxy> {
        let Some(handle) = world else {
            tracing::warn!("Requested level does not exist");
            return None;
        };
        Some(Arc::new(DirectAccess::new(Arc::clone(handle.world()))))
    }

    fn forget(&self, _id: WorldId) {}
}

/// Builds the strategy named by `config.access_mode`.
///
/// Called once at startup; the returned strategy is used for the lifetime of
/// the host.
#[must_use]
pub fn select_strategy<W>(
    config: &CacheConfig,
    profilers: &ProfilerRegistry,
) -> Box<dyn AccessStrategy<W>>
where
    W: LiveWorld + Send + Sync + 'static,
{
    if let Err(err) = config.validate() {
        tracing::warn!(%err, "Level cache config failed validation, out-of-range values are clamped");
    }

    match config.access_mode {
        AccessMode::Snapshot => {
            let profiler = profilers.get_or_create(LEVEL_CACHE_PROFILER);
            Box::new(CachedAccess::new(config.clone(), profiler))
        }
        AccessMode::Direct => {
            tracing::warn!("Direct level access enabled, readers will contend with the tick thread");
            Box::new(DirectAccessStrategy)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{BlockState, ChunkedWorld};
    use reverb_shared::BlockPos;

    fn handle() -> WorldHandle<ChunkedWorld> {
        WorldHandle::new(WorldId(0), ChunkedWorld::flat(2, -1, 1, 4))
    }

    #[test]
    fn test_select_by_mode() {
        let profilers = ProfilerRegistry::new();
        let cached: Box<dyn AccessStrategy<ChunkedWorld>> =
            select_strategy(&CacheConfig::default(), &profilers);
        assert_eq!(cached.mode(), AccessMode::Snapshot);
        assert!(profilers.get(LEVEL_CACHE_PROFILER).is_some());

        let config = CacheConfig {
            access_mode: AccessMode::Direct,
            ..CacheConfig::default()
        };
        let direct: Box<dyn AccessStrategy<ChunkedWorld>> = select_strategy(&config, &profilers);
        assert_eq!(direct.mode(), AccessMode::Direct);
    }

    #[test]
    fn test_cached_proxy_lifecycle() {
        let strategy = CachedAccess::new(
            CacheConfig {
                clone_radius: 1,
                ..CacheConfig::default()
            },
            Arc::new(DurationProfiler::new(LEVEL_CACHE_PROFILER)),
        );
        let handle = handle();

        assert!(AccessStrategy::<ChunkedWorld>::read_proxy(&strategy, None).is_none());
        assert!(strategy.read_proxy(Some(&handle)).is_none());

        let outcome = strategy.on_tick(handle.id(), &*handle.read(), Vec3::new(0.0, 8.0, 0.0));
        assert!(outcome.is_some_and(|o| o.is_rebuilt()));

        let proxy = strategy.read_proxy(Some(&handle)).unwrap();
        assert_eq!(proxy.block_at(BlockPos::new(0, 4, 0)), Some(BlockState::DIRT));

        AccessStrategy::<ChunkedWorld>::forget(&strategy, handle.id());
        assert!(strategy.cache(handle.id()).is_none());
        assert!(strategy.read_proxy(Some(&handle)).is_none());
    }

    #[test]
    fn test_oversized_radius_is_clamped() {
        let strategy = CachedAccess::new(
            CacheConfig {
                clone_radius: 1000,
                ..CacheConfig::default()
            },
            Arc::new(DurationProfiler::new(LEVEL_CACHE_PROFILER)),
        );
        let handle = handle();
        strategy.on_tick(handle.id(), &*handle.read(), Vec3::ZERO);

        let cache = strategy.cache(handle.id()).unwrap();
        assert_eq!(cache.clone_radius(), reverb_shared::MAX_CLONE_RADIUS);
        assert_eq!(cache.current().unwrap().radius(), reverb_shared::MAX_CLONE_RADIUS);
    }

    #[test]
    fn test_direct_reads_live_world() {
        let handle = handle();
        let strategy = DirectAccessStrategy;
        assert!(strategy.on_tick(handle.id(), &*handle.read(), Vec3::ZERO).is_none());

        let proxy = strategy.read_proxy(Some(&handle)).unwrap();
        let pos = BlockPos::new(1, 9, 1);
        assert_eq!(proxy.block_at(pos), Some(BlockState::AIR));
        handle.write().set_block(pos, BlockState::IRON);
        assert_eq!(proxy.block_at(pos), Some(BlockState::IRON));
        assert!(AccessStrategy::<ChunkedWorld>::read_proxy(&strategy, None).is_none());
    }
}
