//! # Snapshot Cache Slot
//!
//! One world's current snapshot plus the logic that keeps it fresh.
//!
//! ## Publish Protocol
//!
//! ```text
//! Tick thread                               Reader threads
//! ───────────                               ──────────────
//! on_tick(world, observer, tick)
//!   ├─ policy.evaluate(...)  ── Retain ──►  (nothing happens)
//!   └─ Refresh
//!        ├─ Snapshot::build   (timed)
//!        └─ current.store(new) ───────────► current() / read_proxy()
//!                                           see old OR new, never a mix
//! ```
//!
//! The superseded snapshot is released by the slot, but every reader that
//! already loaded it keeps its own `Arc` until it is done.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use reverb_shared::{BlockPos, Vec3, MAX_CLONE_RADIUS};

use super::policy::{RefreshDecision, RefreshPolicy, RefreshReason, Staleness};
use crate::access::ReadProxy;
use crate::config::CacheConfig;
use crate::profiling::DurationProfiler;
use crate::snapshot::Snapshot;
use crate::world::LiveWorld;

/// Identifier of the profiler that times snapshot rebuilds.
pub const LEVEL_CACHE_PROFILER: &str = "Level Caching";

/// What one `on_tick` call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The current snapshot was kept.
    Retained(Staleness),
    /// A new snapshot was built and published.
    Rebuilt {
        /// Trigger that caused the rebuild.
        reason: RefreshReason,
        /// Tick the new snapshot is tagged with.
        tick: u64,
        /// Origin the new snapshot is centered on.
        origin: BlockPos,
        /// Rebuild duration, if the profiler recorded it.
        elapsed_ms: Option<u64>,
    },
}

impl RefreshOutcome {
    /// Returns true if a new snapshot was published.
    #[inline]
    #[must_use]
    pub const fn is_rebuilt(&self) -> bool {
        matches!(self, Self::Rebuilt { .. })
    }
}

/// Atomic slot holding the newest snapshot of one world.
///
/// Written by exactly one thread (the world's tick thread), read by any
/// number of threads without locking.
#[derive(Debug)]
pub struct SnapshotCache {
    current: ArcSwapOption<Snapshot>,
    policy: RefreshPolicy,
    clone_radius: u32,
    report_interval: u64,
    profiler: Arc<DurationProfiler>,
    /// Set while a rebuild is in flight.
    rebuilding: AtomicBool,
    rebuilds: AtomicU64,
    #[cfg(debug_assertions)]
    writer: std::sync::OnceLock<std::thread::ThreadId>,
}

impl SnapshotCache {
    /// Creates an empty cache tuned by `config`, timing rebuilds with `profiler`.
    #[must_use]
    pub fn new(config: &CacheConfig, profiler: Arc<DurationProfiler>) -> Self {
        Self::with_policy(
            RefreshPolicy::from_config(config),
            config.clone_radius,
            config.report_interval,
            profiler,
        )
    }

    /// Creates an empty cache from explicit parts.
    ///
    /// `clone_radius` is clamped to [`MAX_CLONE_RADIUS`].
    #[must_use]
    pub fn with_policy(
        policy: RefreshPolicy,
        clone_radius: u32,
        report_interval: u64,
        profiler: Arc<DurationProfiler>,
    ) -> Self {
        if clone_radius > MAX_CLONE_RADIUS {
            tracing::warn!(
                clone_radius,
                max = MAX_CLONE_RADIUS,
                "Clone radius out of range, clamping"
            );
        }
        let clone_radius = clone_radius.min(MAX_CLONE_RADIUS);

        Self {
            current: ArcSwapOption::empty(),
            policy,
            clone_radius,
            report_interval,
            profiler,
            rebuilding: AtomicBool::new(false),
            rebuilds: AtomicU64::new(0),
            #[cfg(debug_assertions)]
            writer: std::sync::OnceLock::new(),
        }
    }

    /// Refreshes the snapshot if it is missing, too old, or too far away.
    ///
    /// Must be called from the world's tick thread, once per tick, while it
    /// holds the world. The new snapshot is fully built before it becomes
    /// visible to readers.
    ///
    /// # Panics
    ///
    /// Panics if another rebuild on this cache is in flight. Debug builds
    /// also panic when called from a different thread than the first call.
    pub fn on_tick<W: LiveWorld + ?Sized>(
        &self,
        world: &W,
        observer: Vec3,
        current_tick: u64,
    ) -> RefreshOutcome {
        self.debug_check_writer();

        let origin = BlockPos::floor(observer);
        let previous = self.current.load_full().map(|s| (s.tick(), s.origin()));

        let reason = match self.policy.evaluate(previous, current_tick, origin) {
            RefreshDecision::Retain(staleness) => return RefreshOutcome::Retained(staleness),
            RefreshDecision::Refresh(reason) => reason,
        };

        let _guard = RebuildGuard::acquire(&self.rebuilding);
        tracing::debug!(
            %reason,
            tick = current_tick,
            %origin,
            max_retain_ticks = self.policy.max_retain_ticks(),
            max_retain_distance = self.policy.max_retain_distance(),
            "Rebuilding level snapshot"
        );

        let mut measurement = self.profiler.begin_measurement();
        let snapshot = Snapshot::build(world, origin, current_tick, self.clone_radius);
        self.current.store(Some(Arc::new(snapshot)));
        let elapsed_ms = measurement.finish();

        self.rebuilds.fetch_add(1, Ordering::Relaxed);
        self.profiler
            .on_tally(self.report_interval, DurationProfiler::log_results);

        RefreshOutcome::Rebuilt {
            reason,
            tick: current_tick,
            origin,
            elapsed_ms,
        }
    }

    /// Newest published snapshot, if any. Lock-free.
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    /// Read proxy over the newest snapshot.
    ///
    /// `None` (and a warning) before the first publish.
    #[must_use]
    pub fn read_proxy(&self) -> Option<ReadProxy> {
        match self.current() {
            Some(snapshot) => Some(snapshot as ReadProxy),
            None => {
                tracing::warn!("Level snapshot requested before one was published");
                None
            }
        }
    }

    /// Drops the current snapshot; the next tick rebuilds from scratch.
    ///
    /// # Panics
    ///
    /// Debug builds panic when called from a thread other than the writer.
    pub fn invalidate(&self) {
        self.debug_check_writer();
        self.current.store(None);
    }

    /// Number of snapshots published so far.
    #[inline]
    #[must_use]
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds.load(Ordering::Relaxed)
    }

    /// Profiler timing the rebuilds.
    #[inline]
    #[must_use]
    pub fn profiler(&self) -> &Arc<DurationProfiler> {
        &self.profiler
    }

    /// Refresh thresholds.
    #[inline]
    #[must_use]
    pub const fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Chunks captured around the observer on each axis.
    #[inline]
    #[must_use]
    pub const fn clone_radius(&self) -> u32 {
        self.clone_radius
    }

    #[cfg(debug_assertions)]
    fn debug_check_writer(&self) {
        let current = std::thread::current().id();
        let writer = *self.writer.get_or_init(|| current);
        debug_assert_eq!(writer, current, "Snapshot cache ticked from a second thread");
    }

    #[cfg(not(debug_assertions))]
    #[inline]
    fn debug_check_writer(&self) {}
}

/// Marks a rebuild as in flight for its lifetime.
struct RebuildGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RebuildGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Self {
        let was_rebuilding = flag.swap(true, Ordering::AcqRel);
        assert!(!was_rebuilding, "Concurrent snapshot rebuild!");
        Self { flag }
    }
}

impl Drop for RebuildGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{BlockState, ChunkedWorld};
    use reverb_shared::WORLD_COORD_LIMIT;

    /// World with nothing loaded that relies on the cell-by-cell section copy.
    struct Unloaded;

    impl LiveWorld for Unloaded {
        fn game_time(&self) -> u64 {
            0
        }

        fn block_at(&self, _pos: BlockPos) -> Option<BlockState> {
            None
        }
    }

    fn cache() -> SnapshotCache {
        let profiler = Arc::new(DurationProfiler::new(LEVEL_CACHE_PROFILER));
        SnapshotCache::with_policy(RefreshPolicy::new(20, 16), 1, 0, profiler)
    }

    fn world() -> ChunkedWorld {
        ChunkedWorld::flat(3, -1, 2, 4)
    }

    #[test]
    fn test_first_tick_publishes() {
        let cache = cache();
        let world = world();
        assert!(cache.current().is_none());
        assert!(cache.read_proxy().is_none());

        let outcome = cache.on_tick(&world, Vec3::new(0.5, 10.0, 0.5), 0);
        assert!(matches!(
            outcome,
            RefreshOutcome::Rebuilt {
                reason: RefreshReason::ColdStart,
                tick: 0,
                ..
            }
        ));
        assert!(cache.current().is_some());
        assert_eq!(cache.rebuild_count(), 1);
        assert_eq!(cache.profiler().tally(), 1);
    }

    #[test]
    fn test_origin_is_floored() {
        let cache = cache();
        let world = world();
        cache.on_tick(&world, Vec3::new(-0.5, 10.9, 3.2), 0);
        assert_eq!(cache.current().unwrap().origin(), BlockPos::new(-1, 10, 3));
    }

    #[test]
    fn test_retains_same_arc_below_thresholds() {
        let cache = cache();
        let world = world();
        cache.on_tick(&world, Vec3::ZERO, 0);
        let first = cache.current().unwrap();

        for tick in 1..20 {
            let outcome = cache.on_tick(&world, Vec3::new(3.0, 0.0, 3.0), tick);
            assert!(!outcome.is_rebuilt());
        }
        assert!(Arc::ptr_eq(&first, &cache.current().unwrap()));
        assert_eq!(cache.rebuild_count(), 1);
    }

    #[test]
    fn test_rebuilds_on_age() {
        let cache = cache();
        let world = world();
        cache.on_tick(&world, Vec3::ZERO, 0);
        let outcome = cache.on_tick(&world, Vec3::ZERO, 20);
        assert!(matches!(
            outcome,
            RefreshOutcome::Rebuilt {
                reason: RefreshReason::Expired { ticks_since: 20 },
                tick: 20,
                ..
            }
        ));
        assert_eq!(cache.current().unwrap().tick(), 20);
    }

    #[test]
    fn test_rebuilds_on_drift() {
        let cache = cache();
        let world = world();
        cache.on_tick(&world, Vec3::ZERO, 0);
        let outcome = cache.on_tick(&world, Vec3::new(20.0, 0.0, 0.0), 1);
        assert!(matches!(
            outcome,
            RefreshOutcome::Rebuilt {
                reason: RefreshReason::Moved { distance_sq: 400 },
                ..
            }
        ));
        let snapshot = cache.current().unwrap();
        assert_eq!(snapshot.origin(), BlockPos::new(20, 0, 0));
        assert_eq!(snapshot.tick(), 1);
    }

    #[test]
    fn test_invalidate_forces_cold_start() {
        let cache = cache();
        let world = world();
        cache.on_tick(&world, Vec3::ZERO, 0);
        cache.invalidate();
        assert!(cache.current().is_none());
        assert!(matches!(
            cache.on_tick(&world, Vec3::ZERO, 1),
            RefreshOutcome::Rebuilt {
                reason: RefreshReason::ColdStart,
                ..
            }
        ));
    }

    #[test]
    fn test_far_observer_is_clamped() {
        let cache = cache();
        cache.on_tick(&Unloaded, Vec3::new(3.0e9, 64.0, 0.0), 0);
        let snapshot = cache.current().unwrap();
        assert_eq!(snapshot.origin(), BlockPos::new(WORLD_COORD_LIMIT, 64, 0));
        assert_eq!(
            snapshot.block_at(BlockPos::new(WORLD_COORD_LIMIT, 64, 0)),
            Some(BlockState::UNKNOWN)
        );

        let outcome = cache.on_tick(&Unloaded, Vec3::new(f32::INFINITY, f32::NEG_INFINITY, 0.0), 1);
        assert!(outcome.is_rebuilt());
        assert_eq!(
            cache.current().unwrap().origin(),
            BlockPos::new(WORLD_COORD_LIMIT, -WORLD_COORD_LIMIT, 0)
        );
    }

    #[test]
    fn test_clone_radius_is_clamped() {
        let profiler = Arc::new(DurationProfiler::new(LEVEL_CACHE_PROFILER));
        let cache = SnapshotCache::with_policy(RefreshPolicy::new(20, 16), 1000, 0, profiler);
        assert_eq!(cache.clone_radius(), MAX_CLONE_RADIUS);
    }

    #[test]
    fn test_proxy_reads_snapshot() {
        let cache = cache();
        let world = world();
        cache.on_tick(&world, Vec3::new(0.0, 8.0, 0.0), 0);
        let proxy = cache.read_proxy().unwrap();
        assert_eq!(proxy.block_at(BlockPos::new(0, 4, 0)), Some(BlockState::DIRT));
        assert_eq!(proxy.block_at(BlockPos::new(100, 4, 0)), None);
    }

    #[test]
    #[should_panic(expected = "Concurrent snapshot rebuild!")]
    fn test_second_rebuild_guard_panics() {
        let flag = AtomicBool::new(false);
        let _first = RebuildGuard::acquire(&flag);
        let _second = RebuildGuard::acquire(&flag);
    }

    #[test]
    fn test_rebuild_guard_releases() {
        let flag = AtomicBool::new(false);
        drop(RebuildGuard::acquire(&flag));
        assert!(!flag.load(Ordering::Acquire));
        drop(RebuildGuard::acquire(&flag));
    }

    #[cfg(debug_assertions)]
    #[test]
    fn test_second_writer_thread_is_rejected() {
        let cache = Arc::new(cache());
        cache.on_tick(&world(), Vec3::ZERO, 0);

        let other = Arc::clone(&cache);
        let result = std::thread::spawn(move || {
            other.on_tick(&world(), Vec3::ZERO, 1);
        })
        .join();
        assert!(result.is_err());
    }

    #[cfg(debug_assertions)]
    #[test]
    fn test_invalidate_from_reader_thread_is_rejected() {
        let cache = Arc::new(cache());
        cache.on_tick(&world(), Vec3::ZERO, 0);

        let other = Arc::clone(&cache);
        let result = std::thread::spawn(move || other.invalidate()).join();
        assert!(result.is_err());
        assert!(cache.current().is_some());
    }
}
