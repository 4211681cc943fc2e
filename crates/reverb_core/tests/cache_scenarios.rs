//! Integration tests for the level snapshot cache: refresh scenarios,
//! reader isolation and concurrent access through the strategies.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use reverb_core::{
    select_strategy, trace_occlusion, AccessMode, AccessStrategy, BlockState, CacheConfig,
    CachedAccess, ChunkedWorld, DurationProfiler, LiveWorld, ProfilerRegistry, RefreshOutcome,
    RefreshReason, SnapshotCache, WorldHandle, WorldId, LEVEL_CACHE_PROFILER,
};
use reverb_shared::{BlockPos, Vec3};

fn config(clone_radius: u32) -> CacheConfig {
    CacheConfig {
        clone_radius,
        ..CacheConfig::default()
    }
}

fn new_cache(config: &CacheConfig) -> SnapshotCache {
    SnapshotCache::new(config, Arc::new(DurationProfiler::new(LEVEL_CACHE_PROFILER)))
}

#[test]
fn test_stationary_observer_rebuilds_on_age() {
    let cache = new_cache(&config(1));
    let mut world = ChunkedWorld::flat(2, -1, 1, 4);
    let observer = Vec3::new(0.5, 8.0, 0.5);

    assert!(cache.on_tick(&world, observer, world.game_time()).is_rebuilt());
    let first = cache.current().unwrap();

    for _ in 1..20 {
        let tick = world.advance_tick();
        assert!(matches!(
            cache.on_tick(&world, observer, tick),
            RefreshOutcome::Retained(_)
        ));
    }
    assert!(Arc::ptr_eq(&first, &cache.current().unwrap()));

    let tick = world.advance_tick();
    assert_eq!(tick, 20);
    assert!(matches!(
        cache.on_tick(&world, observer, tick),
        RefreshOutcome::Rebuilt {
            reason: RefreshReason::Expired { ticks_since: 20 },
            tick: 20,
            ..
        }
    ));
    assert_eq!(cache.current().unwrap().tick(), 20);
    assert_eq!(cache.rebuild_count(), 2);
}

#[test]
fn test_teleport_rebuilds_next_tick() {
    let cache = new_cache(&config(1));
    let world = ChunkedWorld::flat(3, -1, 1, 4);

    cache.on_tick(&world, Vec3::new(0.0, 8.0, 0.0), 100);
    let outcome = cache.on_tick(&world, Vec3::new(20.0, 8.0, 0.0), 101);

    assert!(matches!(
        outcome,
        RefreshOutcome::Rebuilt {
            reason: RefreshReason::Moved { distance_sq: 400 },
            tick: 101,
            elapsed_ms: Some(_),
            ..
        }
    ));
    let snapshot = cache.current().unwrap();
    assert_eq!(snapshot.origin(), BlockPos::new(20, 8, 0));
    assert_eq!(snapshot.tick(), 101);
}

#[test]
fn test_query_beyond_clone_radius_is_absent() {
    let cache = new_cache(&config(4));
    let world = ChunkedWorld::flat(6, -1, 1, 4);
    cache.on_tick(&world, Vec3::new(8.0, 8.0, 8.0), 0);

    let proxy = cache.read_proxy().unwrap();
    let far = BlockPos::new(5 * 16 + 3, 4, 8);
    assert_eq!(proxy.block_at(far), None);
    assert_eq!(proxy.material_at(far), None);
    assert!(!proxy.is_solid(far));

    // Tracing out of the captured region degrades instead of failing
    let trace = trace_occlusion(&*proxy, Vec3::new(8.5, 8.5, 8.5), far.center(), 256);
    assert!(trace.reached);
    assert!(trace.unavailable > 0);
}

#[test]
fn test_old_snapshot_survives_rebuild_and_mutation() {
    let cache = new_cache(&config(1));
    let mut world = ChunkedWorld::flat(2, -1, 1, 4);
    let pos = BlockPos::new(2, 6, 2);

    cache.on_tick(&world, Vec3::ZERO, 0);
    let held = cache.current().unwrap();
    let held_proxy = cache.read_proxy().unwrap();

    assert!(world.set_block(pos, BlockState::IRON));
    world.set_game_time(25);
    assert!(cache.on_tick(&world, Vec3::ZERO, 25).is_rebuilt());

    assert_eq!(held.block_at(pos), Some(BlockState::AIR));
    assert_eq!(held_proxy.block_at(pos), Some(BlockState::AIR));
    assert_eq!(held.tick(), 0);
    assert_eq!(cache.current().unwrap().block_at(pos), Some(BlockState::IRON));
    assert!(!Arc::ptr_eq(&held, &cache.current().unwrap()));
}

#[test]
fn test_unloaded_terrain_reads_unknown() {
    let cache = new_cache(&config(1));
    let mut world = ChunkedWorld::flat(1, -1, 1, 4);
    world.unload_section(reverb_core::ChunkCoord::new(1, 0, 0));
    cache.on_tick(&world, Vec3::ZERO, 0);

    let snapshot = cache.current().unwrap();
    assert_eq!(snapshot.block_at(BlockPos::new(20, 2, 2)), Some(BlockState::UNKNOWN));
    assert!(snapshot.loaded_section_count() < snapshot.section_count());
}

#[test]
fn test_concurrent_readers_see_consistent_snapshots() {
    let profilers = ProfilerRegistry::new();
    let config = CacheConfig {
        clone_radius: 1,
        max_retain_ticks: 3,
        ..CacheConfig::default()
    };
    let strategy: Arc<dyn AccessStrategy<ChunkedWorld>> =
        Arc::from(select_strategy::<ChunkedWorld>(&config, &profilers));
    let handle = WorldHandle::new(WorldId(0), ChunkedWorld::flat(2, -1, 1, 4));

    // Two cells the writer always changes together
    let first = BlockPos::new(-3, 7, 5);
    let second = BlockPos::new(6, 9, -4);

    let done = Arc::new(AtomicBool::new(false));
    let checks = Arc::new(AtomicU64::new(0));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let strategy = Arc::clone(&strategy);
            let handle = handle.clone();
            let done = Arc::clone(&done);
            let checks = Arc::clone(&checks);
            thread::spawn(move || {
                while !done.load(Ordering::Acquire) {
                    let Some(proxy) = strategy.read_proxy(Some(&handle)) else {
                        thread::yield_now();
                        continue;
                    };
                    let a = proxy.block_at(first);
                    let b = proxy.block_at(second);
                    assert_eq!(a, b, "reader observed a partially updated snapshot");
                    assert!(a.is_some());
                    checks.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    let writer = {
        let strategy = Arc::clone(&strategy);
        let handle = handle.clone();
        thread::spawn(move || {
            let mut rebuilds = 0;
            for step in 0..300_u16 {
                let mut world = handle.write();
                let tick = world.advance_tick();
                let state = if (tick / 3) % 2 == 0 {
                    BlockState::GLASS
                } else {
                    BlockState::WOOL
                };
                assert!(world.set_block(first, state));
                assert!(world.set_block(second, state));

                let observer = Vec3::new(f32::from(step % 8), 8.0, 0.0);
                let outcome = strategy.on_tick(handle.id(), &*world, observer);
                drop(world);

                if outcome.is_some_and(|o| o.is_rebuilt()) {
                    rebuilds += 1;
                }
                if step % 16 == 0 {
                    thread::yield_now();
                }
            }
            rebuilds
        })
    };

    let rebuilds = writer.join().unwrap();
    // Let readers observe the final snapshot at least once
    while checks.load(Ordering::Relaxed) == 0 && !readers.iter().all(|r| r.is_finished()) {
        thread::yield_now();
    }
    done.store(true, Ordering::Release);
    for reader in readers {
        reader.join().unwrap();
    }

    assert!(rebuilds >= 100);
    let profiler = profilers.get(LEVEL_CACHE_PROFILER).unwrap();
    assert_eq!(profiler.tally(), rebuilds);
}

#[test]
fn test_cached_strategy_tracks_worlds_separately() {
    let strategy = CachedAccess::new(config(1), Arc::new(DurationProfiler::new(LEVEL_CACHE_PROFILER)));
    let overworld = WorldHandle::new(WorldId(0), ChunkedWorld::flat(1, -1, 1, 4));
    let nether = WorldHandle::new(WorldId(1), ChunkedWorld::flat(1, -1, 1, 10));

    strategy.on_tick(overworld.id(), &*overworld.read(), Vec3::new(0.0, 8.0, 0.0));
    assert!(strategy.read_proxy(Some(&overworld)).is_some());
    assert!(strategy.read_proxy(Some(&nether)).is_none());

    strategy.on_tick(nether.id(), &*nether.read(), Vec3::new(0.0, 8.0, 0.0));
    let proxy = strategy.read_proxy(Some(&nether)).unwrap();
    assert_eq!(proxy.block_at(BlockPos::new(0, 8, 0)), Some(BlockState::STONE));
    assert_eq!(strategy.caches().len(), 2);
    assert_eq!(strategy.cache(WorldId(0)).unwrap().profiler().tally(), 2);
}

#[test]
fn test_direct_strategy_skips_snapshots() {
    let profilers = ProfilerRegistry::new();
    let config = CacheConfig {
        access_mode: AccessMode::Direct,
        ..CacheConfig::default()
    };
    let strategy = select_strategy::<ChunkedWorld>(&config, &profilers);
    let handle = WorldHandle::new(WorldId(4), ChunkedWorld::flat(1, -1, 1, 4));

    assert!(strategy.on_tick(handle.id(), &*handle.read(), Vec3::ZERO).is_none());
    assert!(profilers.is_empty());

    let proxy = strategy.read_proxy(Some(&handle)).unwrap();
    let pos = BlockPos::new(0, 12, 0);
    assert_eq!(proxy.block_at(pos), Some(BlockState::AIR));
    handle.write().set_block(pos, BlockState::SAND);
    assert_eq!(proxy.block_at(pos), Some(BlockState::SAND));
    assert!(proxy.bounds().is_none());
}

#[test]
fn test_absent_world_yields_no_proxy() {
    let profilers = ProfilerRegistry::new();
    for mode in [AccessMode::Snapshot, AccessMode::Direct] {
        let config = CacheConfig {
            access_mode: mode,
            ..CacheConfig::default()
        };
        let strategy = select_strategy::<ChunkedWorld>(&config, &profilers);
        assert!(strategy.read_proxy(None).is_none());
    }
}
