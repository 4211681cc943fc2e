//! # Demo Run
//!
//! ```text
//! per tick (main thread = tick thread):
//!   1. walk the observer (rare teleports)
//!   2. lock world → advance tick → maybe place a block → strategy.on_tick
//!   3. sleep out the rest of the tick
//!
//! per burst (listener threads):
//!   read_proxy → 16 × trace_occlusion(source → ear) → drop proxy
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Sender};
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reverb_core::{
    select_strategy, trace_occlusion, AccessStrategy, BlockState, CacheConfig, ChunkedWorld,
    ProfileReport, ProfilerRegistry, RefreshOutcome, WorldHandle, WorldId,
};
use reverb_shared::{BlockPos, Vec3, TICK_RATE};

const DEMO_WORLD: WorldId = WorldId(0);
/// Loaded columns around the world origin, in chunks.
const WORLD_RADIUS: i32 = 8;
const GROUND_Y: i32 = 64;
const EAR_HEIGHT: f32 = 66.5;
/// The observer stays this far inside the loaded area on x and z.
const WALK_LIMIT: f32 = 96.0;
const TELEPORT_DISTANCE: f32 = 24.0;
const SOUND_RANGE: f32 = 24.0;
const TRACES_PER_BURST: usize = 16;
const MAX_TRACE_STEPS: u32 = 256;

const PALETTE: [BlockState; 6] = [
    BlockState::PLANKS,
    BlockState::GLASS,
    BlockState::WOOL,
    BlockState::IRON,
    BlockState::LEAVES,
    BlockState::AIR,
];

/// Shape of one demo run.
#[derive(Clone, Debug)]
pub struct DemoSettings {
    /// Ticks to simulate.
    pub ticks: u64,
    /// Listener threads.
    pub listeners: usize,
    /// Wall time per tick; zero runs as fast as possible.
    pub tick_interval: Duration,
    /// Seed for the observer walk, block placement and sound placement.
    pub seed: u64,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            ticks: 200,
            listeners: 4,
            tick_interval: Duration::from_millis(1000 / u64::from(TICK_RATE)),
            seed: 0x5EED,
        }
    }
}

/// What one listener thread did.
#[derive(Clone, Debug, Default)]
pub struct ListenerReport {
    /// Listener index.
    pub listener: usize,
    /// Occlusion traces run.
    pub traces: u64,
    /// Bursts skipped because no proxy was available.
    pub missing_proxy: u64,
    /// Solid cells crossed over all traces.
    pub blocks_hit: u64,
    /// Cells crossed that the proxy had no data for.
    pub unavailable: u64,
    /// Summed occlusion over all traces.
    pub total_occlusion: f64,
}

impl ListenerReport {
    /// Average occlusion per trace (0.0 without traces).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_occlusion(&self) -> f64 {
        if self.traces == 0 {
            0.0
        } else {
            self.total_occlusion / self.traces as f64
        }
    }
}

/// Outcome of a demo run.
#[derive(Clone, Debug)]
pub struct DemoSummary {
    /// Ticks simulated.
    pub ticks: u64,
    /// Snapshots published.
    pub rebuilds: u64,
    /// Blocks changed by the tick thread.
    pub mutations: u64,
    /// Wall time of the whole run.
    pub elapsed: Duration,
    /// One report per listener, by index.
    pub listeners: Vec<ListenerReport>,
    /// Final profiler statistics.
    pub profiles: Vec<ProfileReport>,
}

/// Runs the demo on the calling thread, which becomes the tick thread.
#[must_use]
pub fn run(settings: &DemoSettings, config: &CacheConfig) -> DemoSummary {
    let profilers = ProfilerRegistry::new();
    let strategy: Arc<dyn AccessStrategy<ChunkedWorld>> =
        Arc::from(select_strategy::<ChunkedWorld>(config, &profilers));
    let handle = WorldHandle::new(
        DEMO_WORLD,
        ChunkedWorld::flat(WORLD_RADIUS, -2, 6, GROUND_Y),
    );
    let observer = Arc::new(RwLock::new(Vec3::new(0.5, EAR_HEIGHT, 0.5)));
    let stop = Arc::new(AtomicBool::new(false));
    let (report_tx, report_rx) = unbounded();

    tracing::info!(
        mode = ?config.access_mode,
        clone_radius = config.clone_radius,
        listeners = settings.listeners,
        ticks = settings.ticks,
        "Starting demo"
    );
    let start = Instant::now();

    let workers: Vec<_> = (0..settings.listeners)
        .map(|index| {
            let listener = Listener {
                index,
                rng: StdRng::seed_from_u64(settings.seed.wrapping_add(index as u64 + 1)),
                strategy: Arc::clone(&strategy),
                handle: handle.clone(),
                observer: Arc::clone(&observer),
                stop: Arc::clone(&stop),
                reports: report_tx.clone(),
            };
            thread::spawn(move || listener.run())
        })
        .collect();
    drop(report_tx);

    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut rebuilds = 0;
    let mut mutations = 0;

    for _ in 0..settings.ticks {
        let tick_start = Instant::now();
        let position = walk(&mut rng, *observer.read());
        *observer.write() = position;

        let outcome = {
            let mut world = handle.write();
            world.advance_tick();
            if rng.gen_ratio(1, 4) && place_block(&mut rng, &mut world, position) {
                mutations += 1;
            }
            strategy.on_tick(DEMO_WORLD, &*world, position)
        };

        if let Some(RefreshOutcome::Rebuilt {
            reason,
            tick,
            elapsed_ms,
            ..
        }) = outcome
        {
            rebuilds += 1;
            tracing::debug!(%reason, tick, ?elapsed_ms, "Snapshot published");
        }

        if let Some(rest) = settings.tick_interval.checked_sub(tick_start.elapsed()) {
            thread::sleep(rest);
        }
    }

    stop.store(true, Ordering::Release);
    for worker in workers {
        if worker.join().is_err() {
            tracing::warn!("Listener thread panicked");
        }
    }

    let mut listeners: Vec<_> = report_rx.iter().collect();
    listeners.sort_by_key(|report| report.listener);

    DemoSummary {
        ticks: settings.ticks,
        rebuilds,
        mutations,
        elapsed: start.elapsed(),
        listeners,
        profiles: profilers.reports(),
    }
}

/// Random walk on the ground plane, with an occasional long jump.
fn walk(rng: &mut StdRng, position: Vec3) -> Vec3 {
    let mut next = position
        + Vec3::new(
            rng.gen_range(-0.6_f32..0.6),
            0.0,
            rng.gen_range(-0.6_f32..0.6),
        );
    if rng.gen_bool(0.01) {
        let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        next.x += direction * TELEPORT_DISTANCE;
    }
    next.x = next.x.clamp(-WALK_LIMIT, WALK_LIMIT);
    next.z = next.z.clamp(-WALK_LIMIT, WALK_LIMIT);
    next
}

/// Places or clears one block near the observer.
fn place_block(rng: &mut StdRng, world: &mut ChunkedWorld, observer: Vec3) -> bool {
    let pos = BlockPos::floor(observer).offset(
        rng.gen_range(-8..=8),
        0,
        rng.gen_range(-8..=8),
    );
    let pos = BlockPos::new(pos.x, rng.gen_range(GROUND_Y + 1..GROUND_Y + 7), pos.z);
    world.set_block(pos, PALETTE[rng.gen_range(0..PALETTE.len())])
}

struct Listener {
    index: usize,
    rng: StdRng,
    strategy: Arc<dyn AccessStrategy<ChunkedWorld>>,
    handle: WorldHandle<ChunkedWorld>,
    observer: Arc<RwLock<Vec3>>,
    stop: Arc<AtomicBool>,
    reports: Sender<ListenerReport>,
}

impl Listener {
    fn run(mut self) {
        let mut report = ListenerReport {
            listener: self.index,
            ..ListenerReport::default()
        };

        // One more burst after the stop signal so every listener sees the last snapshot
        loop {
            let stopping = self.stop.load(Ordering::Acquire);
            self.burst(&mut report);
            if stopping {
                break;
            }
        }

        if self.reports.send(report).is_err() {
            tracing::warn!(listener = self.index, "Report channel closed");
        }
    }

    fn burst(&mut self, report: &mut ListenerReport) {
        let Some(proxy) = self.strategy.read_proxy(Some(&self.handle)) else {
            report.missing_proxy += 1;
            thread::yield_now();
            return;
        };
        let ear = *self.observer.read();

        for _ in 0..TRACES_PER_BURST {
            let source = ear
                + Vec3::new(
                    self.rng.gen_range(-SOUND_RANGE..SOUND_RANGE),
                    self.rng.gen_range(-4.0_f32..8.0),
                    self.rng.gen_range(-SOUND_RANGE..SOUND_RANGE),
                );
            let trace = trace_occlusion(&*proxy, source, ear, MAX_TRACE_STEPS);
            report.traces += 1;
            report.blocks_hit += u64::from(trace.blocks_hit);
            report.unavailable += u64::from(trace.unavailable);
            report.total_occlusion += f64::from(trace.occlusion);
        }
    }
}
