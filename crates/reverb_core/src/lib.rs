//! # REVERB Core
//!
//! Consistent, read-only views of a mutable block world for the audio
//! ray-tracing threads, kept fresh by the single tick thread that owns the
//! world.
//!
//! ## Architecture Rules
//!
//! 1. **Readers never lock** - they load an `Arc<Snapshot>` and query it
//! 2. **One writer per world** - only the tick thread builds and publishes
//! 3. **Publish is atomic** - readers see the old or the new snapshot, never a mix
//! 4. **Bounded staleness** - a snapshot is rebuilt when it gets too old OR
//!    the observer drifts too far from where it was taken
//!
//! ## Example
//!
//! ```rust,ignore
//! use reverb_core::{select_strategy, CacheConfig, ProfilerRegistry, WorldHandle, WorldId};
//!
//! let profilers = ProfilerRegistry::new();
//! let strategy = select_strategy(&CacheConfig::default(), &profilers);
//! let handle = WorldHandle::new(WorldId(0), world);
//!
//! // Tick thread, once per tick
//! strategy.on_tick(handle.id(), &*handle.read(), observer);
//!
//! // Any audio thread
//! if let Some(proxy) = strategy.read_proxy(Some(&handle)) {
//!     let trace = trace_occlusion(&*proxy, source, listener, 256);
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod access;
pub mod cache;
pub mod config;
pub mod error;
pub mod profiling;
pub mod snapshot;
pub mod trace;
pub mod world;

pub use access::{
    select_strategy, AccessStrategy, BlockAccess, CachedAccess, DirectAccess,
    DirectAccessStrategy, ReadProxy,
};
pub use cache::{
    RefreshDecision, RefreshOutcome, RefreshPolicy, RefreshReason, SnapshotCache, Staleness,
    WorldCaches, LEVEL_CACHE_PROFILER,
};
pub use config::{AccessMode, CacheConfig};
pub use error::{ConfigError, ConfigResult};
pub use profiling::{DurationProfiler, MeasurementHandle, ProfileReport, ProfilerRegistry};
pub use snapshot::{RegionBounds, Snapshot};
pub use trace::{trace_occlusion, OcclusionTrace};
pub use world::{
    BlockState, ChunkCoord, ChunkedWorld, LiveWorld, Material, SectionData, WorldHandle, WorldId,
};
