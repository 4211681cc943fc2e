//! # Tuning Constants
//!
//! Compile-time defaults for the level snapshot cache.
//!
//! **NOTE:** These are only defaults. The values actually used at runtime
//! come from `CacheConfig`, which is loaded once at startup.

// =============================================================================
// WORLD LAYOUT
// =============================================================================

/// Edge length of a cubic chunk section, in blocks.
pub const CHUNK_SIZE: i32 = 16;

/// Largest block coordinate magnitude on any axis.
///
/// Positions are clamped to `±WORLD_COORD_LIMIT`, which leaves room for a
/// full clone radius of chunks on either side without `i32` overflow.
pub const WORLD_COORD_LIMIT: i32 = 1 << 30;

/// Simulation ticks per second.
pub const TICK_RATE: u32 = 20;

// =============================================================================
// SNAPSHOT CACHE
// =============================================================================

/// Number of chunks cloned around the observer's chunk on each axis.
pub const DEFAULT_CLONE_RADIUS: u32 = 4;

/// Upper bound accepted for the clone radius.
///
/// A radius of 16 already means 33³ sections per rebuild.
pub const MAX_CLONE_RADIUS: u32 = 16;

/// Maximum age of a snapshot in ticks before it is rebuilt (one second).
pub const DEFAULT_MAX_RETAIN_TICKS: u64 = 20;

/// Maximum distance in blocks the observer may drift from the snapshot
/// origin before it is rebuilt (a quarter of the default clone range).
pub const DEFAULT_MAX_RETAIN_DISTANCE: u32 = 16;

// =============================================================================
// PROFILING
// =============================================================================

/// Number of recent samples a duration profiler keeps.
pub const PROFILER_RING_SIZE: usize = 100;

/// Number of measurements between two profiler reports.
pub const DEFAULT_REPORT_INTERVAL: u64 = 100;
