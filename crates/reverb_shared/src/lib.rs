//! # REVERB Shared
//!
//! Common types used by both the tick (writer) thread and the audio
//! ray-tracing (reader) threads.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - the world implementation
//! - any lock or channel crate
//!
//! If you need world access, put it in `reverb_core`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{
    CHUNK_SIZE, DEFAULT_CLONE_RADIUS, DEFAULT_MAX_RETAIN_DISTANCE, DEFAULT_MAX_RETAIN_TICKS,
    DEFAULT_REPORT_INTERVAL, MAX_CLONE_RADIUS, PROFILER_RING_SIZE, TICK_RATE,
    WORLD_COORD_LIMIT,
};
pub use math::{BlockPos, Vec3};
