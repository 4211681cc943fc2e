//! # Profiling
//!
//! Passive timing of expensive operations (snapshot rebuilds).
//!
//! Profiling is purely observational: a missing profiler, a handle finished
//! twice, or a profiler dropped mid-measurement never affects the caller.

mod profiler;
mod registry;

pub use profiler::{DurationProfiler, MeasurementHandle, ProfileReport};
pub use registry::ProfilerRegistry;
