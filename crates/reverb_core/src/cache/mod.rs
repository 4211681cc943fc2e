//! # Snapshot Cache
//!
//! Keeps one immutable [`Snapshot`](crate::snapshot::Snapshot) per world
//! fresh enough for off-thread readers.
//!
//! ## Components
//!
//! ```text
//! WorldCaches ──WorldId──► SnapshotCache ──► ArcSwapOption<Snapshot>
//!                               │
//!                               └── RefreshPolicy (age OR drift)
//! ```
//!
//! - [`RefreshPolicy`]: pure decision, rebuild or retain
//! - [`SnapshotCache`]: the atomic slot, written by the tick thread only
//! - [`WorldCaches`]: copy-on-write table of slots, one per world

mod policy;
mod side_table;
mod slot;

pub use policy::{RefreshDecision, RefreshPolicy, RefreshReason, Staleness};
pub use side_table::WorldCaches;
pub use slot::{RefreshOutcome, SnapshotCache, LEVEL_CACHE_PROFILER};
