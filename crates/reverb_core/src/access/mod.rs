//! # Read Access
//!
//! What reader threads hold while they query world geometry.
//!
//! ```text
//! AccessStrategy::read_proxy(handle) ──► ReadProxy = Arc<dyn BlockAccess>
//!                                              │
//!                      ┌───────────────────────┴──────────────┐
//!                      ▼                                      ▼
//!              Snapshot (default)                    DirectAccess<W>
//!              pure, lock-free                       read lock per query
//! ```
//!
//! A proxy is meant for one logical operation (one ray, one sound). Take a
//! fresh one for the next operation to pick up newer snapshots.

mod direct;
mod strategy;

use std::sync::Arc;

use reverb_shared::BlockPos;

use crate::snapshot::{RegionBounds, Snapshot};
use crate::world::{BlockState, Material};

pub use direct::DirectAccess;
pub use strategy::{select_strategy, AccessStrategy, CachedAccess, DirectAccessStrategy};

/// Read-only point queries against a view of the world.
pub trait BlockAccess: Send + Sync {
    /// State of one block, `None` if the view has no data for it.
    fn block_at(&self, pos: BlockPos) -> Option<BlockState>;

    /// Region the view covers, if it is bounded.
    fn bounds(&self) -> Option<RegionBounds> {
        None
    }

    /// Acoustic material of one block.
    fn material_at(&self, pos: BlockPos) -> Option<Material> {
        self.block_at(pos).map(BlockState::material)
    }

    /// Occlusion factor of one block (0.0 when unavailable).
    fn occlusion_at(&self, pos: BlockPos) -> f32 {
        self.block_at(pos).map_or(0.0, BlockState::occlusion)
    }

    /// Returns true if the block is known and solid.
    fn is_solid(&self, pos: BlockPos) -> bool {
        self.block_at(pos).is_some_and(BlockState::is_solid)
    }
}

/// Shared proxy handed to reader threads.
pub type ReadProxy = Arc<dyn BlockAccess>;

impl BlockAccess for Snapshot {
    #[inline]
    fn block_at(&self, pos: BlockPos) -> Option<BlockState> {
        Snapshot::block_at(self, pos)
    }

    fn bounds(&self) -> Option<RegionBounds> {
        Some(Snapshot::bounds(self))
    }
}
