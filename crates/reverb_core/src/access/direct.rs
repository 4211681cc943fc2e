//! Direct reads from the live world.
//!
//! Every query takes the world's read lock and therefore contends with the
//! tick thread. Only for debugging and as a fallback when snapshots are
//! switched off; never the default.

use std::sync::Arc;

use parking_lot::RwLock;
use reverb_shared::BlockPos;

use super::BlockAccess;
use crate::world::{BlockState, LiveWorld};

/// Proxy reading straight from a shared live world.
#[derive(Debug)]
pub struct DirectAccess<W> {
    world: Arc<RwLock<W>>,
}

impl<W> DirectAccess<W> {
    /// Wraps a shared world.
    #[must_use]
    pub fn new(world: Arc<RwLock<W>>) -> Self {
        Self { world }
    }
}

impl<W> BlockAccess for DirectAccess<W>
where
    W: LiveWorld + Send + Sync,
{
    fn block_at(&self, pos: BlockPos) -> Option<BlockState> {
        self.world.read().block_at(pos)
    }
}
