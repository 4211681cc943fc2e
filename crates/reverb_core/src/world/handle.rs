//! Shared handle to a live world owned by the host.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::live::WorldId;

/// A live world with its identity.
///
/// The tick thread takes the write lock to mutate and tick the world; the
/// direct access fallback takes read locks from other threads.
#[derive(Debug)]
pub struct WorldHandle<W> {
    id: WorldId,
    world: Arc<RwLock<W>>,
}

impl<W> Clone for WorldHandle<W> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            world: Arc::clone(&self.world),
        }
    }
}

impl<W> WorldHandle<W> {
    /// Wraps a world in a new lock.
    #[must_use]
    pub fn new(id: WorldId, world: W) -> Self {
        Self::from_shared(id, Arc::new(RwLock::new(world)))
    }

    /// Wraps an already shared world.
    #[must_use]
    pub fn from_shared(id: WorldId, world: Arc<RwLock<W>>) -> Self {
        Self { id, world }
    }

    /// Identity of the world.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> WorldId {
        self.id
    }

    /// The shared world.
    #[inline]
    #[must_use]
    pub fn world(&self) -> &Arc<RwLock<W>> {
        &self.world
    }

    /// Shared access to the world.
    pub fn read(&self) -> RwLockReadGuard<'_, W> {
        self.world.read()
    }

    /// Exclusive access to the world.
    pub fn write(&self) -> RwLockWriteGuard<'_, W> {
        self.world.write()
    }
}
