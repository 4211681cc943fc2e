//! The boundary to the game's own, mutable world.
//!
//! The live world is owned by the tick thread. Snapshot construction reads it
//! through this trait while the tick thread holds exclusive access; readers
//! never touch it except through the direct fallback strategy.

use reverb_shared::{BlockPos, CHUNK_SIZE};

use super::block::BlockState;
use super::coord::{local_index, ChunkCoord, SECTION_VOLUME};
use super::section::SectionData;

/// Identity of a world instance (dimension, reloaded level, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorldId(pub u64);

impl std::fmt::Display for WorldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "world#{}", self.0)
    }
}

/// Read interface of the live world, used by the tick thread.
pub trait LiveWorld {
    /// Current simulation tick of this world.
    fn game_time(&self) -> u64;

    /// State of one block, or `None` if its region is not loaded.
    fn block_at(&self, pos: BlockPos) -> Option<BlockState>;

    /// Copies one whole chunk section, or `None` if it is not loaded.
    ///
    /// The default implementation copies cell by cell through [`block_at`];
    /// cells that come back `None` become [`BlockState::UNKNOWN`]. Worlds with
    /// section storage should override this with a bulk copy.
    ///
    /// [`block_at`]: LiveWorld::block_at
    fn copy_section(&self, coord: ChunkCoord) -> Option<SectionData> {
        let min = coord.min_block();
        let mut cells = vec![BlockState::UNKNOWN; SECTION_VOLUME].into_boxed_slice();
        let mut any_loaded = false;

        for y in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    if let Some(state) = self.block_at(min.offset(x, y, z)) {
                        cells[local_index(x, y, z)] = state;
                        any_loaded = true;
                    }
                }
            }
        }

        any_loaded.then(|| SectionData::from_cells(cells))
    }
}

impl<W: LiveWorld + ?Sized> LiveWorld for &W {
    fn game_time(&self) -> u64 {
        (**self).game_time()
    }

    fn block_at(&self, pos: BlockPos) -> Option<BlockState> {
        (**self).block_at(pos)
    }

    fn copy_section(&self, coord: ChunkCoord) -> Option<SectionData> {
        (**self).copy_section(coord)
    }
}
