//! # In-Memory Chunked World
//!
//! A straightforward [`LiveWorld`] implementation: loaded sections in a hash
//! map, a vertical build range, and a tick counter. Used by the demo host,
//! tests and benches as the mutable world the tick thread owns.
//!
//! ## Vertical Range
//!
//! ```text
//! section y > max_section_y   → always air (above build height)
//! min..=max, loaded           → stored data
//! min..=max, not loaded       → unknown (None)
//! section y < min_section_y   → always air (below the void floor)
//! ```

use std::collections::HashMap;

use reverb_shared::{BlockPos, CHUNK_SIZE};

use super::block::BlockState;
use super::coord::ChunkCoord;
use super::live::LiveWorld;
use super::section::SectionData;

/// Mutable world made of 16³ sections.
#[derive(Clone, Debug)]
pub struct ChunkedWorld {
    sections: HashMap<ChunkCoord, SectionData>,
    min_section_y: i32,
    max_section_y: i32,
    tick: u64,
}

impl ChunkedWorld {
    /// Creates an empty world with the given vertical section range (inclusive).
    ///
    /// # Panics
    ///
    /// Panics if `min_section_y > max_section_y`.
    #[must_use]
    pub fn new(min_section_y: i32, max_section_y: i32) -> Self {
        assert!(
            min_section_y <= max_section_y,
            "Invalid build range: {min_section_y}..={max_section_y}"
        );
        Self {
            sections: HashMap::new(),
            min_section_y,
            max_section_y,
            tick: 0,
        }
    }

    /// Generates flat terrain around the world origin.
    ///
    /// Loads every section within `radius` chunks (x/z) over the full build
    /// range: stone below `ground_y`, a dirt layer at `ground_y`, air above.
    #[must_use]
    pub fn flat(radius: i32, min_section_y: i32, max_section_y: i32, ground_y: i32) -> Self {
        let mut world = Self::new(min_section_y, max_section_y);
        for cx in -radius..=radius {
            for cz in -radius..=radius {
                for cy in min_section_y..=max_section_y {
                    world.load_section(ChunkCoord::new(cx, cy, cz), SectionData::EMPTY);
                }
            }
        }

        let span = radius * CHUNK_SIZE;
        let min = BlockPos::new(-span, min_section_y * CHUNK_SIZE, -span);
        let max = BlockPos::new(span + CHUNK_SIZE - 1, ground_y - 1, span + CHUNK_SIZE - 1);
        world.fill(min, max, BlockState::STONE);
        world.fill(
            BlockPos::new(min.x, ground_y, min.z),
            BlockPos::new(max.x, ground_y, max.z),
            BlockState::DIRT,
        );
        world
    }

    /// Returns true if the section lies inside the vertical build range.
    #[inline]
    #[must_use]
    pub const fn in_build_range(&self, coord: ChunkCoord) -> bool {
        coord.y >= self.min_section_y && coord.y <= self.max_section_y
    }

    /// Makes a section available with the given data.
    pub fn load_section(&mut self, coord: ChunkCoord, data: SectionData) {
        self.sections.insert(coord, data);
    }

    /// Removes a section, returning its data if it was loaded.
    pub fn unload_section(&mut self, coord: ChunkCoord) -> Option<SectionData> {
        self.sections.remove(&coord)
    }

    /// Returns true if the section is loaded.
    #[must_use]
    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.sections.contains_key(&coord)
    }

    /// Number of loaded sections.
    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Sets one block.
    ///
    /// Returns false (and changes nothing) if the block's section is not
    /// loaded or lies outside the build range.
    pub fn set_block(&mut self, pos: BlockPos, state: BlockState) -> bool {
        let coord = ChunkCoord::from_block_pos(pos);
        let (x, y, z) = pos.local();
        match self.sections.get_mut(&coord) {
            Some(section) if coord.y >= self.min_section_y && coord.y <= self.max_section_y => {
                section.set(x, y, z, state);
                true
            }
            _ => false,
        }
    }

    /// Fills an inclusive block box, skipping cells in unloaded sections.
    ///
    /// Returns the number of cells written.
    pub fn fill(&mut self, min: BlockPos, max: BlockPos, state: BlockState) -> usize {
        let mut written = 0;
        for y in min.y..=max.y {
            for z in min.z..=max.z {
                for x in min.x..=max.x {
                    if self.set_block(BlockPos::new(x, y, z), state) {
                        written += 1;
                    }
                }
            }
        }
        written
    }

    /// Advances the simulation clock by one tick.
    pub fn advance_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Sets the simulation clock.
    pub fn set_game_time(&mut self, tick: u64) {
        self.tick = tick;
    }
}

impl Default for ChunkedWorld {
    fn default() -> Self {
        Self::new(-4, 15)
    }
}

impl LiveWorld for ChunkedWorld {
    fn game_time(&self) -> u64 {
        self.tick
    }

    fn block_at(&self, pos: BlockPos) -> Option<BlockState> {
        let coord = ChunkCoord::from_block_pos(pos);
        if !self.in_build_range(coord) {
            return Some(BlockState::AIR);
        }
        let (x, y, z) = pos.local();
        self.sections.get(&coord).map(|section| section.get(x, y, z))
    }

    fn copy_section(&self, coord: ChunkCoord) -> Option<SectionData> {
        if !self.in_build_range(coord) {
            return Some(SectionData::EMPTY);
        }
        self.sections.get(&coord).cloned()
    }
}
