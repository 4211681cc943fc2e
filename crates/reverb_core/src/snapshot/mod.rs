//! # Level Snapshots
//!
//! An immutable, fully owned copy of the world around the observer.
//!
//! ## Lifecycle
//!
//! ```text
//! Tick thread:  Snapshot::build(&world, origin, tick, radius)   O(radius³)
//!                     │
//!                     ▼ Arc<Snapshot> (publish)
//!               ┌──────────────┐
//!               │ cache slot   │──► reader A (Arc clone)
//!               └──────────────┘──► reader B (Arc clone)
//!
//! Dropped when the last Arc goes away, never earlier.
//! ```
//!
//! A snapshot has no interior mutability and no reference back into the live
//! world, so any number of threads may query it without synchronization.

mod region;

use std::fmt;

use reverb_shared::{BlockPos, MAX_CLONE_RADIUS};

use crate::world::{BlockState, ChunkCoord, LiveWorld, SectionData};

pub use region::RegionBounds;

/// Read-only copy of a cubic region of the world.
pub struct Snapshot {
    origin: BlockPos,
    tick: u64,
    radius: u32,
    bounds: RegionBounds,
    /// One entry per section of `bounds`, in `RegionBounds::index_of` order.
    sections: Box<[SectionData]>,
    unknown_sections: usize,
}

impl Snapshot {
    /// Copies every section within `radius` chunks of `origin` out of the live world.
    ///
    /// Must run on the thread that owns the world; the `&W` borrow is what
    /// keeps the world from changing mid-copy. Sections the world cannot
    /// supply are stored as [`SectionData::UNKNOWN`] instead of failing.
    /// `radius` is clamped to [`MAX_CLONE_RADIUS`].
    #[must_use]
    pub fn build<W: LiveWorld + ?Sized>(world: &W, origin: BlockPos, tick: u64, radius: u32) -> Self {
        let radius = radius.min(MAX_CLONE_RADIUS);
        let bounds = RegionBounds::around(ChunkCoord::from_block_pos(origin), radius);
        let mut unknown_sections = 0;

        let sections: Box<[SectionData]> = bounds
            .chunks()
            .map(|coord| {
                world.copy_section(coord).unwrap_or_else(|| {
                    unknown_sections += 1;
                    SectionData::UNKNOWN
                })
            })
            .collect();

        Self {
            origin,
            tick,
            radius,
            bounds,
            sections,
            unknown_sections,
        }
    }

    /// Block position the snapshot is centered on.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> BlockPos {
        self.origin
    }

    /// World tick the snapshot was built on.
    #[inline]
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Number of chunks captured around the origin chunk on each axis.
    #[inline]
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    /// Captured region.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> RegionBounds {
        self.bounds
    }

    /// Ticks elapsed since the snapshot was built.
    #[inline]
    #[must_use]
    pub const fn age(&self, current_tick: u64) -> u64 {
        current_tick.saturating_sub(self.tick)
    }

    /// Returns true if the block lies inside the captured region.
    #[inline]
    #[must_use]
    pub const fn contains(&self, pos: BlockPos) -> bool {
        self.bounds.contains_block(pos)
    }

    /// State of one block.
    ///
    /// `None` if the block lies outside the captured region. Blocks inside the
    /// region that the world could not supply read as [`BlockState::UNKNOWN`].
    #[inline]
    #[must_use]
    pub fn block_at(&self, pos: BlockPos) -> Option<BlockState> {
        let index = self.bounds.index_of(ChunkCoord::from_block_pos(pos))?;
        let (x, y, z) = pos.local();
        Some(self.sections[index].get(x, y, z))
    }

    /// Copied data of one section, if it lies inside the region.
    #[must_use]
    pub fn section(&self, coord: ChunkCoord) -> Option<&SectionData> {
        self.bounds.index_of(coord).map(|index| &self.sections[index])
    }

    /// Number of captured sections.
    #[inline]
    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Number of sections that were copied from loaded world data.
    #[inline]
    #[must_use]
    pub fn loaded_section_count(&self) -> usize {
        self.sections.len() - self.unknown_sections
    }

    /// Approximate heap bytes held by the copied sections.
    #[must_use]
    pub fn heap_size(&self) -> usize {
        std::mem::size_of_val(&*self.sections)
            + self.sections.iter().map(SectionData::heap_size).sum::<usize>()
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("origin", &self.origin)
            .field("tick", &self.tick)
            .field("radius", &self.radius)
            .field("bounds", &self.bounds)
            .field("sections", &self.sections.len())
            .field("unknown_sections", &self.unknown_sections)
            .finish()
    }
}
