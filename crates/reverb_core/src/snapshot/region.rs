//! Chunk-aligned region captured by a snapshot.

use reverb_shared::{BlockPos, CHUNK_SIZE};

use crate::world::ChunkCoord;

/// Inclusive box of chunk sections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegionBounds {
    /// Lowest section on every axis.
    pub min: ChunkCoord,
    /// Highest section on every axis.
    pub max: ChunkCoord,
}

impl RegionBounds {
    /// Cube of `radius` sections in every direction around `center`.
    #[must_use]
    pub fn around(center: ChunkCoord, radius: u32) -> Self {
        let r = i32::try_from(radius).unwrap_or(i32::MAX);
        Self {
            min: ChunkCoord::new(
                center.x.saturating_sub(r),
                center.y.saturating_sub(r),
                center.z.saturating_sub(r),
            ),
            max: ChunkCoord::new(
                center.x.saturating_add(r),
                center.y.saturating_add(r),
                center.z.saturating_add(r),
            ),
        }
    }

    /// Number of sections along x, y and z.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn extent(&self) -> (usize, usize, usize) {
        (
            (self.max.x - self.min.x + 1) as usize,
            (self.max.y - self.min.y + 1) as usize,
            (self.max.z - self.min.z + 1) as usize,
        )
    }

    /// Total number of sections.
    #[inline]
    #[must_use]
    pub const fn volume(&self) -> usize {
        let (x, y, z) = self.extent();
        x * y * z
    }

    /// Returns true if the section lies inside the region.
    #[inline]
    #[must_use]
    pub const fn contains_chunk(&self, coord: ChunkCoord) -> bool {
        coord.x >= self.min.x
            && coord.x <= self.max.x
            && coord.y >= self.min.y
            && coord.y <= self.max.y
            && coord.z >= self.min.z
            && coord.z <= self.max.z
    }

    /// Returns true if the block lies inside the region.
    #[inline]
    #[must_use]
    pub const fn contains_block(&self, pos: BlockPos) -> bool {
        self.contains_chunk(ChunkCoord::from_block_pos(pos))
    }

    /// Position of a section in `[y][z][x]` order, or `None` if outside.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn index_of(&self, coord: ChunkCoord) -> Option<usize> {
        if !self.contains_chunk(coord) {
            return None;
        }
        let (ex, _, ez) = self.extent();
        let x = (coord.x - self.min.x) as usize;
        let y = (coord.y - self.min.y) as usize;
        let z = (coord.z - self.min.z) as usize;
        Some((y * ez + z) * ex + x)
    }

    /// All sections in index order.
    pub fn chunks(&self) -> impl Iterator<Item = ChunkCoord> {
        let Self { min, max } = *self;
        (min.y..=max.y).flat_map(move |y| {
            (min.z..=max.z).flat_map(move |z| (min.x..=max.x).map(move |x| ChunkCoord::new(x, y, z)))
        })
    }

    /// Lowest block inside the region.
    #[inline]
    #[must_use]
    pub const fn min_block(&self) -> BlockPos {
        self.min.min_block()
    }

    /// Highest block inside the region.
    #[inline]
    #[must_use]
    pub const fn max_block(&self) -> BlockPos {
        self.max.min_block().offset(CHUNK_SIZE - 1, CHUNK_SIZE - 1, CHUNK_SIZE - 1)
    }
}
