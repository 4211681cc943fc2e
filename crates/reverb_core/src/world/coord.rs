//! Chunk section coordinates.

use reverb_shared::{BlockPos, CHUNK_SIZE};

/// Number of cells in one chunk section.
pub const SECTION_VOLUME: usize = (CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE) as usize;

/// Chunk coordinate (identifies a 16³ section in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not blocks).
    pub x: i32,
    /// Y coordinate (in chunks, not blocks).
    pub y: i32,
    /// Z coordinate (in chunks, not blocks).
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chunk section containing the given block.
    #[inline]
    #[must_use]
    pub const fn from_block_pos(pos: BlockPos) -> Self {
        Self {
            x: pos.x.div_euclid(CHUNK_SIZE),
            y: pos.y.div_euclid(CHUNK_SIZE),
            z: pos.z.div_euclid(CHUNK_SIZE),
        }
    }

    /// World position of the section's minimum corner, saturating at the `i32` edges.
    #[inline]
    #[must_use]
    pub const fn min_block(self) -> BlockPos {
        BlockPos::new(
            self.x.saturating_mul(CHUNK_SIZE),
            self.y.saturating_mul(CHUNK_SIZE),
            self.z.saturating_mul(CHUNK_SIZE),
        )
    }

    /// Returns this coordinate moved by the given number of chunks.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.z.saturating_add(dz),
        )
    }
}

/// Index of a local cell inside a section's flat array (`[y][z][x]` order).
///
/// Callers pass components already reduced to `0..CHUNK_SIZE`.
#[inline]
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn local_index(x: i32, y: i32, z: i32) -> usize {
    ((y * CHUNK_SIZE + z) * CHUNK_SIZE + x) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_coord_from_negative_blocks() {
        assert_eq!(
            ChunkCoord::from_block_pos(BlockPos::new(-1, 0, 16)),
            ChunkCoord::new(-1, 0, 1)
        );
        assert_eq!(
            ChunkCoord::from_block_pos(BlockPos::new(-16, -17, 15)),
            ChunkCoord::new(-1, -2, 0)
        );
    }

    #[test]
    fn test_min_block_round_trip() {
        let coord = ChunkCoord::new(-3, 4, 7);
        assert_eq!(ChunkCoord::from_block_pos(coord.min_block()), coord);
    }

    #[test]
    fn test_min_block_saturates() {
        let coord = ChunkCoord::new(i32::MAX / 8, -(i32::MAX / 8), 1);
        assert_eq!(coord.min_block(), BlockPos::new(i32::MAX, i32::MIN, 16));
        assert_eq!(coord.offset(i32::MAX, 0, 0).x, i32::MAX);
    }

    #[test]
    fn test_local_index_bounds() {
        assert_eq!(local_index(0, 0, 0), 0);
        assert_eq!(local_index(15, 15, 15), SECTION_VOLUME - 1);
        assert_eq!(local_index(1, 0, 0), 1);
        assert_eq!(local_index(0, 0, 1), 16);
        assert_eq!(local_index(0, 1, 0), 256);
    }
}
