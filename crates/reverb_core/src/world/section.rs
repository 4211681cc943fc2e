//! # Section Storage
//!
//! One 16³ chunk section of block states. Sections where every cell is the
//! same (open sky, solid rock, unloaded terrain) are stored as a single value.

use super::block::BlockState;
use super::coord::{local_index, SECTION_VOLUME};

/// Block data of one chunk section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SectionData {
    /// Every cell holds the same state.
    Uniform(BlockState),
    /// One state per cell, indexed as `[y][z][x]`.
    Dense(Box<[BlockState]>),
}

impl SectionData {
    /// A section filled with air.
    pub const EMPTY: Self = Self::Uniform(BlockState::AIR);

    /// A section that could not be read from the live world.
    pub const UNKNOWN: Self = Self::Uniform(BlockState::UNKNOWN);

    /// Creates a section filled with one state.
    #[inline]
    #[must_use]
    pub const fn uniform(state: BlockState) -> Self {
        Self::Uniform(state)
    }

    /// Creates a section from a full cell array, compacting it when uniform.
    ///
    /// # Panics
    ///
    /// Panics if `cells` does not hold exactly one state per cell.
    #[must_use]
    pub fn from_cells(cells: Box<[BlockState]>) -> Self {
        assert_eq!(
            cells.len(),
            SECTION_VOLUME,
            "Section must hold exactly {SECTION_VOLUME} cells"
        );
        let first = cells[0];
        if cells.iter().all(|&cell| cell == first) {
            Self::Uniform(first)
        } else {
            Self::Dense(cells)
        }
    }

    /// Gets the state at local coordinates (each in `0..16`).
    #[inline]
    #[must_use]
    pub fn get(&self, x: i32, y: i32, z: i32) -> BlockState {
        match self {
            Self::Uniform(state) => *state,
            Self::Dense(cells) => cells[local_index(x, y, z)],
        }
    }

    /// Sets the state at local coordinates, expanding a uniform section if needed.
    pub fn set(&mut self, x: i32, y: i32, z: i32, state: BlockState) {
        match self {
            Self::Uniform(current) if *current == state => {}
            Self::Uniform(current) => {
                let mut cells = vec![*current; SECTION_VOLUME].into_boxed_slice();
                cells[local_index(x, y, z)] = state;
                *self = Self::Dense(cells);
            }
            Self::Dense(cells) => cells[local_index(x, y, z)] = state,
        }
    }

    /// Returns true if every cell holds the same state.
    #[inline]
    #[must_use]
    pub const fn is_uniform(&self) -> bool {
        matches!(self, Self::Uniform(_))
    }

    /// Returns true if this is the unloaded placeholder section.
    #[inline]
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Uniform(state) if state.is_unknown())
    }

    /// Number of non-air cells.
    #[must_use]
    pub fn non_air_count(&self) -> usize {
        match self {
            Self::Uniform(state) if state.is_air() => 0,
            Self::Uniform(_) => SECTION_VOLUME,
            Self::Dense(cells) => cells.iter().filter(|cell| !cell.is_air()).count(),
        }
    }

    /// Approximate heap bytes held by this section.
    #[must_use]
    pub fn heap_size(&self) -> usize {
        match self {
            Self::Uniform(_) => 0,
            Self::Dense(cells) => std::mem::size_of_val(&**cells),
        }
    }
}

impl Default for SectionData {
    fn default() -> Self {
        Self::EMPTY
    }
}
