//! # Block State
//!
//! The per-cell data a snapshot copies out of the live world: block identity,
//! acoustic material and shape flags. Everything the audio ray tracer needs
//! to decide how much a block occludes or reflects sound.

use bytemuck::{Pod, Zeroable};

/// Acoustic material class of a block.
///
/// Stored as a raw `u8` inside [`BlockState`] so the state stays `Pod`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Material {
    /// Empty space.
    Air = 0,
    /// Stone, ores, bricks.
    Stone = 1,
    /// Dirt, gravel, clay.
    Dirt = 2,
    /// Logs and planks.
    Wood = 3,
    /// Glass and ice.
    Glass = 4,
    /// Wool, carpet, other soft blocks.
    Wool = 5,
    /// Sand.
    Sand = 6,
    /// Snow.
    Snow = 7,
    /// Metal blocks.
    Metal = 8,
    /// Water and other fluids.
    Water = 9,
    /// Leaves, grass, plants.
    Foliage = 10,
    /// Not known (unloaded region). Treated as fully opaque.
    Unknown = 255,
}

impl Material {
    /// Converts from the raw byte stored in a block state.
    ///
    /// Unrecognized values map to [`Material::Unknown`].
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Air,
            1 => Self::Stone,
            2 => Self::Dirt,
            3 => Self::Wood,
            4 => Self::Glass,
            5 => Self::Wool,
            6 => Self::Sand,
            7 => Self::Snow,
            8 => Self::Metal,
            9 => Self::Water,
            10 => Self::Foliage,
            _ => Self::Unknown,
        }
    }

    /// How strongly one block of this material damps sound passing through it.
    #[must_use]
    pub const fn occlusion(self) -> f32 {
        match self {
            Self::Air => 0.0,
            Self::Foliage => 0.1,
            Self::Glass => 0.2,
            Self::Water => 0.4,
            Self::Wood => 0.8,
            Self::Snow => 0.9,
            Self::Stone | Self::Dirt | Self::Sand | Self::Metal | Self::Unknown => 1.0,
            Self::Wool => 1.5,
        }
    }

    /// Fraction of sound energy reflected off a face of this material.
    #[must_use]
    pub const fn reflectivity(self) -> f32 {
        match self {
            Self::Air => 0.0,
            Self::Wool | Self::Snow => 0.1,
            Self::Foliage | Self::Sand => 0.2,
            Self::Dirt => 0.3,
            Self::Wood | Self::Water => 0.4,
            Self::Unknown => 0.5,
            Self::Glass => 0.75,
            Self::Stone => 0.9,
            Self::Metal => 0.95,
        }
    }
}

/// State of a single block cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct BlockState {
    /// Block type ID.
    pub id: u16,
    material: u8,
    flags: u8,
}

impl BlockState {
    /// Cell occupies space and stops rays.
    pub const FLAG_SOLID: u8 = 1 << 0;
    /// Cell fills the whole unit cube.
    pub const FLAG_FULL_CUBE: u8 = 1 << 1;

    /// Air block (empty).
    pub const AIR: Self = Self::new(0, Material::Air, 0);
    /// Placeholder for cells the live world could not supply.
    ///
    /// Opaque on purpose: the ray tracer must not hear through unloaded terrain.
    pub const UNKNOWN: Self = Self::new(
        u16::MAX,
        Material::Unknown,
        Self::FLAG_SOLID | Self::FLAG_FULL_CUBE,
    );
    /// Stone block.
    pub const STONE: Self = Self::solid(1, Material::Stone);
    /// Dirt block.
    pub const DIRT: Self = Self::solid(3, Material::Dirt);
    /// Wooden planks.
    pub const PLANKS: Self = Self::solid(4, Material::Wood);
    /// Leaves block (solid, not a full acoustic barrier).
    pub const LEAVES: Self = Self::new(5, Material::Foliage, Self::FLAG_SOLID);
    /// Glass block.
    pub const GLASS: Self = Self::solid(6, Material::Glass);
    /// Water (not solid).
    pub const WATER: Self = Self::new(10, Material::Water, 0);
    /// Sand block.
    pub const SAND: Self = Self::solid(11, Material::Sand);
    /// Wool block.
    pub const WOOL: Self = Self::solid(35, Material::Wool);
    /// Iron block.
    pub const IRON: Self = Self::solid(42, Material::Metal);

    /// Creates a block state from its parts.
    #[inline]
    #[must_use]
    pub const fn new(id: u16, material: Material, flags: u8) -> Self {
        Self {
            id,
            material: material as u8,
            flags,
        }
    }

    /// Creates a solid full-cube block.
    #[inline]
    #[must_use]
    pub const fn solid(id: u16, material: Material) -> Self {
        Self::new(id, material, Self::FLAG_SOLID | Self::FLAG_FULL_CUBE)
    }

    /// Acoustic material of this block.
    #[inline]
    #[must_use]
    pub const fn material(self) -> Material {
        Material::from_u8(self.material)
    }

    /// Returns true if this is an air block.
    #[inline]
    #[must_use]
    pub const fn is_air(self) -> bool {
        self.id == 0
    }

    /// Returns true for the unloaded-cell placeholder.
    #[inline]
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        self.id == u16::MAX
    }

    /// Returns true if the block stops rays.
    #[inline]
    #[must_use]
    pub const fn is_solid(self) -> bool {
        self.flags & Self::FLAG_SOLID != 0
    }

    /// Returns true if the block fills its whole cell.
    #[inline]
    #[must_use]
    pub const fn is_full_cube(self) -> bool {
        self.flags & Self::FLAG_FULL_CUBE != 0
    }

    /// Occlusion contributed by this block when a ray passes through it.
    ///
    /// Non-solid blocks (air, water) only contribute their material's damping
    /// when it is non-zero; partial blocks count half.
    #[inline]
    #[must_use]
    pub fn occlusion(self) -> f32 {
        let base = self.material().occlusion();
        if self.is_full_cube() || !self.is_solid() {
            base
        } else {
            base * 0.5
        }
    }
}

impl Default for BlockState {
    fn default() -> Self {
        Self::AIR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_round_trip_through_state() {
        for material in [
            Material::Air,
            Material::Stone,
            Material::Wood,
            Material::Glass,
            Material::Wool,
            Material::Water,
            Material::Unknown,
        ] {
            let state = BlockState::new(7, material, 0);
            assert_eq!(state.material(), material);
        }
        assert_eq!(Material::from_u8(200), Material::Unknown);
    }

    #[test]
    fn test_unknown_is_opaque() {
        let unknown = BlockState::UNKNOWN;
        assert!(unknown.is_unknown());
        assert!(unknown.is_solid());
        assert!(unknown.is_full_cube());
        assert!((unknown.occlusion() - 1.0).abs() < f32::EPSILON);
        assert!(!unknown.is_air());
    }

    #[test]
    fn test_air_is_transparent() {
        assert!(BlockState::AIR.is_air());
        assert!(!BlockState::AIR.is_solid());
        assert_eq!(BlockState::AIR.occlusion(), 0.0);
        assert_eq!(BlockState::default(), BlockState::AIR);
    }

    #[test]
    fn test_partial_blocks_count_half() {
        assert!(BlockState::LEAVES.is_solid());
        assert!(!BlockState::LEAVES.is_full_cube());
        assert!((BlockState::LEAVES.occlusion() - 0.05).abs() < 1e-6);
        assert!((BlockState::WOOL.occlusion() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_block_state_is_four_bytes() {
        assert_eq!(std::mem::size_of::<BlockState>(), 4);
        let bytes: &[u8] = bytemuck::bytes_of(&BlockState::STONE);
        assert_eq!(bytes.len(), 4);
    }
}
