//! # World Model
//!
//! Blocks, chunk coordinates and the boundary to the live world.
//!
//! ## Layout
//!
//! ```text
//! BlockPos ──div 16──► ChunkCoord ──► SectionData (16³ BlockState)
//! ```
//!
//! The live world implements [`LiveWorld`]; everything a snapshot copies out
//! of it ends up as owned [`SectionData`].

pub mod block;
pub mod chunked;
pub mod coord;
pub mod handle;
pub mod live;
pub mod section;

pub use block::{BlockState, Material};
pub use chunked::ChunkedWorld;
pub use coord::{local_index, ChunkCoord, SECTION_VOLUME};
pub use handle::WorldHandle;
pub use live::{LiveWorld, WorldId};
pub use section::SectionData;
