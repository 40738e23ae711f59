//! Layered greedy meshing for 32³ voxel chunks.
//!
//! The mesher sweeps a padded chunk one height layer at a time, merges
//! visible faces with identical texture and corner shadows into maximal
//! rectangles, and writes them as packed two-word vertices. Water surfaces
//! are written to a separate stream that follows the opaque geometry.
//!
//! # Example
//!
//! ```
//! use chunk_mesher::{encode_voxel, BlockTextures, ChunkMesher, PaddedChunk};
//!
//! let mut chunk = PaddedChunk::new();
//! chunk.set_local(16, 16, 16, encode_voxel(5, true)); // Single rock voxel
//!
//! let mut mesher = ChunkMesher::new();
//! let mesh = mesher.mesh(&chunk.volume(), &BlockTextures::default()).unwrap();
//! assert_eq!(mesh.quad_count(), 6); // One quad per face direction
//! assert_eq!(mesh.words().len(), 6 * 12);
//! ```

pub mod core;
pub mod debug;
pub mod error;
pub mod expand;
pub mod merge;
pub mod mesh;
pub mod shadow;
pub mod textures;
pub mod volume;

// Re-export primary types
pub use crate::core::{
    Direction,
    VertexAttributes,
    // Constants
    CHUNK_SIZE, CHUNK_SIZE_E, PLANE_SIZE, PLANE_SIZE_E, VOLUME_SIZE_E,
    MAX_VISIBLE_FACES, MAX_MESH_WORDS, WORST_CASE_MESH_WORDS, WORDS_PER_QUAD,
    BLOCK_EMPTY, BLOCK_WATER, WATER_SURFACE_LOWER,
    // Bit layouts
    pack_descriptor, pack_position, unpack_position,
};
pub use crate::error::MeshError;
pub use crate::textures::{BlockTextures, FaceTextures};
pub use crate::volume::{decode_block_id, encode_voxel, is_solid, PaddedChunk, VoxelVolume};

// Re-export main entry points
pub use crate::mesh::{create_mesh, mesh_into, ChunkMesh, ChunkMesher, MeshStats};
pub use crate::debug::{decode_quads, DecodedQuad};
