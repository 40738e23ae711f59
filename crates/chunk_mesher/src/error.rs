//! Caller contract violations reported by the mesher.

use thiserror::Error;

/// Errors returned when the caller breaks the meshing contract.
///
/// None of these can arise from voxel content alone, except
/// `OutputOverflow`, which needs a pathological mix of see-through blocks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    #[error("padded volume must hold {expected} words (got {actual})")]
    VolumeSize { expected: usize, actual: usize },

    #[error("{buffer} buffer must hold at least {required} words (got {actual})")]
    BufferTooSmall {
        buffer: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("block id {id} at ({x}, {y}, {z}) has no texture row ({known} known)")]
    UnknownBlock {
        id: u32,
        x: usize,
        y: usize,
        z: usize,
        known: usize,
    },

    #[error("texture id {texture} of block {block} does not fit in 8 bits")]
    TextureOutOfRange { block: usize, texture: u32 },

    #[error("texture table has {known} rows and does not cover the water block")]
    MissingWater { known: usize },

    #[error("water up texture must be non-zero; a zero texture packs water surfaces to no face")]
    ZeroWaterTexture,

    #[error("mesh needs {required} words but only {capacity} fit")]
    OutputOverflow { required: usize, capacity: usize },
}
