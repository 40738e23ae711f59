//! Padded voxel volume access and voxel word decoding.
//!
//! A voxel word keeps the solidity flag in its top bit and the block id in
//! the low 31 bits. The volume is a cube of `CHUNK_SIZE_E` cells per side,
//! laid out `z * PLANE_SIZE_E + y * CHUNK_SIZE_E + x` with z as the height axis.

use crate::core::{CHUNK_SIZE, CHUNK_SIZE_E, PLANE_SIZE_E, VOLUME_SIZE_E};
use crate::error::MeshError;
use crate::textures::BlockTextures;

const SOLID_BIT: u32 = 0x8000_0000;
const BLOCK_ID_MASK: u32 = 0x7FFF_FFFF;

#[inline]
pub const fn is_solid(word: u32) -> bool {
    word & SOLID_BIT != 0
}

/// Solidity as 0 or 1, for summing neighbor occupancy.
#[inline]
pub const fn solidity(word: u32) -> u32 {
    word >> 31
}

/// Strip the solidity flag, leaving the block id.
#[inline]
pub const fn decode_block_id(word: u32) -> u32 {
    word & BLOCK_ID_MASK
}

#[inline]
pub const fn encode_voxel(block_id: u32, solid: bool) -> u32 {
    let flag = if solid { SOLID_BIT } else { 0 };
    (block_id & BLOCK_ID_MASK) | flag
}

#[inline]
const fn padded_index(x: usize, y: usize, z: usize) -> usize {
    z * PLANE_SIZE_E + y * CHUNK_SIZE_E + x
}

/// Read-only view over a caller-filled padded volume.
#[derive(Clone, Copy)]
pub struct VoxelVolume<'a> {
    data: &'a [u32],
}

impl<'a> VoxelVolume<'a> {
    /// Wrap a padded volume of exactly `VOLUME_SIZE_E` words.
    pub fn new(data: &'a [u32]) -> Result<Self, MeshError> {
        if data.len() != VOLUME_SIZE_E {
            return Err(MeshError::VolumeSize {
                expected: VOLUME_SIZE_E,
                actual: data.len(),
            });
        }
        Ok(Self { data })
    }

    /// Raw voxel word at padded coordinates.
    ///
    /// # Panics
    /// Panics if the coordinates fall outside the padded cube.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> u32 {
        debug_assert!(
            x < CHUNK_SIZE_E && y < CHUNK_SIZE_E && z < CHUNK_SIZE_E,
            "padded coordinates out of bounds"
        );
        self.data[padded_index(x, y, z)]
    }

    /// Raw voxel word at padded coordinates plus a signed offset.
    #[inline]
    pub fn get_offset(&self, x: usize, y: usize, z: usize, offset: [i32; 3]) -> u32 {
        self.get(
            x.wrapping_add_signed(offset[0] as isize),
            y.wrapping_add_signed(offset[1] as isize),
            z.wrapping_add_signed(offset[2] as isize),
        )
    }

    pub fn words(&self) -> &'a [u32] {
        self.data
    }

    /// Check that every inner voxel has a row in the texture table.
    ///
    /// Border cells are only read for solidity, so they are not checked.
    pub fn check_block_ids(&self, textures: &BlockTextures) -> Result<(), MeshError> {
        for z in 1..=CHUNK_SIZE {
            for y in 1..=CHUNK_SIZE {
                for x in 1..=CHUNK_SIZE {
                    let id = decode_block_id(self.get(x, y, z));
                    if !textures.contains(id) {
                        return Err(MeshError::UnknownBlock {
                            id,
                            x: x - 1,
                            y: y - 1,
                            z: z - 1,
                            known: textures.len(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Owned padded volume for callers that build chunks in memory.
///
/// Heap-backed, since a padded volume is ~150KB.
#[derive(Clone)]
pub struct PaddedChunk {
    data: Box<[u32]>,
}

impl PaddedChunk {
    /// Create a volume with every cell empty.
    pub fn new() -> Self {
        Self::filled(0)
    }

    /// Create a volume with every cell, border included, set to `word`.
    pub fn filled(word: u32) -> Self {
        Self {
            data: vec![word; VOLUME_SIZE_E].into_boxed_slice(),
        }
    }

    /// Set a cell by padded coordinates (0..CHUNK_SIZE_E).
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, word: u32) {
        debug_assert!(
            x < CHUNK_SIZE_E && y < CHUNK_SIZE_E && z < CHUNK_SIZE_E,
            "padded coordinates out of bounds"
        );
        self.data[padded_index(x, y, z)] = word;
    }

    /// Set a cell by chunk-local coordinates (0..CHUNK_SIZE).
    #[inline]
    pub fn set_local(&mut self, x: usize, y: usize, z: usize, word: u32) {
        debug_assert!(
            x < CHUNK_SIZE && y < CHUNK_SIZE && z < CHUNK_SIZE,
            "chunk coordinates out of bounds"
        );
        self.set(x + 1, y + 1, z + 1, word);
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> u32 {
        self.data[padded_index(x, y, z)]
    }

    /// Fill every chunk-local cell of layer `z` with `word`.
    pub fn fill_layer(&mut self, z: usize, word: u32) {
        for y in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                self.set_local(x, y, z, word);
            }
        }
    }

    /// Set every border cell to `word`, leaving the interior untouched.
    pub fn fill_border(&mut self, word: u32) {
        let last = CHUNK_SIZE_E - 1;
        for z in 0..CHUNK_SIZE_E {
            for y in 0..CHUNK_SIZE_E {
                for x in 0..CHUNK_SIZE_E {
                    let on_border = x == 0 || y == 0 || z == 0 || x == last || y == last || z == last;
                    if on_border {
                        self.set(x, y, z, word);
                    }
                }
            }
        }
    }

    pub fn words(&self) -> &[u32] {
        &self.data
    }

    pub fn volume(&self) -> VoxelVolume<'_> {
        VoxelVolume { data: &self.data }
    }
}

impl Default for PaddedChunk {
    fn default() -> Self {
        Self::new()
    }
}
