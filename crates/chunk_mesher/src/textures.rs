//! Block id to per-face texture id lookup.

use crate::core::{Direction, BLOCK_WATER};
use crate::error::MeshError;

/// Texture ids of one block, indexed by [`Direction::index`]:
/// `[Up, Front, Left, Back, Right, Down]`.
pub type FaceTextures = [u32; 6];

/// Largest texture id that fits the 8-bit descriptor field.
pub const MAX_TEXTURE_ID: u32 = 0xFF;

/// Stock table: empty, dirt, dirt-grass, grass, gravel, rock, water, sand, short grass.
const DEFAULT_TEXTURES: [FaceTextures; 9] = [
    [0, 0, 0, 0, 0, 0],
    [1, 1, 1, 1, 1, 1],
    [3, 2, 2, 2, 2, 1],
    [3, 3, 3, 3, 3, 3],
    [4, 4, 4, 4, 4, 4],
    [5, 5, 5, 5, 5, 5],
    [6, 6, 6, 6, 6, 6],
    [7, 7, 7, 7, 7, 7],
    [0, 8, 8, 8, 8, 0],
];

/// Read-only block texture table consumed by the mesher.
///
/// Validated on construction so that meshing never has to range-check
/// texture ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTextures {
    rows: Vec<FaceTextures>,
}

impl BlockTextures {
    /// Build a table from one row per block id.
    pub fn new(rows: Vec<FaceTextures>) -> Result<Self, MeshError> {
        if rows.len() <= BLOCK_WATER as usize {
            return Err(MeshError::MissingWater { known: rows.len() });
        }
        for (block, row) in rows.iter().enumerate() {
            if let Some(&texture) = row.iter().find(|&&t| t > MAX_TEXTURE_ID) {
                return Err(MeshError::TextureOutOfRange { block, texture });
            }
        }
        let textures = Self { rows };
        if textures.water_texture() == 0 {
            return Err(MeshError::ZeroWaterTexture);
        }
        Ok(textures)
    }

    /// Build a table from a flat list of six ids per block.
    pub fn from_flat(flat: &[u32]) -> Result<Self, MeshError> {
        let rows = flat
            .chunks_exact(6)
            .map(|c| [c[0], c[1], c[2], c[3], c[4], c[5]])
            .collect();
        Self::new(rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn contains(&self, block_id: u32) -> bool {
        (block_id as usize) < self.rows.len()
    }

    /// All six face textures of a block.
    ///
    /// # Panics
    /// Panics if `block_id` has no row; callers check ids up front.
    #[inline]
    pub fn faces(&self, block_id: u32) -> &FaceTextures {
        &self.rows[block_id as usize]
    }

    #[inline]
    pub fn texture(&self, block_id: u32, direction: Direction) -> u32 {
        self.faces(block_id)[direction.index()]
    }

    /// Texture id that routes a face to the water stream.
    #[inline]
    pub fn water_texture(&self) -> u32 {
        self.texture(BLOCK_WATER, Direction::Up)
    }
}

impl Default for BlockTextures {
    fn default() -> Self {
        Self {
            rows: DEFAULT_TEXTURES.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_faces() {
        let textures = BlockTextures::default();
        assert_eq!(textures.len(), 9);
        // Dirt-grass: grass on top, dirt underneath, grassy sides.
        assert_eq!(textures.texture(2, Direction::Up), 3);
        assert_eq!(textures.texture(2, Direction::Down), 1);
        assert_eq!(textures.texture(2, Direction::Left), 2);
        assert_eq!(textures.water_texture(), 6);
        assert!(!textures.contains(9));
    }

    #[test]
    fn default_table_is_valid() {
        let rebuilt = BlockTextures::new(DEFAULT_TEXTURES.to_vec()).unwrap();
        assert_eq!(rebuilt, BlockTextures::default());
    }

    #[test]
    fn rejects_wide_texture_ids() {
        let mut rows = DEFAULT_TEXTURES.to_vec();
        rows[3][Direction::Back.index()] = 256;
        assert_eq!(
            BlockTextures::new(rows),
            Err(MeshError::TextureOutOfRange { block: 3, texture: 256 })
        );
    }

    #[test]
    fn rejects_table_without_water() {
        let rows = DEFAULT_TEXTURES[..6].to_vec();
        assert_eq!(BlockTextures::new(rows), Err(MeshError::MissingWater { known: 6 }));
    }

    #[test]
    fn rejects_blank_water_surface() {
        let mut rows = DEFAULT_TEXTURES.to_vec();
        rows[BLOCK_WATER as usize][Direction::Up.index()] = 0;
        assert_eq!(BlockTextures::new(rows.clone()), Err(MeshError::ZeroWaterTexture));

        // Only the up face decides routing; other water faces may be blank.
        rows[BLOCK_WATER as usize] = [6, 0, 0, 0, 0, 0];
        assert_eq!(BlockTextures::new(rows).unwrap().water_texture(), 6);
    }

    #[test]
    fn flat_table_ignores_trailing_words() {
        let mut flat: Vec<u32> = DEFAULT_TEXTURES.iter().flatten().copied().collect();
        flat.push(42);
        let textures = BlockTextures::from_flat(&flat).unwrap();
        assert_eq!(textures, BlockTextures::default());
    }
}
