//! Core constants, face directions and the packed bit layouts shared with the renderer.

/// Edge length of a chunk in voxels (32).
pub const CHUNK_SIZE: usize = 32;
/// Edge length of the padded volume (34).
/// The one-cell border holds neighbor data used for visibility and shadows.
pub const CHUNK_SIZE_E: usize = CHUNK_SIZE + 2;
/// Cells in one layer plane (CHUNK_SIZE² = 1024).
pub const PLANE_SIZE: usize = CHUNK_SIZE * CHUNK_SIZE;
/// Cells in one padded plane (CHUNK_SIZE_E² = 1156).
pub const PLANE_SIZE_E: usize = CHUNK_SIZE_E * CHUNK_SIZE_E;
/// Words in a padded volume (CHUNK_SIZE_E³ = 39304).
pub const VOLUME_SIZE_E: usize = PLANE_SIZE_E * CHUNK_SIZE_E;

/// Worst-case quad count for a chunk (3 × CHUNK_SIZE³).
pub const MAX_VISIBLE_FACES: usize = 3 * CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;
/// Vertices emitted per quad (two triangles).
pub const VERTICES_PER_QUAD: usize = 6;
/// Words per vertex (position + attributes).
pub const WORDS_PER_VERTEX: usize = 2;
/// Words per quad (6 vertices × 2 words).
pub const WORDS_PER_QUAD: usize = VERTICES_PER_QUAD * WORDS_PER_VERTEX;
/// Required capacity of the output and water buffers.
pub const MAX_MESH_WORDS: usize = MAX_VISIBLE_FACES * WORDS_PER_QUAD;
/// Quad count no chunk can exceed: every voxel showing all six faces unmerged.
pub const WORST_CASE_FACES: usize = 6 * CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;
/// Buffer size that holds any mesh without overflow.
pub const WORST_CASE_MESH_WORDS: usize = WORST_CASE_FACES * WORDS_PER_QUAD;

// Positions are packed into 7-bit fields and must reach CHUNK_SIZE inclusive.
const _: () = assert!(CHUNK_SIZE < 128);

/// Block id of an empty voxel.
pub const BLOCK_EMPTY: u32 = 0;
/// Reserved block id for water. Water is never solid.
pub const BLOCK_WATER: u32 = 6;

/// Value of the lowered flag on water up faces.
pub const WATER_SURFACE_LOWER: u32 = 2;

/// Axis-aligned face direction.
///
/// The discriminant is the direction code written into vertex attributes
/// and the column index into a block's texture row.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up = 0,
    Front = 1,
    Left = 2,
    Back = 3,
    Right = 4,
    Down = 5,
}

// Vectors are (x, y, z) with z as the height axis.
const NORMALS: [[i32; 3]; 6] = [
    [0, 0, 1],  // Up
    [0, -1, 0], // Front
    [-1, 0, 0], // Left
    [0, 1, 0],  // Back
    [1, 0, 0],  // Right
    [0, 0, -1], // Down
];

const VERTEX_OFFSETS: [[i32; 3]; 6] = [
    [0, 0, 1],
    [0, 0, 0],
    [0, 1, 0],
    [1, 1, 0],
    [1, 0, 0],
    [0, 1, 0],
];

const WIDTH_AXES: [[i32; 3]; 6] = [
    [1, 0, 0],
    [1, 0, 0],
    [0, -1, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [1, 0, 0],
];

const HEIGHT_AXES: [[i32; 3]; 6] = [
    [0, 1, 0],
    [0, 0, 1],
    [0, 0, 1],
    [0, 0, 1],
    [0, 0, 1],
    [0, -1, 0],
];

/// Chunk-local (x, y) to layer (col, row).
/// Each row is `[x mul, y mul, edge add]`; the add is in units of CHUNK_SIZE - 1.
const TO_LAYER: [[[i32; 3]; 2]; 6] = [
    [[1, 0, 0], [0, 1, 0]],   // Up
    [[1, 0, 0], [0, 1, 0]],   // Front
    [[0, -1, 1], [1, 0, 0]],  // Left
    [[-1, 0, 1], [0, -1, 1]], // Back
    [[0, 1, 0], [-1, 0, 1]],  // Right
    [[1, 0, 0], [0, -1, 1]],  // Down
];

/// Layer (col, row) back to chunk-local (x, y).
/// Each row is `[col mul, row mul, edge add]`.
const FROM_LAYER: [[[i32; 3]; 2]; 6] = [
    [[1, 0, 0], [0, 1, 0]],   // Up
    [[1, 0, 0], [0, 1, 0]],   // Front
    [[0, 1, 0], [-1, 0, 1]],  // Left
    [[-1, 0, 1], [0, -1, 1]], // Back
    [[0, -1, 1], [1, 0, 0]],  // Right
    [[1, 0, 0], [0, -1, 1]],  // Down
];

#[inline]
fn apply_remap(table: &[[i32; 3]; 2], a: usize, b: usize) -> (usize, usize) {
    let edge = CHUNK_SIZE as i32 - 1;
    let (a, b) = (a as i32, b as i32);
    let first = table[0][0] * a + table[0][1] * b + table[0][2] * edge;
    let second = table[1][0] * a + table[1][1] * b + table[1][2] * edge;
    debug_assert!(first >= 0 && second >= 0, "layer remap left the chunk");
    (first as usize, second as usize)
}

impl Direction {
    /// All six directions in code order.
    pub const ALL: [Direction; 6] = [
        Direction::Up,
        Direction::Front,
        Direction::Left,
        Direction::Back,
        Direction::Right,
        Direction::Down,
    ];

    /// Directions whose faces form walls, merged across height layers.
    pub const SIDES: [Direction; 4] = [
        Direction::Front,
        Direction::Left,
        Direction::Back,
        Direction::Right,
    ];

    /// Directions whose faces form slabs, merged across rows within a layer.
    pub const CAPS: [Direction; 2] = [Direction::Up, Direction::Down];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Direction code as stored in the attribute word.
    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    #[inline]
    pub const fn is_side(self) -> bool {
        !matches!(self, Direction::Up | Direction::Down)
    }

    /// Unit vector pointing out of the face.
    #[inline]
    pub const fn normal(self) -> [i32; 3] {
        NORMALS[self as usize]
    }

    /// Offset of the quad's origin corner from the voxel's minimum corner.
    #[inline]
    pub const fn vertex_offset(self) -> [i32; 3] {
        VERTEX_OFFSETS[self as usize]
    }

    /// World axis along which a run's width extends.
    #[inline]
    pub const fn width_axis(self) -> [i32; 3] {
        WIDTH_AXES[self as usize]
    }

    /// World axis along which a run's height extends.
    #[inline]
    pub const fn height_axis(self) -> [i32; 3] {
        HEIGHT_AXES[self as usize]
    }

    /// Map chunk-local (x, y) to this direction's layer (col, row).
    #[inline]
    pub fn to_layer(self, x: usize, y: usize) -> (usize, usize) {
        apply_remap(&TO_LAYER[self as usize], x, y)
    }

    /// Map a layer (col, row) back to chunk-local (x, y).
    #[inline]
    pub fn from_layer(self, col: usize, row: usize) -> (usize, usize) {
        apply_remap(&FROM_LAYER[self as usize], col, row)
    }
}

/// Pack a face descriptor: 8-bit texture id over four 2-bit corner shadows.
#[inline]
pub const fn pack_descriptor(texture: u32, shadows: u32) -> u32 {
    ((texture & 0xFF) << 8) | (shadows & 0xFF)
}

#[inline]
pub const fn descriptor_texture(descriptor: u32) -> u32 {
    (descriptor >> 8) & 0xFF
}

#[inline]
pub const fn descriptor_shadows(descriptor: u32) -> u32 {
    descriptor & 0xFF
}

/// Shadow level (0-3) of one corner in a packed shadow byte.
#[inline]
pub const fn corner_shadow(shadows: u32, corner: usize) -> u32 {
    (shadows >> (corner * 2)) & 0b11
}

/// Pack a vertex position.
///
/// # Layout
/// - Bits 0-6: X (0-127)
/// - Bits 7-13: Y
/// - Bits 14-20: Z (height)
#[inline]
pub const fn pack_position(x: u32, y: u32, z: u32) -> u32 {
    ((z & 0x7F) << 14) | ((y & 0x7F) << 7) | (x & 0x7F)
}

/// Unpack a vertex position into `[x, y, z]`.
#[inline]
pub const fn unpack_position(word: u32) -> [u32; 3] {
    [word & 0x7F, (word >> 7) & 0x7F, (word >> 14) & 0x7F]
}

const ATTR_WIDTH_MASK: u32 = 0x7F;
const ATTR_HEIGHT_SHIFT: u32 = 7;
const ATTR_HEIGHT_MASK: u32 = 0x1FF;
const ATTR_DIRECTION_SHIFT: u32 = 16;
const ATTR_TEXTURE_SHIFT: u32 = 19;
const ATTR_SHADOW_SHIFT: u32 = 27;
const ATTR_LOWER_SHIFT: u32 = 29;

/// Per-vertex attributes of an output vertex.
///
/// # Layout
/// - Bits 0-6: merge width (run width on vertices the width extends, else 0)
/// - Bits 7-15: merge height
/// - Bits 16-18: direction code
/// - Bits 19-26: texture id
/// - Bits 27-28: corner shadow (0-3)
/// - Bits 29-30: lowered flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttributes {
    pub direction: Direction,
    pub texture: u32,
    pub shadow: u32,
    pub lower: u32,
    pub width: u32,
    pub height: u32,
}

impl VertexAttributes {
    #[inline]
    pub fn pack(&self) -> u32 {
        ((self.lower & 0b11) << ATTR_LOWER_SHIFT)
            | ((self.shadow & 0b11) << ATTR_SHADOW_SHIFT)
            | ((self.texture & 0xFF) << ATTR_TEXTURE_SHIFT)
            | ((self.direction.code() & 0b111) << ATTR_DIRECTION_SHIFT)
            | ((self.height & ATTR_HEIGHT_MASK) << ATTR_HEIGHT_SHIFT)
            | (self.width & ATTR_WIDTH_MASK)
    }

    /// Returns `None` if the direction field holds an unknown code.
    pub fn unpack(word: u32) -> Option<Self> {
        let direction = Direction::from_code((word >> ATTR_DIRECTION_SHIFT) & 0b111)?;
        Some(Self {
            direction,
            texture: (word >> ATTR_TEXTURE_SHIFT) & 0xFF,
            shadow: (word >> ATTR_SHADOW_SHIFT) & 0b11,
            lower: (word >> ATTR_LOWER_SHIFT) & 0b11,
            width: word & ATTR_WIDTH_MASK,
            height: (word >> ATTR_HEIGHT_SHIFT) & ATTR_HEIGHT_MASK,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_constants() {
        assert_eq!(CHUNK_SIZE_E, 34);
        assert_eq!(VOLUME_SIZE_E, 34 * 34 * 34);
        assert_eq!(WORDS_PER_QUAD, 12);
        assert_eq!(MAX_MESH_WORDS, 3 * 32 * 32 * 32 * 12);
        assert_eq!(WORST_CASE_MESH_WORDS, 2 * MAX_MESH_WORDS);
    }

    #[test]
    fn direction_codes_match_texture_columns() {
        for (i, dir) in Direction::ALL.iter().enumerate() {
            assert_eq!(dir.index(), i);
            assert_eq!(Direction::from_code(i as u32), Some(*dir));
        }
        assert_eq!(Direction::from_code(6), None);
    }

    #[test]
    fn axes_span_the_face_plane() {
        for dir in Direction::ALL {
            let n = dir.normal();
            let w = dir.width_axis();
            let h = dir.height_axis();
            let dot = |a: [i32; 3], b: [i32; 3]| a[0] * b[0] + a[1] * b[1] + a[2] * b[2];
            assert_eq!(dot(n, w), 0, "{dir:?} width axis leaves the face plane");
            assert_eq!(dot(n, h), 0, "{dir:?} height axis leaves the face plane");
            assert_eq!(dot(w, h), 0, "{dir:?} axes are not orthogonal");
        }
    }

    #[test]
    fn layer_remap_is_invertible() {
        let last = CHUNK_SIZE - 1;
        for dir in Direction::ALL {
            for &(x, y) in &[(0, 0), (last, 0), (0, last), (last, last), (5, 17)] {
                let (col, row) = dir.to_layer(x, y);
                assert!(col < CHUNK_SIZE && row < CHUNK_SIZE);
                assert_eq!(dir.from_layer(col, row), (x, y), "{dir:?} at ({x}, {y})");
            }
        }
    }

    #[test]
    fn layer_columns_follow_width_axis() {
        // Stepping one column in the layer must step one cell along the width axis.
        for dir in Direction::ALL {
            let (x0, y0) = dir.from_layer(3, 7);
            let (x1, y1) = dir.from_layer(4, 7);
            let w = dir.width_axis();
            assert_eq!((x1 as i32 - x0 as i32, y1 as i32 - y0 as i32), (w[0], w[1]), "{dir:?}");
        }
    }

    #[test]
    fn descriptor_fields() {
        let d = pack_descriptor(0xAB, 0b11_10_01_00);
        assert_eq!(descriptor_texture(d), 0xAB);
        assert_eq!(descriptor_shadows(d), 0b11_10_01_00);
        assert_eq!(corner_shadow(descriptor_shadows(d), 0), 0);
        assert_eq!(corner_shadow(descriptor_shadows(d), 1), 1);
        assert_eq!(corner_shadow(descriptor_shadows(d), 2), 2);
        assert_eq!(corner_shadow(descriptor_shadows(d), 3), 3);
    }

    #[test]
    fn position_layout() {
        assert_eq!(pack_position(1, 0, 0), 1);
        assert_eq!(pack_position(0, 1, 0), 1 << 7);
        assert_eq!(pack_position(0, 0, 1), 1 << 14);
        assert_eq!(unpack_position(pack_position(32, 0, 17)), [32, 0, 17]);
    }

    #[test]
    fn attribute_layout() {
        let attrs = VertexAttributes {
            direction: Direction::Up,
            texture: BLOCK_WATER,
            shadow: 3,
            lower: WATER_SURFACE_LOWER,
            width: 32,
            height: 0,
        };
        let word = attrs.pack();
        assert_eq!(word >> 29, 2);
        assert_eq!((word >> 27) & 0b11, 3);
        assert_eq!((word >> 19) & 0xFF, 6);
        assert_eq!((word >> 16) & 0b111, 0);
        assert_eq!(word & 0x7F, 32);
        assert_eq!(VertexAttributes::unpack(word), Some(attrs));
    }
}
