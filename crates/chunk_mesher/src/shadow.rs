//! Per-corner ambient occlusion.
//!
//! Each face corner looks at the three cells touching it in the layer in
//! front of the face: two sides and one diagonal. Probes are 2D vectors in
//! the face plane, mapped onto world axes by the direction's width and
//! height axes, and rotated a quarter turn per corner.

use crate::core::Direction;
use crate::volume::{solidity, VoxelVolume};

/// Probes for corner 0: side, side, diagonal.
const CORNER_PROBES: [[i32; 2]; 3] = [[-1, 0], [0, -1], [-1, -1]];

#[inline]
fn rotate_ccw([u, v]: [i32; 2]) -> [i32; 2] {
    [-v, u]
}

/// Occlusion level of one corner from its neighbor solidities.
///
/// Two solid sides fully occlude the corner whatever the diagonal holds.
#[inline]
pub const fn occlusion_level(side0: u32, side1: u32, diagonal: u32) -> u32 {
    if side0 + side1 == 2 {
        3
    } else {
        side0 + side1 + diagonal
    }
}

/// Pack the four corner shadow levels of a face on the voxel at padded `(x, y, z)`.
///
/// Corner `k` lands in bits `2k..2k+1`, in the same order the emitter
/// walks quad corners.
pub fn corner_shadows(volume: &VoxelVolume<'_>, direction: Direction, x: usize, y: usize, z: usize) -> u32 {
    let normal = direction.normal();
    let width = direction.width_axis();
    let height = direction.height_axis();

    let sample = |[u, v]: [i32; 2]| {
        let offset = [
            normal[0] + width[0] * u + height[0] * v,
            normal[1] + width[1] * u + height[1] * v,
            normal[2] + width[2] * u + height[2] * v,
        ];
        solidity(volume.get_offset(x, y, z, offset))
    };

    let mut probes = CORNER_PROBES;
    let mut shadows = 0;
    for corner in 0..4 {
        let [side0, side1, diagonal] = probes.map(&sample);
        shadows |= occlusion_level(side0, side1, diagonal) << (corner * 2);
        probes = probes.map(rotate_ccw);
    }
    shadows
}
