//! Run expansion into packed vertex streams.
//!
//! Every merged run becomes one quad of two triangles (6 vertices, 2 words
//! each). Faces textured as water go to a separate stream that is appended
//! after the opaque stream once meshing is done, so a renderer can draw the
//! translucent part last from one buffer.

use crate::core::{
    corner_shadow, descriptor_shadows, descriptor_texture, pack_position, Direction,
    VertexAttributes, CHUNK_SIZE, WATER_SURFACE_LOWER, WORDS_PER_QUAD,
};
use crate::error::MeshError;

/// Quad corners per vertex, indexed by `flip * 2 + reversed`.
///
/// Corners run 0 → 3 counter-clockwise around the face seen from outside.
/// The flipped variants split the quad along the other diagonal.
const WINDING: [[usize; 6]; 4] = [
    [0, 1, 2, 0, 2, 3],
    [3, 2, 0, 2, 1, 0],
    [1, 2, 3, 1, 3, 0],
    [0, 3, 1, 3, 2, 1],
];

/// Whether each corner sits at the far end of the width axis.
const WIDTH_MASKS: [u32; 4] = [0, 1, 1, 0];
/// Whether each corner sits at the far end of the height axis.
const HEIGHT_MASKS: [u32; 4] = [0, 0, 1, 1];

/// Pick the triangle split for a face's corner shadows.
///
/// The quad is cut along the diagonal joining the lighter corners so the
/// interpolated shadow does not smear across the face. Ties keep the default.
#[inline]
pub fn winding_for(shadows: u32, reverse_winding: bool) -> &'static [usize; 6] {
    let c = |k| corner_shadow(shadows, k);
    let flip = usize::from(c(0) + c(2) > c(1) + c(3));
    &WINDING[flip * 2 + usize::from(reverse_winding)]
}

/// Bounds-tracked writer over a caller-provided word buffer.
struct VertexStream<'a> {
    words: &'a mut [u32],
    len: usize,
}

impl<'a> VertexStream<'a> {
    fn new(words: &'a mut [u32]) -> Self {
        Self { words, len: 0 }
    }

    /// Append one quad. Returns `false`, writing nothing, if it does not fit.
    #[inline]
    fn push_quad(&mut self, quad: &[u32; WORDS_PER_QUAD]) -> bool {
        let end = self.len + WORDS_PER_QUAD;
        match self.words.get_mut(self.len..end) {
            Some(dst) => {
                dst.copy_from_slice(quad);
                self.len = end;
                true
            }
            None => false,
        }
    }
}

/// Word counts of a finished mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitSummary {
    /// Words in the opaque part, which starts at word 0.
    pub opaque_words: usize,
    /// Words in the water part, which starts right after the opaque part.
    pub water_words: usize,
    /// Quads emitted per direction, indexed by [`Direction::index`].
    pub quads_per_direction: [usize; 6],
}

impl EmitSummary {
    #[inline]
    pub fn total_words(&self) -> usize {
        self.opaque_words + self.water_words
    }
}

/// Writes merged runs as quads into the opaque and water streams.
pub struct FaceEmitter<'a> {
    opaque: VertexStream<'a>,
    water: VertexStream<'a>,
    water_texture: u32,
    quads_per_direction: [usize; 6],
    overflow_words: usize,
}

impl<'a> FaceEmitter<'a> {
    /// Create an emitter. `opaque` also receives the water stream on
    /// [`finish`](Self::finish); `water` is scratch.
    pub fn new(opaque: &'a mut [u32], water: &'a mut [u32], water_texture: u32) -> Self {
        Self {
            opaque: VertexStream::new(opaque),
            water: VertexStream::new(water),
            water_texture,
            quads_per_direction: [0; 6],
            overflow_words: 0,
        }
    }

    /// Emit one quad.
    ///
    /// # Arguments
    /// * `direction` - Face direction
    /// * `z`, `x`, `y` - Chunk-local voxel the run starts at
    /// * `width`, `height` - Run extents along the direction's width and height axes
    /// * `descriptor` - Face descriptor (texture and corner shadows)
    /// * `reverse_winding` - Emit triangles clockwise instead
    #[allow(clippy::too_many_arguments)]
    pub fn add_face(
        &mut self,
        direction: Direction,
        z: usize,
        x: usize,
        y: usize,
        width: u32,
        height: u32,
        descriptor: u32,
        reverse_winding: bool,
    ) {
        let texture = descriptor_texture(descriptor);
        let shadows = descriptor_shadows(descriptor);
        let is_water = texture == self.water_texture;
        let lower = if is_water && direction == Direction::Up {
            WATER_SURFACE_LOWER
        } else {
            0
        };

        let origin = [x as i32, y as i32, z as i32];
        let offset = direction.vertex_offset();
        let w_axis = direction.width_axis();
        let h_axis = direction.height_axis();

        let mut quad = [0u32; WORDS_PER_QUAD];
        for (vertex, &corner) in winding_for(shadows, reverse_winding).iter().enumerate() {
            let mw = WIDTH_MASKS[corner];
            let mh = HEIGHT_MASKS[corner];
            let dw = (width * mw) as i32;
            let dh = (height * mh) as i32;
            let pos: [i32; 3] =
                std::array::from_fn(|a| origin[a] + offset[a] + w_axis[a] * dw + h_axis[a] * dh);
            debug_assert!(
                pos.iter().all(|&p| (0..=CHUNK_SIZE as i32).contains(&p)),
                "vertex {pos:?} outside the chunk"
            );

            let attributes = VertexAttributes {
                direction,
                texture,
                shadow: corner_shadow(shadows, corner),
                lower,
                width: width * mw,
                height: height * mh,
            };
            quad[vertex * 2] = pack_position(pos[0] as u32, pos[1] as u32, pos[2] as u32);
            quad[vertex * 2 + 1] = attributes.pack();
        }

        let stream = if is_water { &mut self.water } else { &mut self.opaque };
        if stream.push_quad(&quad) {
            self.quads_per_direction[direction.index()] += 1;
        } else {
            self.overflow_words += WORDS_PER_QUAD;
        }
    }

    /// Append the water stream after the opaque stream.
    ///
    /// Fails if any quad was dropped or the joined mesh does not fit the
    /// opaque buffer.
    pub fn finish(self) -> Result<EmitSummary, MeshError> {
        let Self {
            opaque,
            water,
            quads_per_direction,
            overflow_words,
            ..
        } = self;

        let required = opaque.len + water.len + overflow_words;
        let capacity = opaque.words.len();
        if overflow_words > 0 || required > capacity {
            log::warn!(
                "mesh overflow: {} words needed, {} available ({} words dropped)",
                required,
                capacity,
                overflow_words
            );
            return Err(MeshError::OutputOverflow { required, capacity });
        }

        opaque.words[opaque.len..required].copy_from_slice(&water.words[..water.len]);
        Ok(EmitSummary {
            opaque_words: opaque.len,
            water_words: water.len,
            quads_per_direction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{pack_descriptor, unpack_position, BLOCK_WATER};

    const ROCK: u32 = 5;

    fn vertices(words: &[u32]) -> Vec<([u32; 3], VertexAttributes)> {
        words
            .chunks_exact(2)
            .map(|v| (unpack_position(v[0]), VertexAttributes::unpack(v[1]).unwrap()))
            .collect()
    }

    fn emit_one(direction: Direction, descriptor: u32, reverse: bool) -> Vec<u32> {
        let mut out = vec![0u32; WORDS_PER_QUAD];
        let mut water = vec![0u32; WORDS_PER_QUAD];
        let mut emitter = FaceEmitter::new(&mut out, &mut water, BLOCK_WATER);
        emitter.add_face(direction, 4, 4, 4, 1, 1, descriptor, reverse);
        let summary = emitter.finish().unwrap();
        out.truncate(summary.total_words());
        out
    }

    fn triangle_normal(a: [u32; 3], b: [u32; 3], c: [u32; 3]) -> [i32; 3] {
        let d = |p: [u32; 3], q: [u32; 3]| std::array::from_fn::<i32, 3, _>(|i| q[i] as i32 - p[i] as i32);
        let (u, v) = (d(a, b), d(a, c));
        [
            u[1] * v[2] - u[2] * v[1],
            u[2] * v[0] - u[0] * v[2],
            u[0] * v[1] - u[1] * v[0],
        ]
    }

    #[test]
    fn unshaded_up_face_corners() {
        let words = emit_one(Direction::Up, pack_descriptor(ROCK, 0), false);
        let positions: Vec<_> = vertices(&words).into_iter().map(|(p, _)| p).collect();
        assert_eq!(
            positions,
            vec![[4, 4, 5], [5, 4, 5], [5, 5, 5], [4, 4, 5], [5, 5, 5], [4, 5, 5]]
        );
    }

    #[test]
    fn diagonal_flips_only_on_strict_majority() {
        // c0 = 1: corners 0 and 2 outweigh 1 and 3.
        assert_eq!(winding_for(0b00_00_00_01, false), &WINDING[2]);
        // c0 = 1, c1 = 1: tie keeps the default split.
        assert_eq!(winding_for(0b00_00_01_01, false), &WINDING[0]);
        assert_eq!(winding_for(0b00_00_01_01, true), &WINDING[1]);
        assert_eq!(winding_for(0b00_00_00_01, true), &WINDING[3]);
    }

    #[test]
    fn triangles_face_outward() {
        let shadings = [0, 0b00_00_00_01, 0b00_01_00_00];
        for direction in Direction::ALL {
            let normal = direction.normal();
            for shadows in shadings {
                for reverse in [false, true] {
                    let words = emit_one(direction, pack_descriptor(ROCK, shadows), reverse);
                    let verts = vertices(&words);
                    for tri in verts.chunks_exact(3) {
                        let n = triangle_normal(tri[0].0, tri[1].0, tri[2].0);
                        let dot = n[0] * normal[0] + n[1] * normal[1] + n[2] * normal[2];
                        assert_ne!(dot, 0, "{direction:?} degenerate triangle");
                        assert_eq!(dot > 0, !reverse, "{direction:?} shadows {shadows:#b}");
                    }
                }
            }
        }
    }

    #[test]
    fn attributes_carry_extents_per_corner() {
        let mut out = vec![0u32; WORDS_PER_QUAD];
        let mut water = vec![0u32; WORDS_PER_QUAD];
        let mut emitter = FaceEmitter::new(&mut out, &mut water, BLOCK_WATER);
        emitter.add_face(Direction::Front, 2, 0, 0, 5, 3, pack_descriptor(ROCK, 0b11_00_00_00), false);
        emitter.finish().unwrap();

        for (pos, attrs) in vertices(&out) {
            assert_eq!(attrs.direction, Direction::Front);
            assert_eq!(attrs.texture, ROCK);
            assert_eq!(attrs.lower, 0);
            // Width runs along +x, height along +z from layer 2.
            assert_eq!(attrs.width, pos[0]);
            assert_eq!(attrs.height, pos[2] - 2);
            let corner3 = pos[0] == 0 && pos[2] == 5;
            assert_eq!(attrs.shadow, if corner3 { 3 } else { 0 });
        }
    }

    #[test]
    fn water_goes_after_opaque_and_lowers_only_up_faces() {
        let mut out = vec![0u32; 4 * WORDS_PER_QUAD];
        let mut water = vec![0u32; 4 * WORDS_PER_QUAD];
        let mut emitter = FaceEmitter::new(&mut out, &mut water, BLOCK_WATER);
        emitter.add_face(Direction::Up, 0, 0, 0, 1, 1, pack_descriptor(BLOCK_WATER, 0), false);
        emitter.add_face(Direction::Left, 0, 0, 0, 1, 1, pack_descriptor(ROCK, 0), false);
        emitter.add_face(Direction::Front, 0, 0, 0, 1, 1, pack_descriptor(BLOCK_WATER, 0), false);
        let summary = emitter.finish().unwrap();

        assert_eq!(summary.opaque_words, WORDS_PER_QUAD);
        assert_eq!(summary.water_words, 2 * WORDS_PER_QUAD);
        assert_eq!(summary.quads_per_direction, [1, 1, 1, 0, 0, 0]);

        let verts = vertices(&out[..summary.total_words()]);
        assert!(verts[..6].iter().all(|(_, a)| a.texture == ROCK));
        assert!(verts[6..12].iter().all(|(_, a)| a.direction == Direction::Up && a.lower == WATER_SURFACE_LOWER));
        assert!(verts[12..].iter().all(|(_, a)| a.direction == Direction::Front && a.lower == 0));
    }

    #[test]
    fn overflow_is_reported_not_written() {
        let mut out = vec![0u32; WORDS_PER_QUAD];
        let mut water = vec![0u32; WORDS_PER_QUAD];
        let mut emitter = FaceEmitter::new(&mut out, &mut water, BLOCK_WATER);
        emitter.add_face(Direction::Up, 0, 0, 0, 1, 1, pack_descriptor(ROCK, 0), false);
        emitter.add_face(Direction::Up, 0, 1, 0, 1, 1, pack_descriptor(ROCK, 0), false);
        assert_eq!(
            emitter.finish(),
            Err(MeshError::OutputOverflow {
                required: 2 * WORDS_PER_QUAD,
                capacity: WORDS_PER_QUAD
            })
        );
    }

    #[test]
    fn water_that_cannot_be_appended_overflows() {
        let mut out = vec![0u32; WORDS_PER_QUAD];
        let mut water = vec![0u32; WORDS_PER_QUAD];
        let mut emitter = FaceEmitter::new(&mut out, &mut water, BLOCK_WATER);
        emitter.add_face(Direction::Up, 0, 0, 0, 1, 1, pack_descriptor(ROCK, 0), false);
        emitter.add_face(Direction::Up, 0, 1, 0, 1, 1, pack_descriptor(BLOCK_WATER, 0), false);
        assert!(matches!(emitter.finish(), Err(MeshError::OutputOverflow { .. })));
    }
}
