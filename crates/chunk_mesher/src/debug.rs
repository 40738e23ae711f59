//! Vertex stream decoding for inspection and tests.
//!
//! Turns the packed two-word vertices back into positions and attributes,
//! grouped by quad.

use crate::core::{
    unpack_position, Direction, VertexAttributes, VERTICES_PER_QUAD, WORDS_PER_QUAD,
    WORDS_PER_VERTEX,
};

/// One unpacked output vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedVertex {
    /// Chunk-local `[x, y, z]`, each in `0..=CHUNK_SIZE`.
    pub position: [u32; 3],
    pub attributes: VertexAttributes,
}

/// One unpacked quad (two triangles).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedQuad {
    pub direction: Direction,
    pub texture: u32,
    pub lower: u32,
    /// Merge width (largest width field over the quad's vertices).
    pub width: u32,
    /// Merge height (largest height field over the quad's vertices).
    pub height: u32,
    pub vertices: [DecodedVertex; VERTICES_PER_QUAD],
}

impl DecodedQuad {
    /// The quad's two triangles in emission order.
    pub fn triangles(&self) -> [[DecodedVertex; 3]; 2] {
        let v = &self.vertices;
        [[v[0], v[1], v[2]], [v[3], v[4], v[5]]]
    }

    /// Axis-aligned bounds as `(min, max)` corners.
    pub fn bounds(&self) -> ([u32; 3], [u32; 3]) {
        let mut min = [u32::MAX; 3];
        let mut max = [0; 3];
        for vertex in &self.vertices {
            for axis in 0..3 {
                min[axis] = min[axis].min(vertex.position[axis]);
                max[axis] = max[axis].max(vertex.position[axis]);
            }
        }
        (min, max)
    }

    /// Voxel faces covered by this quad.
    pub fn area(&self) -> u32 {
        self.width * self.height
    }
}

fn decode_quad(words: &[u32]) -> Option<DecodedQuad> {
    let mut vertices = [DecodedVertex {
        position: [0; 3],
        attributes: VertexAttributes::unpack(words[1])?,
    }; VERTICES_PER_QUAD];
    for (vertex, pair) in vertices.iter_mut().zip(words.chunks_exact(WORDS_PER_VERTEX)) {
        vertex.position = unpack_position(pair[0]);
        vertex.attributes = VertexAttributes::unpack(pair[1])?;
    }

    let first = vertices[0].attributes;
    Some(DecodedQuad {
        direction: first.direction,
        texture: first.texture,
        lower: first.lower,
        width: vertices.iter().map(|v| v.attributes.width).max().unwrap_or(0),
        height: vertices.iter().map(|v| v.attributes.height).max().unwrap_or(0),
        vertices,
    })
}

/// Decode a vertex stream into quads.
///
/// Trailing words that do not form a whole quad are ignored, as are quads
/// carrying an unknown direction code.
pub fn decode_quads(words: &[u32]) -> Vec<DecodedQuad> {
    words.chunks_exact(WORDS_PER_QUAD).filter_map(decode_quad).collect()
}

/// Quad count per direction, indexed by [`Direction::index`].
pub fn count_by_direction(quads: &[DecodedQuad]) -> [usize; 6] {
    let mut counts = [0; 6];
    for quad in quads {
        counts[quad.direction.index()] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{pack_descriptor, BLOCK_WATER, WATER_SURFACE_LOWER};
    use crate::expand::FaceEmitter;

    #[test]
    fn decodes_emitted_quads() {
        let mut out = vec![0u32; 2 * WORDS_PER_QUAD];
        let mut water = vec![0u32; WORDS_PER_QUAD];
        let mut emitter = FaceEmitter::new(&mut out, &mut water, BLOCK_WATER);
        emitter.add_face(Direction::Right, 3, 7, 2, 4, 2, pack_descriptor(5, 0), false);
        emitter.add_face(Direction::Up, 9, 0, 0, 32, 32, pack_descriptor(BLOCK_WATER, 0), false);
        let summary = emitter.finish().unwrap();

        let quads = decode_quads(&out[..summary.total_words()]);
        assert_eq!(quads.len(), 2);

        let right = &quads[0];
        assert_eq!((right.direction, right.texture, right.lower), (Direction::Right, 5, 0));
        assert_eq!((right.width, right.height, right.area()), (4, 2, 8));
        // Right faces sit on x + 1 and extend along +y and +z.
        assert_eq!(right.bounds(), ([8, 2, 3], [8, 6, 5]));

        let water = &quads[1];
        assert_eq!(water.lower, WATER_SURFACE_LOWER);
        assert_eq!(water.bounds(), ([0, 0, 10], [32, 32, 10]));
        assert_eq!(count_by_direction(&quads), [1, 0, 0, 0, 1, 0]);
    }

    #[test]
    fn partial_quads_are_ignored() {
        let mut out = vec![0u32; WORDS_PER_QUAD];
        let mut water = vec![0u32; 0];
        let mut emitter = FaceEmitter::new(&mut out, &mut water, BLOCK_WATER);
        emitter.add_face(Direction::Down, 0, 0, 0, 1, 1, pack_descriptor(1, 0), false);
        emitter.finish().unwrap();

        assert_eq!(decode_quads(&out[..WORDS_PER_QUAD - 1]), Vec::new());
        let triangles = decode_quads(&out)[0].triangles();
        assert!(triangles.iter().flatten().all(|v| v.attributes.direction == Direction::Down));
    }
}
