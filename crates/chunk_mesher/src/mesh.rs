//! Main meshing pipeline.
//!
//! Sweeps the chunk bottom to top, one height layer at a time:
//! 1. Face collection (visibility + AO descriptors into the layer planes)
//! 2. Side merge (rows, then stacked onto the previous layer)
//! 3. Cap merge (rows, then stacked onto the previous row of the same layer)
//! 4. Quad emission through the [`FaceEmitter`]
//!
//! Side runs still open after the top layer are flushed last, then the water
//! stream is appended to the opaque one.

use crate::core::{
    pack_descriptor, Direction, BLOCK_EMPTY, BLOCK_WATER, CHUNK_SIZE, MAX_MESH_WORDS,
    WORDS_PER_QUAD, WORST_CASE_FACES, WORST_CASE_MESH_WORDS,
};
use crate::error::MeshError;
use crate::expand::FaceEmitter;
use crate::merge::{
    extend_runs, flush_runs, merge_row, run_descriptor, run_height, run_width, LayerBuffers,
};
use crate::shadow::corner_shadows;
use crate::textures::BlockTextures;
use crate::volume::{decode_block_id, is_solid, VoxelVolume};

/// Directions that never apply to water voxels.
const SOLID_ONLY: [Direction; 5] = [
    Direction::Down,
    Direction::Front,
    Direction::Left,
    Direction::Back,
    Direction::Right,
];

/// Statistics about a mesh result.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeshStats {
    /// Visible voxel faces before merging
    pub visible_faces: usize,
    /// Quads per direction, indexed by [`Direction::index`]
    pub quads_per_direction: [usize; 6],
    /// Words in the opaque part of the output
    pub opaque_words: usize,
    /// Words in the water part, right after the opaque part
    pub water_words: usize,
}

impl MeshStats {
    pub fn quad_count(&self) -> usize {
        self.quads_per_direction.iter().sum()
    }

    pub fn total_words(&self) -> usize {
        self.opaque_words + self.water_words
    }

    /// Merge efficiency (1.0 = perfect merging, 0.0 = no merging)
    pub fn merge_efficiency(&self) -> f32 {
        if self.visible_faces > 0 {
            1.0 - (self.quad_count() as f32 / self.visible_faces as f32)
        } else {
            0.0
        }
    }
}

fn check_capacity(buffer: &'static str, actual: usize) -> Result<(), MeshError> {
    if actual < MAX_MESH_WORDS {
        return Err(MeshError::BufferTooSmall {
            buffer,
            required: MAX_MESH_WORDS,
            actual,
        });
    }
    Ok(())
}

/// Mesh a chunk into caller-provided buffers.
///
/// `out` receives the opaque quads followed by the water quads. `water` is
/// scratch for the water stream. Both must hold at least
/// [`MAX_MESH_WORDS`] words. `layers` is reset before use.
pub fn mesh_into(
    volume: &VoxelVolume<'_>,
    textures: &BlockTextures,
    layers: &mut LayerBuffers,
    out: &mut [u32],
    water: &mut [u32],
) -> Result<MeshStats, MeshError> {
    check_capacity("output", out.len())?;
    check_capacity("water", water.len())?;
    volume.check_block_ids(textures)?;

    layers.reset();
    let mut emitter = FaceEmitter::new(out, water, textures.water_texture());
    let mut visible_faces = 0;

    for layer in 0..CHUNK_SIZE {
        let parity = layer & 1;
        layers.begin_layer(parity);
        visible_faces += collect_faces(volume, textures, layers, layer, parity);
        merge_sides(layers, parity, layer, &mut emitter);
        merge_caps(layers, layer, &mut emitter);
    }
    flush_sides(layers, (CHUNK_SIZE - 1) & 1, &mut emitter);

    let summary = emitter.finish()?;
    let stats = MeshStats {
        visible_faces,
        quads_per_direction: summary.quads_per_direction,
        opaque_words: summary.opaque_words,
        water_words: summary.water_words,
    };
    debug_assert!(stats.quad_count() <= WORST_CASE_FACES);
    debug_assert_eq!(stats.total_words(), stats.quad_count() * WORDS_PER_QUAD);

    log::debug!(
        "meshed chunk: {} quads from {} faces, {} opaque + {} water words, merge efficiency {:.2}",
        stats.quad_count(),
        stats.visible_faces,
        stats.opaque_words,
        stats.water_words,
        stats.merge_efficiency()
    );
    Ok(stats)
}

/// Write the descriptors of every visible face in chunk layer `layer`.
/// Returns the number of faces written.
fn collect_faces(
    volume: &VoxelVolume<'_>,
    textures: &BlockTextures,
    layers: &mut LayerBuffers,
    layer: usize,
    parity: usize,
) -> usize {
    let z = layer + 1;
    let mut visible = 0;
    let mut write = |layers: &mut LayerBuffers, direction: Direction, x: usize, y: usize, descriptor: u32| {
        if descriptor != 0 {
            layers.write(direction, parity, x - 1, y - 1, descriptor);
            visible += 1;
        }
    };

    for y in 1..=CHUNK_SIZE {
        for x in 1..=CHUNK_SIZE {
            let word = volume.get(x, y, z);
            if word == BLOCK_EMPTY {
                continue;
            }
            let faces = textures.faces(decode_block_id(word));
            let is_water = word == BLOCK_WATER;

            let above = volume.get(x, y, z + 1);
            if !is_solid(above) && !(is_water && above == BLOCK_WATER) {
                let shadows = if is_water {
                    0
                } else {
                    corner_shadows(volume, Direction::Up, x, y, z)
                };
                let descriptor = pack_descriptor(faces[Direction::Up.index()], shadows);
                write(layers, Direction::Up, x, y, descriptor);
            }

            if is_water {
                continue;
            }

            for direction in SOLID_ONLY {
                if is_solid(volume.get_offset(x, y, z, direction.normal())) {
                    continue;
                }
                let shadows = corner_shadows(volume, direction, x, y, z);
                let descriptor = pack_descriptor(faces[direction.index()], shadows);
                write(layers, direction, x, y, descriptor);
            }
        }
    }
    visible
}

/// Emit a run whose start cell is `(col, row)` in `direction`'s layer plane.
#[inline]
fn emit_run(emitter: &mut FaceEmitter<'_>, direction: Direction, z: usize, col: usize, row: usize, run: u32) {
    let (x, y) = direction.from_layer(col, row);
    emitter.add_face(
        direction,
        z,
        x,
        y,
        run_width(run),
        run_height(run),
        run_descriptor(run),
        false,
    );
}

/// Merge the side planes of `layer` and close runs that stop growing upward.
fn merge_sides(layers: &mut LayerBuffers, parity: usize, layer: usize, emitter: &mut FaceEmitter<'_>) {
    for direction in Direction::SIDES {
        let (current, previous) = layers.side_pair(direction, parity);
        for row in current.chunks_exact_mut(CHUNK_SIZE) {
            merge_row(row);
        }
        extend_runs(current, previous, |i, run| {
            let start = layer - run_height(run) as usize;
            emit_run(emitter, direction, start, i % CHUNK_SIZE, i / CHUNK_SIZE, run);
        });
    }
}

/// Emit every side run still open after the top layer.
fn flush_sides(layers: &LayerBuffers, parity: usize, emitter: &mut FaceEmitter<'_>) {
    for direction in Direction::SIDES {
        let plane = layers.plane(LayerBuffers::slot(direction, parity));
        flush_runs(plane, |i, run| {
            let start = CHUNK_SIZE - run_height(run) as usize;
            emit_run(emitter, direction, start, i % CHUNK_SIZE, i / CHUNK_SIZE, run);
        });
    }
}

/// Merge the up and down planes of `layer` row by row and emit every run.
fn merge_caps(layers: &LayerBuffers, layer: usize, emitter: &mut FaceEmitter<'_>) {
    let mut rows = [0u32; 2 * CHUNK_SIZE];

    for direction in Direction::CAPS {
        rows.fill(0);
        let plane = layers.plane(LayerBuffers::slot(direction, 0));

        for (row, cells) in plane.chunks_exact(CHUNK_SIZE).enumerate() {
            let (even, odd) = rows.split_at_mut(CHUNK_SIZE);
            let (current, previous) = if row & 1 == 0 { (even, &*odd) } else { (odd, &*even) };
            current.copy_from_slice(cells);
            merge_row(current);
            extend_runs(current, previous, |col, run| {
                let start = row - run_height(run) as usize;
                emit_run(emitter, direction, layer, col, start, run);
            });
        }

        let last = if (CHUNK_SIZE - 1) & 1 == 0 {
            &rows[..CHUNK_SIZE]
        } else {
            &rows[CHUNK_SIZE..]
        };
        flush_runs(last, |col, run| {
            let start = CHUNK_SIZE - run_height(run) as usize;
            emit_run(emitter, direction, layer, col, start, run);
        });
    }
}

/// Mesh a padded volume into caller buffers and return the words written.
///
/// Layer scratch lives on the stack; nothing is retained between calls.
///
/// # Arguments
/// * `input` - Padded volume of `CHUNK_SIZE_E³` voxel words
/// * `textures` - Block texture table
/// * `out` - Receives opaque then water quads, at least [`MAX_MESH_WORDS`] words
/// * `water_scratch` - Water stream scratch, at least [`MAX_MESH_WORDS`] words
pub fn create_mesh(
    input: &[u32],
    textures: &BlockTextures,
    out: &mut [u32],
    water_scratch: &mut [u32],
) -> Result<usize, MeshError> {
    let volume = VoxelVolume::new(input)?;
    let mut layers = LayerBuffers::new();
    let stats = mesh_into(&volume, textures, &mut layers, out, water_scratch)?;
    Ok(stats.total_words())
}

/// Reusable mesher that owns its scratch and output buffers.
///
/// Allocates once in [`ChunkMesher::new`]; meshing does not allocate.
/// Buffers are sized to [`WORST_CASE_MESH_WORDS`], so no voxel content can
/// overflow them.
pub struct ChunkMesher {
    layers: Box<LayerBuffers>,
    output: Vec<u32>,
    water: Vec<u32>,
}

impl ChunkMesher {
    pub fn new() -> Self {
        Self {
            layers: LayerBuffers::new_boxed(),
            output: vec![0; WORST_CASE_MESH_WORDS],
            water: vec![0; WORST_CASE_MESH_WORDS],
        }
    }

    /// Mesh one chunk. The result borrows the mesher's output buffer.
    pub fn mesh(&mut self, volume: &VoxelVolume<'_>, textures: &BlockTextures) -> Result<ChunkMesh<'_>, MeshError> {
        let stats = mesh_into(volume, textures, &mut self.layers, &mut self.output, &mut self.water)?;
        Ok(ChunkMesh {
            words: &self.output[..stats.total_words()],
            stats,
        })
    }
}

impl Default for ChunkMesher {
    fn default() -> Self {
        Self::new()
    }
}

/// A meshed chunk: opaque quads followed by water quads.
#[derive(Debug, Clone, Copy)]
pub struct ChunkMesh<'a> {
    words: &'a [u32],
    pub stats: MeshStats,
}

impl<'a> ChunkMesh<'a> {
    /// Interleaved vertex words (position, attributes).
    pub fn words(&self) -> &'a [u32] {
        self.words
    }

    pub fn opaque(&self) -> &'a [u32] {
        &self.words[..self.stats.opaque_words]
    }

    pub fn water(&self) -> &'a [u32] {
        &self.words[self.stats.opaque_words..]
    }

    /// Vertex words as bytes, for direct GPU upload.
    pub fn as_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.words)
    }

    pub fn quad_count(&self) -> usize {
        self.words.len() / WORDS_PER_QUAD
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
