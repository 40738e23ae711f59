//! WASM bindings for the chunk mesher.
//!
//! Provides JavaScript-accessible functions for meshing padded voxel chunks.
//! Scratch buffers and the block texture table live in thread-local state, so
//! repeated calls do not allocate inside the mesher.

use std::cell::{Cell, RefCell};

use chunk_mesher::debug::{count_by_direction, decode_quads};
use chunk_mesher::{
    BlockTextures, ChunkMesh, ChunkMesher, MeshError, VoxelVolume, CHUNK_SIZE, MAX_MESH_WORDS,
    VOLUME_SIZE_E,
};
use wasm_bindgen::prelude::*;

/// Texture ids per block in a flat texture table.
const FACES_PER_BLOCK: usize = 6;
/// Words per quad in [`decode_quad_bounds`] output.
const BOUNDS_STRIDE: usize = 7;

thread_local! {
    static MESHER: RefCell<ChunkMesher> = RefCell::new(ChunkMesher::new());
    static TEXTURES: RefCell<BlockTextures> = RefCell::new(BlockTextures::default());
}

/// Mesh result returned to JavaScript.
///
/// `words` holds the opaque quads followed by the water quads, two words per
/// vertex, ready to upload as a vertex buffer.
#[wasm_bindgen]
pub struct MeshResult {
    words: Vec<u32>,
    opaque_words: usize,
    water_words: usize,
    visible_faces: usize,
    quads_per_direction: [usize; 6],
    merge_efficiency: f32,
}

#[wasm_bindgen]
impl MeshResult {
    /// Packed vertex words (position, attributes per vertex) as a `Uint32Array`.
    #[wasm_bindgen(getter)]
    pub fn words(&self) -> js_sys::Uint32Array {
        js_sys::Uint32Array::from(&self.words[..])
    }

    /// Words in the opaque part, which starts at word 0.
    #[wasm_bindgen(getter)]
    pub fn opaque_words(&self) -> usize {
        self.opaque_words
    }

    /// Words in the water part, which starts at `opaque_words`.
    #[wasm_bindgen(getter)]
    pub fn water_words(&self) -> usize {
        self.water_words
    }

    #[wasm_bindgen(getter)]
    pub fn quad_count(&self) -> usize {
        self.quads_per_direction.iter().sum()
    }

    /// Visible faces before merging.
    #[wasm_bindgen(getter)]
    pub fn visible_faces(&self) -> usize {
        self.visible_faces
    }

    /// Quads per direction: up, front, left, back, right, down.
    #[wasm_bindgen(getter)]
    pub fn dir_quad_counts(&self) -> Vec<u32> {
        self.quads_per_direction.iter().map(|&n| n as u32).collect()
    }

    #[wasm_bindgen(getter)]
    pub fn merge_efficiency(&self) -> f32 {
        self.merge_efficiency
    }

    #[wasm_bindgen(getter)]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl From<ChunkMesh<'_>> for MeshResult {
    fn from(mesh: ChunkMesh<'_>) -> Self {
        Self {
            words: mesh.words().to_vec(),
            opaque_words: mesh.stats.opaque_words,
            water_words: mesh.stats.water_words,
            visible_faces: mesh.stats.visible_faces,
            quads_per_direction: mesh.stats.quads_per_direction,
            merge_efficiency: mesh.stats.merge_efficiency(),
        }
    }
}

fn js_error(err: MeshError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn mesh_with_thread_state(voxels: &[u32]) -> Result<MeshResult, MeshError> {
    let volume = VoxelVolume::new(voxels)?;
    TEXTURES.with(|textures| {
        MESHER.with(|mesher| {
            let textures = textures.borrow();
            let mut mesher = mesher.borrow_mut();
            mesher.mesh(&volume, &textures).map(MeshResult::from)
        })
    })
}

/// Mesh a padded chunk with the current texture table.
///
/// # Arguments
/// * `voxels` - Padded volume, `padded_volume_len()` words, z-major with z up
///
/// # Example (JavaScript)
/// ```javascript
/// const voxels = new Uint32Array(padded_volume_len());
/// const result = create_mesh(voxels);
/// gl.bufferData(gl.ARRAY_BUFFER, result.words, gl.STATIC_DRAW);
/// ```
#[wasm_bindgen]
pub fn create_mesh(voxels: &[u32]) -> Result<MeshResult, JsValue> {
    let result = mesh_with_thread_state(voxels).map_err(js_error)?;
    log(&format!(
        "Meshed chunk: {} quads ({} opaque words, {} water words), {:.1}% merged",
        result.quad_count(),
        result.opaque_words,
        result.water_words,
        result.merge_efficiency * 100.0
    ));
    Ok(result)
}

/// Mesh a padded chunk into caller buffers and return the words written.
///
/// `out` receives opaque quads followed by water quads; `scratch` holds the
/// water stream while meshing. Both need `max_mesh_words()` words.
#[wasm_bindgen]
pub fn create_mesh_into(voxels: &[u32], out: &mut [u32], scratch: &mut [u32]) -> Result<u32, JsValue> {
    let written = TEXTURES
        .with(|textures| chunk_mesher::create_mesh(voxels, &textures.borrow(), out, scratch))
        .map_err(js_error)?;
    log(&format!("Meshed chunk into caller buffers: {} words", written));
    Ok(written as u32)
}

/// Parse a flat texture table of six ids per block.
fn parse_texture_table(flat: &[u32]) -> Result<BlockTextures, String> {
    if flat.len() % FACES_PER_BLOCK != 0 {
        return Err(format!(
            "texture table length {} is not a multiple of {}",
            flat.len(),
            FACES_PER_BLOCK
        ));
    }
    BlockTextures::from_flat(flat).map_err(|err| err.to_string())
}

/// Replace the texture table used by `create_mesh` and `create_mesh_into`.
///
/// Each block id owns six consecutive entries: up, front, left, back, right,
/// down. Texture ids must fit in 8 bits and the table must reach the water block.
#[wasm_bindgen]
pub fn set_block_textures(flat: &[u32]) -> Result<(), JsValue> {
    let textures = parse_texture_table(flat).map_err(|err| JsValue::from_str(&err))?;
    log(&format!("Texture table set: {} blocks", textures.len()));
    TEXTURES.with(|current| *current.borrow_mut() = textures);
    Ok(())
}

/// Restore the stock texture table.
#[wasm_bindgen]
pub fn reset_block_textures() {
    TEXTURES.with(|current| *current.borrow_mut() = BlockTextures::default());
}

fn quad_bounds(words: &[u32]) -> Vec<u32> {
    let quads = decode_quads(words);
    let mut bounds = Vec::with_capacity(quads.len() * BOUNDS_STRIDE);
    for quad in &quads {
        let (min, max) = quad.bounds();
        bounds.push(quad.direction.code());
        bounds.extend_from_slice(&min);
        bounds.extend_from_slice(&max);
    }
    bounds
}

/// Decode mesh words into quad bounds for wireframe overlays.
///
/// Returns 7 words per quad: direction code, min x/y/z, max x/y/z.
#[wasm_bindgen]
pub fn decode_quad_bounds(words: &[u32]) -> Vec<u32> {
    quad_bounds(words)
}

/// Count decoded quads per direction: up, front, left, back, right, down.
#[wasm_bindgen]
pub fn count_quads_by_direction(words: &[u32]) -> Vec<u32> {
    count_by_direction(&decode_quads(words))
        .iter()
        .map(|&n| n as u32)
        .collect()
}

/// Chunk edge length in voxels.
#[wasm_bindgen]
pub fn chunk_size() -> u32 {
    CHUNK_SIZE as u32
}

/// Words expected in the `voxels` argument.
#[wasm_bindgen]
pub fn padded_volume_len() -> u32 {
    VOLUME_SIZE_E as u32
}

/// Words required in each buffer passed to `create_mesh_into`.
#[wasm_bindgen]
pub fn max_mesh_words() -> u32 {
    MAX_MESH_WORDS as u32
}

/// Route Rust panics to the browser console.
#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

// Logging support

thread_local! {
    static LOG_ENABLED: Cell<bool> = Cell::new(false);
}

/// Enable or disable console logging.
#[wasm_bindgen]
pub fn set_log_enabled(enabled: bool) {
    LOG_ENABLED.with(|flag| flag.set(enabled));
}

fn log(message: &str) {
    if LOG_ENABLED.with(|enabled| enabled.get()) {
        web_sys::console::log_1(&message.into());
    }
}

/// Get the version of the mesher library.
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
