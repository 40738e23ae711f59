//! Fixed-size scratch planes for the per-direction layer buffers.

use crate::core::{Direction, CHUNK_SIZE, PLANE_SIZE};

/// Number of planes: up, four sides, down, then four more sides for the
/// other layer parity (two slots unused so slot = direction + parity * 6).
pub const LAYER_SLOTS: usize = 12;

/// Slot offset between the two side-plane parities.
const PARITY_STRIDE: usize = 6;

/// Layer buffers for one meshing pass.
///
/// Up and down faces each own one plane. Side faces alternate between two
/// planes by layer parity so the previous layer stays readable while the
/// current one is filled.
///
/// WARNING: this is ~48KB. Use `new_boxed()` where stack is scarce (WASM).
#[derive(Clone)]
pub struct LayerBuffers {
    planes: [u32; LAYER_SLOTS * PLANE_SIZE],
}

impl LayerBuffers {
    pub fn new() -> Self {
        Self {
            planes: [0; LAYER_SLOTS * PLANE_SIZE],
        }
    }

    pub fn new_boxed() -> Box<Self> {
        Box::new(Self::new())
    }

    /// Slot holding `direction` faces for a layer of the given parity.
    /// Up and down ignore parity.
    #[inline]
    pub fn slot(direction: Direction, parity: usize) -> usize {
        if direction.is_side() {
            direction.index() + (parity & 1) * PARITY_STRIDE
        } else {
            direction.index()
        }
    }

    #[inline]
    pub fn plane(&self, slot: usize) -> &[u32] {
        &self.planes[slot * PLANE_SIZE..(slot + 1) * PLANE_SIZE]
    }

    #[inline]
    pub fn plane_mut(&mut self, slot: usize) -> &mut [u32] {
        &mut self.planes[slot * PLANE_SIZE..(slot + 1) * PLANE_SIZE]
    }

    /// Clear all planes before a new chunk.
    pub fn reset(&mut self) {
        self.planes.fill(0);
    }

    /// Clear the planes that layer `parity` is about to fill.
    pub fn begin_layer(&mut self, parity: usize) {
        for direction in Direction::ALL {
            self.plane_mut(Self::slot(direction, parity)).fill(0);
        }
    }

    /// Write a descriptor at chunk-local `(x, y)` into the plane of `direction`.
    #[inline]
    pub fn write(&mut self, direction: Direction, parity: usize, x: usize, y: usize, descriptor: u32) {
        let (col, row) = direction.to_layer(x, y);
        let slot = Self::slot(direction, parity);
        self.plane_mut(slot)[row * CHUNK_SIZE + col] = descriptor;
    }

    /// Current and previous planes of a side direction.
    pub fn side_pair(&mut self, direction: Direction, parity: usize) -> (&mut [u32], &[u32]) {
        debug_assert!(direction.is_side());
        let current = Self::slot(direction, parity);
        let previous = Self::slot(direction, parity ^ 1);
        let (low, high) = self.planes.split_at_mut(current.max(previous) * PLANE_SIZE);
        let low_plane = &mut low[current.min(previous) * PLANE_SIZE..][..PLANE_SIZE];
        let high_plane = &mut high[..PLANE_SIZE];
        if current < previous {
            (low_plane, &*high_plane)
        } else {
            (high_plane, &*low_plane)
        }
    }
}

impl Default for LayerBuffers {
    fn default() -> Self {
        Self::new()
    }
}
