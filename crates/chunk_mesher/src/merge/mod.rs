//! Run-length greedy merge over layer buffers.
//!
//! Merging happens in two passes:
//! - `merge_row` collapses equal descriptors along a row into runs with a width
//! - `extend_runs` stacks each run onto the matching run of the previous
//!   layer (side faces) or previous row (up/down faces), growing its height
//!
//! A run is written into the cell where it starts. The other cells it
//! covers keep their raw descriptors and are skipped by width.

mod layers;

pub use layers::LayerBuffers;

/// Mask of the face descriptor inside a run word.
pub const DESCRIPTOR_MASK: u32 = 0x1_FFFF;
/// Mask of the merge key (descriptor + width) inside a run word.
pub const RUN_KEY_MASK: u32 = 0x01FF_FFFF;

const RUN_WIDTH_SHIFT: u32 = 17;
const RUN_HEIGHT_SHIFT: u32 = 25;

/// Largest width a run field can hold.
pub const MAX_RUN_WIDTH: u32 = 0xFF;
/// Largest height a run field can hold.
pub const MAX_RUN_HEIGHT: u32 = 0x7F;

/// Pack a run word.
///
/// # Layout
/// - Bits 0-16: face descriptor
/// - Bits 17-24: width (1-255)
/// - Bits 25-31: height (1-127)
#[inline]
pub const fn pack_run(descriptor: u32, width: u32, height: u32) -> u32 {
    (descriptor & DESCRIPTOR_MASK) | (width << RUN_WIDTH_SHIFT) | (height << RUN_HEIGHT_SHIFT)
}

#[inline]
pub const fn run_descriptor(run: u32) -> u32 {
    run & DESCRIPTOR_MASK
}

#[inline]
pub const fn run_width(run: u32) -> u32 {
    (run >> RUN_WIDTH_SHIFT) & MAX_RUN_WIDTH
}

#[inline]
pub const fn run_height(run: u32) -> u32 {
    run >> RUN_HEIGHT_SHIFT
}

/// Horizontal pass: tag each maximal run of equal non-zero descriptors.
///
/// The first cell of a run receives the run word with height 1. Runs that
/// would exceed `MAX_RUN_WIDTH` are split.
pub fn merge_row(row: &mut [u32]) {
    let mut i = 0;
    while i < row.len() {
        let descriptor = row[i];
        if descriptor == 0 {
            i += 1;
            continue;
        }
        let mut j = i + 1;
        while j < row.len() && row[j] == descriptor && j - i < MAX_RUN_WIDTH as usize {
            j += 1;
        }
        row[i] = pack_run(descriptor, (j - i) as u32, 1);
        i = j;
    }
}

/// Vertical pass: carry runs of `previous` into `current` or emit them.
///
/// A run carries when the cell at the same index in `current` holds a run
/// with the same descriptor and width, and its height is not saturated. The
/// carried run replaces the current one with its height incremented.
/// Anything else closes the previous run through `emit(index, run)`.
pub fn extend_runs(current: &mut [u32], previous: &[u32], mut emit: impl FnMut(usize, u32)) {
    debug_assert_eq!(current.len(), previous.len());
    let mut i = 0;
    while i < previous.len() {
        let top = previous[i];
        if top == 0 {
            i += 1;
            continue;
        }
        let height = run_height(top);
        let cur = current[i];
        if top & RUN_KEY_MASK == cur & RUN_KEY_MASK && height < MAX_RUN_HEIGHT {
            current[i] = (cur & RUN_KEY_MASK) | ((height + 1) << RUN_HEIGHT_SHIFT);
        } else {
            emit(i, top);
        }
        i += run_width(top) as usize;
    }
}

/// Emit every run still open in `runs`.
pub fn flush_runs(runs: &[u32], mut emit: impl FnMut(usize, u32)) {
    let mut i = 0;
    while i < runs.len() {
        let run = runs[i];
        if run == 0 {
            i += 1;
            continue;
        }
        emit(i, run);
        i += run_width(run) as usize;
    }
}
