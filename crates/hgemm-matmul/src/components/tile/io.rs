use half::f16;

use crate::components::TILE_SIZE;

use super::WarpFragment;

/// Anything hardware tile operands can be read from, addressed in elements.
pub trait FragmentSource {
    /// Element (row, k) of the lhs operand.
    fn lhs(&self, row: usize, k: usize) -> f16;

    /// Element (k, col) of the rhs operand.
    fn rhs(&self, k: usize, col: usize) -> f16;
}

/// Loads the lhs hardware tile starting at (row, k) into the fragment.
pub fn fill_lhs<S: FragmentSource + ?Sized>(
    source: &S,
    row: usize,
    k: usize,
    fragment: &mut WarpFragment,
) {
    for (lane, registers) in fragment.lanes.iter_mut().enumerate() {
        let row = row + lane % TILE_SIZE;
        for (offset, value) in registers.data.iter_mut().enumerate() {
            *value = source.lhs(row, k + offset);
        }
    }
}

/// Loads the rhs hardware tile starting at (k, col) into the fragment.
pub fn fill_rhs<S: FragmentSource + ?Sized>(
    source: &S,
    k: usize,
    col: usize,
    fragment: &mut WarpFragment,
) {
    for (lane, registers) in fragment.lanes.iter_mut().enumerate() {
        let col = col + lane % TILE_SIZE;
        for (offset, value) in registers.data.iter_mut().enumerate() {
            *value = source.rhs(k + offset, col);
        }
    }
}
