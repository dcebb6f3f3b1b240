use hgemm_runtime::{cube::Cube, tensor::TensorHandle};

use crate::components::{
    InvalidConfigError, TileGeometry,
    stage::{StageMemory, WarpAccumulators},
};

/// Responsible of writing the accumulated block tile to global memory
pub trait OutputWriter: Send + Sync + 'static {
    /// Checks the writer can run with a geometry and the number of staging slots.
    fn check(geometry: &TileGeometry, num_stages: usize) -> Result<(), InvalidConfigError>;

    /// Writes the block tile whose first element is at `position` (row, col) of `out`.
    ///
    /// The staging memory is free to reuse: no operand slice is read anymore.
    fn write(
        cube: &mut Cube,
        out: &TensorHandle,
        position: (usize, usize),
        geometry: &TileGeometry,
        stage: &mut StageMemory,
        accumulators: &[WarpAccumulators],
    );
}
