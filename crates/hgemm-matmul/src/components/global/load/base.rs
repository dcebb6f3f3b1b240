use hgemm_runtime::cube::Cube;

use crate::components::{
    InvalidConfigError, TileGeometry,
    global::memory::BlockInputs,
    stage::{BufferId, StageMemory},
};

/// Validates if a loading strategy can run with a geometry and a cube size
pub trait LoadingValidation {
    fn check(geometry: &TileGeometry, num_units: u32) -> Result<(), InvalidConfigError>;
}

/// Copies a k slice of both block operands into a staging slot, using every unit of the cube.
pub trait LoadingStrategy: LoadingValidation + Send + Sync + 'static {
    /// Fills `buffer` with the slice starting at `k_offset`.
    fn fill_stage(
        cube: &Cube,
        inputs: &BlockInputs<'_>,
        k_offset: usize,
        geometry: &TileGeometry,
        stage: &mut StageMemory,
        buffer: BufferId,
    );
}
