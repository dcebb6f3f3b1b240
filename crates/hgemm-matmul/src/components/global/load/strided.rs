use hgemm_runtime::cube::Cube;

use crate::components::{
    InvalidConfigError, StageIdent, TileGeometry,
    global::memory::BlockInputs,
    stage::{BufferId, StageMemory},
};

use super::{LoadingStrategy, LoadingValidation};

#[derive(Debug, Clone, Copy, Default)]
/// Loads the whole slice with all units, lhs first then rhs, one element per unit and step.
///
/// Consecutive units read consecutive staged elements.
pub struct StridedLoading;

impl LoadingValidation for StridedLoading {
    fn check(_geometry: &TileGeometry, _num_units: u32) -> Result<(), InvalidConfigError> {
        Ok(())
    }
}

impl LoadingStrategy for StridedLoading {
    fn fill_stage(
        cube: &Cube,
        inputs: &BlockInputs<'_>,
        k_offset: usize,
        geometry: &TileGeometry,
        stage: &mut StageMemory,
        buffer: BufferId,
    ) {
        let num_units = cube.num_units() as usize;
        let lhs_size = geometry.block_m * geometry.block_k;
        let rhs_size = geometry.block_k * geometry.block_n;

        for unit in cube.units() {
            for index in (unit as usize..lhs_size).step_by(num_units) {
                let (row, k) = (index % geometry.block_m, index / geometry.block_m);
                let value = inputs.lhs.read_checked(inputs.row + row, k_offset + k);
                stage.write(StageIdent::Lhs, buffer, row, k, value);
            }
        }

        for unit in cube.units() {
            for index in (unit as usize..rhs_size).step_by(num_units) {
                let (k, col) = (index / geometry.block_n, index % geometry.block_n);
                let value = inputs.rhs.read_checked(k_offset + k, inputs.col + col);
                stage.write(StageIdent::Rhs, buffer, k, col, value);
            }
        }
    }
}
