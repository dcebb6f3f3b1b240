use half::f16;
use hgemm_runtime::cube::Cube;

use crate::components::{
    InvalidConfigError, TILE_SIZE, TileGeometry,
    global::memory::BlockInputs,
    stage::{PipelineEventListener, StageMemory, WarpAccumulators, warp_matmul},
    tile::{FragmentSource, MmaInstruction},
};

use super::{GlobalPipeline, num_slices};

#[derive(Debug, Clone, Copy, Default)]
/// No staging: warps load their fragments from global memory, one hardware tile of k at a time.
pub struct DirectPipeline;

/// Fragments read from global memory with bounds checks.
struct GlobalFragments<'a> {
    inputs: &'a BlockInputs<'a>,
    k_offset: usize,
}

impl FragmentSource for GlobalFragments<'_> {
    fn lhs(&self, row: usize, k: usize) -> f16 {
        self.inputs
            .lhs
            .read_checked(self.inputs.row + row, self.k_offset + k)
    }

    fn rhs(&self, k: usize, col: usize) -> f16 {
        self.inputs
            .rhs
            .read_checked(self.k_offset + k, self.inputs.col + col)
    }
}

impl GlobalPipeline for DirectPipeline {
    const NUM_STAGES: usize = 0;

    fn check(geometry: &TileGeometry, _num_units: u32) -> Result<(), InvalidConfigError> {
        if geometry.block_k != TILE_SIZE {
            let block_k = geometry.block_k;
            return Err(Box::new(format!(
                "Direct loading walks k by hardware tiles of {TILE_SIZE}, got block k {block_k}"
            )));
        }
        Ok(())
    }

    fn execute<I: MmaInstruction, E: PipelineEventListener>(
        _cube: &mut Cube,
        inputs: &BlockInputs<'_>,
        k: usize,
        geometry: &TileGeometry,
        _stage: &mut StageMemory,
        accumulators: &mut [WarpAccumulators],
        _listener: &mut E,
    ) {
        for slice in 0..num_slices(k, geometry) {
            let source = GlobalFragments {
                inputs,
                k_offset: slice * geometry.block_k,
            };

            for acc in accumulators.iter_mut() {
                warp_matmul::<I, _>(&source, geometry.block_k, acc);
            }
        }
    }
}
