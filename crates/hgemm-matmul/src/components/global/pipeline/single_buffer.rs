use core::marker::PhantomData;

use hgemm_runtime::cube::Cube;

use crate::components::{
    InvalidConfigError, TileGeometry,
    global::{load::LoadingStrategy, memory::BlockInputs},
    stage::{BufferId, PipelineEventListener, StageMemory, WarpAccumulators},
    tile::MmaInstruction,
};

use super::{GlobalPipeline, compute_stage, loaded, num_slices, sync_cube};

/// One staging slot: every slice is loaded, then computed, with a barrier after each step.
pub struct SingleBufferPipeline<L: LoadingStrategy> {
    _loading: PhantomData<L>,
}

impl<L: LoadingStrategy> GlobalPipeline for SingleBufferPipeline<L> {
    const NUM_STAGES: usize = 1;

    fn check(geometry: &TileGeometry, num_units: u32) -> Result<(), InvalidConfigError> {
        L::check(geometry, num_units)
    }

    fn execute<I: MmaInstruction, E: PipelineEventListener>(
        cube: &mut Cube,
        inputs: &BlockInputs<'_>,
        k: usize,
        geometry: &TileGeometry,
        stage: &mut StageMemory,
        accumulators: &mut [WarpAccumulators],
        listener: &mut E,
    ) {
        for slice in 0..num_slices(k, geometry) {
            let k_offset = slice * geometry.block_k;

            L::fill_stage(cube, inputs, k_offset, geometry, stage, BufferId::A);
            loaded(cube, BufferId::A, slice, listener);
            sync_cube(cube, listener);

            compute_stage::<I, E>(
                cube,
                stage,
                BufferId::A,
                slice,
                geometry,
                accumulators,
                listener,
            );
            sync_cube(cube, listener);
        }
    }
}
