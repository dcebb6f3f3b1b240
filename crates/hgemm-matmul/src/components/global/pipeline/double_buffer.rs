use core::marker::PhantomData;

use hgemm_runtime::cube::Cube;

use crate::components::{
    InvalidConfigError, TileGeometry,
    global::{load::LoadingStrategy, memory::BlockInputs},
    stage::{BufferId, PipelineEventListener, StageMemory, WarpAccumulators},
    tile::MmaInstruction,
};

use super::{GlobalPipeline, compute_stage, loaded, num_slices, sync_cube};

/// Two staging slots alternating between the slice being computed and the next one.
///
/// Slice `i` lives in slot `i % 2`. While the warps compute slice `i`, slice `i + 1` is loaded
/// into the other slot; the barrier closing the iteration makes it current.
pub struct DoubleBufferPipeline<L: LoadingStrategy> {
    _loading: PhantomData<L>,
}

impl<L: LoadingStrategy> GlobalPipeline for DoubleBufferPipeline<L> {
    const NUM_STAGES: usize = 2;

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
        let num_slices = num_slices(k, geometry);
        if num_slices == 0 {
            return;
        }

        L::fill_stage(cube, inputs, 0, geometry, stage, BufferId::A);
        loaded(cube, BufferId::A, 0, listener);
        sync_cube(cube, listener);

        for slice in 0..num_slices {
            let current = BufferId::from_slice(slice);

            compute_stage::<I, E>(cube, stage, current, slice, geometry, accumulators, listener);

            if slice + 1 < num_slices {
                let next = current.other();
                let k_offset = (slice + 1) * geometry.block_k;

                L::fill_stage(cube, inputs, k_offset, geometry, stage, next);
                loaded(cube, next, slice + 1, listener);
            }

            sync_cube(cube, listener);
        }
    }
}
