use hgemm_runtime::cube::Cube;

use crate::components::{
    InvalidConfigError, TileGeometry,
    global::{
        load::{CooperativeLoading, LoadingRegisters, LoadingValidation},
        memory::BlockInputs,
    },
    stage::{BufferId, PipelineEventListener, StageMemory, WarpAccumulators},
    tile::MmaInstruction,
};

use super::{GlobalPipeline, compute_stage, loaded, num_slices, sync_cube};

/// Double buffering with a register stage in front of the shared one.
///
/// The next slice is read from global memory into registers before the warps compute the
/// current slice, then flushed into the other slot once the compute is issued. The barrier
/// closing the iteration makes it current.
pub struct PrefetchPipeline<const W: usize>;

impl<const W: usize> GlobalPipeline for PrefetchPipeline<W> {
    const NUM_STAGES: usize = 2;

    fn check(geometry: &TileGeometry, num_units: u32) -> Result<(), InvalidConfigError> {
        CooperativeLoading::<W>::check(geometry, num_units)
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

        let mut registers = LoadingRegisters::<W>::default();

        CooperativeLoading::<W>::fetch(cube, inputs, 0, geometry, &mut registers);
        CooperativeLoading::<W>::flush(&registers, stage, BufferId::A);
        loaded(cube, BufferId::A, 0, listener);
        sync_cube(cube, listener);

        for slice in 0..num_slices {
            let current = BufferId::from_slice(slice);
            let has_next = slice + 1 < num_slices;

            if has_next {
                let k_offset = (slice + 1) * geometry.block_k;
                CooperativeLoading::<W>::fetch(cube, inputs, k_offset, geometry, &mut registers);
            }

            compute_stage::<I, E>(cube, stage, current, slice, geometry, accumulators, listener);

            if has_next {
                let next = current.other();
                CooperativeLoading::<W>::flush(&registers, stage, next);
                loaded(cube, next, slice + 1, listener);
            }

            sync_cube(cube, listener);
        }
    }
}
