use hgemm_runtime::cube::Cube;

use crate::components::{
    InvalidConfigError, TileGeometry,
    global::memory::BlockInputs,
    stage::{
        BufferId, PipelineEvent, PipelineEventListener, StageMemory, WarpAccumulators,
        warp_matmul,
    },
    tile::MmaInstruction,
};

/// Streams the k dimension of a block tile into the warp accumulators.
pub trait GlobalPipeline: Send + Sync + 'static {
    /// Number of staging slots, zero when operands are not staged.
    const NUM_STAGES: usize;

    /// Checks the pipeline can run with a geometry and a cube size.
    fn check(geometry: &TileGeometry, num_units: u32) -> Result<(), InvalidConfigError>;

    /// Accumulates `lhs[row.., 0..k] @ rhs[0..k, col..]` into `accumulators`, one per warp.
    ///
    /// Every staging access is reported to `listener`.
    #[allow(clippy::too_many_arguments)]
    fn execute<I: MmaInstruction, E: PipelineEventListener>(
        cube: &mut Cube,
        inputs: &BlockInputs<'_>,
        k: usize,
        geometry: &TileGeometry,
        stage: &mut StageMemory,
        accumulators: &mut [WarpAccumulators],
        listener: &mut E,
    );
}

/// Number of k slices of `block_k` covering `k`.
pub fn num_slices(k: usize, geometry: &TileGeometry) -> usize {
    k.div_ceil(geometry.block_k)
}

/// Every warp consumes the slice staged in `buffer`.
pub(crate) fn compute_stage<I: MmaInstruction, E: PipelineEventListener>(
    cube: &Cube,
    stage: &StageMemory,
    buffer: BufferId,
    slice: usize,
    geometry: &TileGeometry,
    accumulators: &mut [WarpAccumulators],
    listener: &mut E,
) {
    listener.on_event(PipelineEvent::Compute {
        buffer,
        slice,
        epoch: cube.epoch(),
    });

    let reader = stage.reader(buffer);
    for acc in accumulators.iter_mut() {
        warp_matmul::<I, _>(&reader, geometry.block_k, acc);
    }
}

pub(crate) fn loaded<E: PipelineEventListener>(
    cube: &Cube,
    buffer: BufferId,
    slice: usize,
    listener: &mut E,
) {
    listener.on_event(PipelineEvent::Load {
        buffer,
        slice,
        epoch: cube.epoch(),
    });
}

pub(crate) fn sync_cube<E: PipelineEventListener>(cube: &mut Cube, listener: &mut E) {
    listener.on_event(PipelineEvent::Barrier {
        epoch: cube.epoch(),
    });
    cube.sync_cube();
}
