//! Pipelines walk the k dimension of a block tile.
//!
//! - **Direct**: fragments are read straight from global memory.
//! - **Single buffer**: load, barrier, compute, barrier, for every k slice.
//! - **Double buffer**: the next slice is loaded in one slot while the current one is
//!   computed from the other.
//! - **Prefetch**: like double buffer, with the next slice first read into registers.

mod base;
mod direct;
mod double_buffer;
mod prefetch;
mod single_buffer;

pub use base::*;
pub use direct::*;
pub use double_buffer::*;
pub use prefetch::*;
pub use single_buffer::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{
        MatrixLayout, TileGeometry,
        global::{
            load::{CooperativeLoading, StridedLoading},
            memory::{BlockInputs, TensorReader},
        },
        stage::{
            BufferId, PipelineEvent, PipelineTrace, StageLayout, StageMemory, WarpAccumulators,
        },
        tile::Wmma16x16x16,
    };
    use hgemm_runtime::{
        client::ComputeClient,
        config::GlobalConfig,
        cube::{Cube, CubeCount, PLANE_DIM},
        tensor::Matrix,
    };
    use std::sync::Arc;

    const GEOMETRY: TileGeometry = TileGeometry::new(2, 2, 1, 1, 16);

    fn run<P: GlobalPipeline>(k: usize) -> (Vec<WarpAccumulators>, PipelineTrace) {
        let mut config = GlobalConfig::default();
        config.scheduler.workers = 1;
        let client = ComputeClient::from_config(Arc::new(config));
        let lhs = client.create(&Matrix::random(40, k, MatrixLayout::ColMajor, 3));
        let rhs = client.create(&Matrix::random(k, 40, MatrixLayout::RowMajor, 4));
        let inputs = BlockInputs {
            lhs: TensorReader::new(&lhs),
            rhs: TensorReader::new(&rhs),
            row: 32,
            col: 0,
        };

        let count = CubeCount::new(1, 1, 1);
        let mut cube = Cube::new(count.position(0), GEOMETRY.cube_dim(PLANE_DIM), PLANE_DIM);
        let mut stage = StageMemory::new(StageLayout::new(&GEOMETRY, P::NUM_STAGES));
        let mut accumulators: Vec<_> = (0..GEOMETRY.total_warps())
            .map(|warp| WarpAccumulators::new(&GEOMETRY, warp))
            .collect();
        let mut trace = PipelineTrace::default();

        P::execute::<Wmma16x16x16, _>(
            &mut cube,
            &inputs,
            k,
            &GEOMETRY,
            &mut stage,
            &mut accumulators,
            &mut trace,
        );

        (accumulators, trace)
    }

    fn assert_same(a: &[WarpAccumulators], b: &[WarpAccumulators]) {
        for (a, b) in a.iter().zip(b.iter()) {
            for ((_, _, a), (_, _, b)) in a.tiles().zip(b.tiles()) {
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn staged_pipelines_are_race_free() {
        for k in [1, 16, 17, 48, 80] {
            let (_, trace) = run::<SingleBufferPipeline<StridedLoading>>(k);
            assert_eq!(trace.validate(), Ok(()));
            assert_eq!(trace.num_computes(), k.div_ceil(16));

            let (_, trace) = run::<DoubleBufferPipeline<CooperativeLoading<16>>>(k);
            assert_eq!(trace.validate(), Ok(()));
            assert_eq!(trace.num_computes(), k.div_ceil(16));

            let (_, trace) = run::<PrefetchPipeline<8>>(k);
            assert_eq!(trace.validate(), Ok(()));
            assert_eq!(trace.num_computes(), k.div_ceil(16));
        }
    }

    #[test]
    fn double_buffer_alternates_slots() {
        let (_, trace) = run::<DoubleBufferPipeline<StridedLoading>>(64);

        let computed: Vec<_> = trace
            .events()
            .iter()
            .filter_map(|event| match event {
                PipelineEvent::Compute { buffer, .. } => Some(*buffer),
                _ => None,
            })
            .collect();

        assert_eq!(
            computed,
            [BufferId::A, BufferId::B, BufferId::A, BufferId::B]
        );
    }

    #[test]
    fn pipelines_agree_bitwise() {
        let (direct, trace) = run::<DirectPipeline>(50);
        assert!(trace.events().is_empty());

        let (single, _) = run::<SingleBufferPipeline<StridedLoading>>(50);
        let (double, _) = run::<DoubleBufferPipeline<CooperativeLoading<16>>>(50);
        let (prefetch, _) = run::<PrefetchPipeline<16>>(50);

        assert_same(&direct, &single);
        assert_same(&direct, &double);
        assert_same(&direct, &prefetch);
    }

    #[test]
    fn empty_k_does_nothing() {
        let (acc, trace) = run::<DoubleBufferPipeline<StridedLoading>>(0);

        assert!(trace.events().is_empty());
        for warp in acc.iter() {
            for (_, _, tile) in warp.tiles() {
                assert!(tile.accumulator_values().all(|(_, _, v)| v.to_f32() == 0.0));
            }
        }
    }
}
