//! Writers store the warp accumulators of a block tile to the output matrix.
//!
//! Every output element inside the matrix is written exactly once; elements of the block tile
//! falling outside the matrix are skipped.

mod base;
mod direct;
mod staged;

pub use base::*;
pub use direct::*;
pub use staged::*;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use half::f16;
    use hgemm_runtime::{
        client::ComputeClient,
        config::GlobalConfig,
        cube::{Cube, CubeCount, PLANE_DIM},
        tensor::{MatrixLayout, TensorHandle},
    };

    use super::*;
    use crate::components::{
        TILE_SIZE, TileGeometry,
        stage::{StageLayout, StageMemory, WarpAccumulators, warp_matmul},
        tile::{FragmentSource, Wmma16x16x16},
    };

    const GEOMETRY: TileGeometry = TileGeometry::new(2, 2, 1, 1, TILE_SIZE);

    struct Ones;

    impl FragmentSource for Ones {
        fn lhs(&self, _row: usize, _k: usize) -> f16 {
            f16::ONE
        }

        fn rhs(&self, _k: usize, _col: usize) -> f16 {
            f16::ONE
        }
    }

    fn accumulators() -> Vec<WarpAccumulators> {
        (0..GEOMETRY.total_warps())
            .map(|warp| {
                let mut acc = WarpAccumulators::new(&GEOMETRY, warp);
                warp_matmul::<Wmma16x16x16, _>(&Ones, TILE_SIZE, &mut acc);
                acc
            })
            .collect()
    }

    /// Writes the blocks at (0, 0) and at (32, 32) of a 40x40 output.
    fn write_blocks<W: OutputWriter>(layout: MatrixLayout) -> (ComputeClient, TensorHandle) {
        let mut config = GlobalConfig::default();
        config.scheduler.workers = 1;
        let client = ComputeClient::from_config(Arc::new(config)).with_write_tracking(true);
        let out = client.empty(40, 40, layout);
        let accumulators = accumulators();

        for position in [(0, 0), (32, 32)] {
            let count = CubeCount::new(1, 1, 1);
            let mut cube = Cube::new(count.position(0), GEOMETRY.cube_dim(PLANE_DIM), PLANE_DIM);
            let mut stage = StageMemory::new(StageLayout::new(&GEOMETRY, 1));
            W::write(&mut cube, &out, position, &GEOMETRY, &mut stage, &accumulators);
        }

        (client, out)
    }

    fn assert_blocks_written<W: OutputWriter>(layout: MatrixLayout) {
        let (client, out) = write_blocks::<W>(layout);
        let result = client.read(&out);
        let counts = client.write_counts(&out).unwrap();

        for row in 0..40 {
            for col in 0..40 {
                let covered = (row < 32 && col < 32) || (row >= 32 && col >= 32);
                let expected = if covered { 16.0 } else { 0.0 };

                assert_eq!(result.get(row, col).to_f32(), expected, "({row}, {col})");
                assert_eq!(
                    counts[out.offset(row, col)],
                    covered as u32,
                    "({row}, {col})"
                );
            }
        }
    }

    #[test]
    fn direct_writer_clips_edge_blocks() {
        assert_blocks_written::<DirectWriter>(MatrixLayout::RowMajor);
        assert_blocks_written::<DirectWriter>(MatrixLayout::ColMajor);
    }

    #[test]
    fn staged_writer_clips_edge_blocks() {
        assert_blocks_written::<StagedWriter>(MatrixLayout::RowMajor);
        assert_blocks_written::<StagedWriter>(MatrixLayout::ColMajor);
    }
}
