//! Loaders copy one k slice of both operands from global memory to a staging slot.
//!
//! - **Strided**: every unit loads both operands, one element at a time.
//! - **Cooperative**: half of the units load the lhs while the other half loads the rhs,
//!   with vector reads of `W` elements where possible.
//!
//! Elements outside the operands are staged as zero. Loaders never synchronize: the pipeline
//! places the barriers.

mod base;
mod cooperative;
mod strided;

pub use base::*;
pub use cooperative::*;
pub use strided::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{
        MatrixLayout, StageIdent, TileGeometry,
        global::memory::{BlockInputs, TensorReader},
        stage::{BufferId, StageLayout, StageMemory},
    };
    use half::f16;
    use hgemm_runtime::{
        client::ComputeClient,
        config::GlobalConfig,
        cube::{Cube, CubeCount, PLANE_DIM},
        tensor::{Matrix, TensorHandle},
    };
    use std::sync::Arc;

    fn client() -> ComputeClient {
        let mut config = GlobalConfig::default();
        config.scheduler.workers = 1;
        ComputeClient::from_config(Arc::new(config))
    }

    fn operand(client: &ComputeClient, rows: usize, cols: usize, layout: MatrixLayout) -> TensorHandle {
        let matrix = Matrix::from_fn(rows, cols, layout, |row, col| {
            f16::from_f32(1.0 + (row * cols + col) as f32 / 8.0)
        });
        client.create(&matrix)
    }

    fn cube(geometry: &TileGeometry) -> Cube {
        let count = CubeCount::new(1, 1, 1);
        Cube::new(count.position(0), geometry.cube_dim(PLANE_DIM), PLANE_DIM)
    }

    fn load<L: LoadingStrategy>(
        lhs: &TensorHandle,
        rhs: &TensorHandle,
        geometry: &TileGeometry,
        row: usize,
        col: usize,
        k_offset: usize,
    ) -> StageMemory {
        let inputs = BlockInputs {
            lhs: TensorReader::new(lhs),
            rhs: TensorReader::new(rhs),
            row,
            col,
        };
        let mut stage = StageMemory::new(StageLayout::new(geometry, 2));
        L::fill_stage(&cube(geometry), &inputs, k_offset, geometry, &mut stage, BufferId::B);
        stage
    }

    fn assert_staged(
        stage: &StageMemory,
        lhs: &TensorHandle,
        rhs: &TensorHandle,
        geometry: &TileGeometry,
        (row, col, k_offset): (usize, usize, usize),
    ) {
        let (lhs_reader, rhs_reader) = (TensorReader::new(lhs), TensorReader::new(rhs));

        for k in 0..geometry.block_k {
            for m in 0..geometry.block_m {
                assert_eq!(
                    stage.read(StageIdent::Lhs, BufferId::B, m, k),
                    lhs_reader.read_checked(row + m, k_offset + k),
                    "lhs ({m}, {k})"
                );
            }
            for n in 0..geometry.block_n {
                assert_eq!(
                    stage.read(StageIdent::Rhs, BufferId::B, k, n),
                    rhs_reader.read_checked(k_offset + k, col + n),
                    "rhs ({k}, {n})"
                );
            }
        }
    }

    #[test]
    fn strided_loading_zero_fills_edges() {
        let client = client();
        let geometry = TileGeometry::new(2, 2, 1, 1, 32);
        let lhs = operand(&client, 40, 45, MatrixLayout::RowMajor);
        let rhs = operand(&client, 45, 50, MatrixLayout::ColMajor);

        let stage = load::<StridedLoading>(&lhs, &rhs, &geometry, 32, 32, 32);

        assert_staged(&stage, &lhs, &rhs, &geometry, (32, 32, 32));
        assert_eq!(stage.read(StageIdent::Lhs, BufferId::B, 8, 0), f16::ZERO);
        assert_eq!(stage.read(StageIdent::Rhs, BufferId::B, 13, 0), f16::ZERO);
    }

    #[test]
    fn cooperative_loading_with_matching_layouts() {
        let client = client();
        let geometry = TileGeometry::new(2, 2, 2, 2, 16);
        let lhs = operand(&client, 70, 20, MatrixLayout::ColMajor);
        let rhs = operand(&client, 20, 75, MatrixLayout::RowMajor);

        let stage = load::<CooperativeLoading<16>>(&lhs, &rhs, &geometry, 64, 64, 16);

        assert_staged(&stage, &lhs, &rhs, &geometry, (64, 64, 16));
    }

    #[test]
    fn cooperative_loading_with_transposed_layouts() {
        let client = client();
        let geometry = TileGeometry::new(2, 2, 2, 2, 16);
        let lhs = operand(&client, 50, 17, MatrixLayout::RowMajor);
        let rhs = operand(&client, 17, 33, MatrixLayout::ColMajor);

        let stage = load::<CooperativeLoading<8>>(&lhs, &rhs, &geometry, 0, 0, 0);

        assert_staged(&stage, &lhs, &rhs, &geometry, (0, 0, 0));
    }

    #[test]
    fn cooperative_loading_rejects_odd_unit_count() {
        let geometry = TileGeometry::new(2, 2, 1, 1, 16);

        assert!(CooperativeLoading::<16>::check(&geometry, 33).is_err());
        assert!(CooperativeLoading::<16>::check(&geometry, 128).is_ok());
    }

    #[test]
    fn cooperative_loading_rejects_lines_wider_than_the_block() {
        let geometry = TileGeometry::new(1, 1, 1, 1, 16);

        assert!(CooperativeLoading::<32>::check(&geometry, 32).is_err());
    }

    #[test]
    fn fetched_registers_hold_the_whole_slice() {
        let client = client();
        let geometry = TileGeometry::new(2, 2, 1, 1, 16);
        let lhs = operand(&client, 32, 16, MatrixLayout::ColMajor);
        let rhs = operand(&client, 16, 32, MatrixLayout::RowMajor);
        let inputs = BlockInputs {
            lhs: TensorReader::new(&lhs),
            rhs: TensorReader::new(&rhs),
            row: 0,
            col: 0,
        };

        let mut registers = LoadingRegisters::<16>::default();
        CooperativeLoading::<16>::fetch(&cube(&geometry), &inputs, 0, &geometry, &mut registers);

        assert_eq!(registers.len(), 2 * 2 * 16);
    }
}
