use half::f16;
use hgemm_runtime::{
    cube::Cube,
    tensor::{MatrixLayout, TensorHandle},
};

use crate::components::{
    InvalidConfigError, TILE_SIZE, TileGeometry,
    stage::{StageMemory, WarpAccumulators},
    tile::WarpFragment,
};

use super::OutputWriter;

#[derive(Debug, Clone, Copy, Default)]
/// Each warp stores its own accumulators straight from registers.
///
/// Tiles fully inside a row-major output are stored row by row with vector writes. Other tiles
/// are stored lane by lane, skipping elements outside the matrix.
pub struct DirectWriter;

impl OutputWriter for DirectWriter {
    fn check(_geometry: &TileGeometry, _num_stages: usize) -> Result<(), InvalidConfigError> {
        Ok(())
    }

    fn write(
        _cube: &mut Cube,
        out: &TensorHandle,
        (row, col): (usize, usize),
        _geometry: &TileGeometry,
        _stage: &mut StageMemory,
        accumulators: &[WarpAccumulators],
    ) {
        for acc in accumulators.iter() {
            for (tile_row, tile_col, tile) in acc.tiles() {
                write_tile(out, row + tile_row, col + tile_col, tile);
            }
        }
    }
}

fn write_tile(out: &TensorHandle, row: usize, col: usize, tile: &WarpFragment) {
    let [rows, cols] = out.shape();
    let memory = out.memory();

    if out.layout() == MatrixLayout::RowMajor && row + TILE_SIZE <= rows && col + TILE_SIZE <= cols
    {
        for r in 0..TILE_SIZE {
            let line: [f16; TILE_SIZE] = core::array::from_fn(|c| tile.accumulator_value(r, c));
            memory.write_line(out.offset(row + r, col), &line);
        }
        return;
    }

    for (lane, registers) in tile.lanes.iter().enumerate() {
        let (half, c) = (lane / TILE_SIZE, lane % TILE_SIZE);

        for i in 0..TILE_SIZE / 2 {
            let r = 2 * i + half;
            if out.contains(row + r, col + c) {
                memory.write(out.offset(row + r, col + c), registers.data[2 * i]);
            }
        }
    }
}
