use hgemm_runtime::{
    cube::Cube,
    tensor::{MatrixLayout, TensorHandle},
};

use crate::components::{
    FormattedConfigError, InvalidConfigError, TILE_SIZE, TileGeometry,
    stage::{StageLayout, StageMemory, WarpAccumulators},
};

use super::OutputWriter;

#[derive(Debug, Clone, Copy, Default)]
/// Re-stages the block tile through shared memory, chunk of rows by chunk of rows.
///
/// For each chunk, warps write their accumulators to shared memory (row-major, `block_n`
/// wide), then after a barrier every unit stores lines of 16 elements to global memory.
pub struct StagedWriter;

/// Output lines stored by one unit access.
const LINE_SIZE: usize = TILE_SIZE;

impl StagedWriter {
    /// Rows of the block tile re-staged at once with `budget` elements of shared memory.
    pub fn rows_per_chunk(geometry: &TileGeometry, budget: usize) -> usize {
        match geometry.block_m * geometry.block_n > budget {
            true => budget / geometry.block_n,
            false => geometry.block_m,
        }
    }
}

impl OutputWriter for StagedWriter {
    fn check(geometry: &TileGeometry, num_stages: usize) -> Result<(), InvalidConfigError> {
        let budget = StageLayout::new(geometry, num_stages).len();
        let rows = Self::rows_per_chunk(geometry, budget);

        if rows == 0 || geometry.block_n % LINE_SIZE != 0 {
            let (block_n, geometry) = (geometry.block_n, *geometry);
            return Err(FormattedConfigError::new(move || {
                format!(
                    "Can't re-stage rows of {block_n} elements in {budget} elements of shared memory for {geometry:?}"
                )
            }));
        }

        Ok(())
    }

    fn write(
        cube: &mut Cube,
        out: &TensorHandle,
        (row, col): (usize, usize),
        geometry: &TileGeometry,
        stage: &mut StageMemory,
        accumulators: &[WarpAccumulators],
    ) {
        let block_n = geometry.block_n;
        let rows_per_chunk = Self::rows_per_chunk(geometry, stage.len());
        let lines_per_row = block_n / LINE_SIZE;
        let num_units = cube.num_units() as usize;
        let [rows, cols] = out.shape();
        let memory = out.memory();

        for chunk_start in (0..geometry.block_m).step_by(rows_per_chunk) {
            let chunk_end = (chunk_start + rows_per_chunk).min(geometry.block_m);
            let scratch = stage.scratch();

            for acc in accumulators.iter() {
                for (tile_row, tile_col, tile) in acc.tiles() {
                    if tile_row + TILE_SIZE <= chunk_start || tile_row >= chunk_end {
                        continue;
                    }

                    for (r, c, value) in tile.accumulator_values() {
                        let block_row = tile_row + r;
                        if (chunk_start..chunk_end).contains(&block_row) {
                            scratch[(block_row - chunk_start) * block_n + tile_col + c] = value;
                        }
                    }
                }
            }

            cube.sync_cube();

            let scratch = stage.scratch();
            let num_lines = (chunk_end - chunk_start) * lines_per_row;

            for unit in cube.units() {
                for line in (unit as usize..num_lines).step_by(num_units) {
                    let r = line / lines_per_row;
                    let c = (line % lines_per_row) * LINE_SIZE;
                    let (out_row, out_col) = (row + chunk_start + r, col + c);
                    if out_row >= rows {
                        continue;
                    }

                    let start = r * block_n + c;
                    let values = &scratch[start..start + LINE_SIZE];

                    if out.layout() == MatrixLayout::RowMajor && out_col + LINE_SIZE <= cols {
                        memory.write_line(out.offset(out_row, out_col), values);
                    } else {
                        for (i, value) in values.iter().enumerate() {
                            if out_col + i < cols {
                                memory.write(out.offset(out_row, out_col + i), *value);
                            }
                        }
                    }
                }
            }

            cube.sync_cube();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_tiles_are_written_in_chunks() {
        let geometry = TileGeometry::new(4, 4, 4, 4, 32);
        let budget = StageLayout::new(&geometry, 2).len();

        assert_eq!(budget, 32768);
        assert_eq!(StagedWriter::rows_per_chunk(&geometry, budget), 128);
    }

    #[test]
    fn small_tiles_are_written_at_once() {
        let geometry = TileGeometry::new(4, 4, 2, 2, 32);
        let budget = StageLayout::new(&geometry, 2).len();

        assert_eq!(StagedWriter::rows_per_chunk(&geometry, budget), geometry.block_m);
    }

    #[test]
    fn unstaged_pipelines_are_rejected() {
        let geometry = TileGeometry::new(4, 4, 1, 1, 16);

        assert!(StagedWriter::check(&geometry, 0).is_err());
        assert!(StagedWriter::check(&geometry, 1).is_ok());
    }
}
