use half::f16;
use hgemm_runtime::cube::Cube;

use crate::components::{
    FormattedConfigError, InvalidConfigError, MatrixLayout, StageIdent, TileGeometry,
    global::memory::BlockInputs,
    stage::{BufferId, StageMemory},
};

use super::{LoadingStrategy, LoadingValidation};

#[derive(Debug, Clone, Copy, Default)]
/// Splits the cube in two groups of units: the first half loads the lhs and the second half
/// loads the rhs.
///
/// Each unit moves lines of `W` elements along the contiguous axis of the staged operand:
/// down the rows for the lhs, along the columns for the rhs.
pub struct CooperativeLoading<const W: usize>;

/// A line read from global memory, with its destination in the stage.
#[derive(Debug, Clone, Copy)]
struct FetchedLine<const W: usize> {
    ident: StageIdent,
    row: usize,
    col: usize,
    values: [f16; W],
}

/// Per unit registers holding a k slice between its global read and its staging.
#[derive(Debug, Clone, Default)]
pub struct LoadingRegisters<const W: usize> {
    lines: Vec<FetchedLine<W>>,
}

impl<const W: usize> LoadingRegisters<W> {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl<const W: usize> LoadingValidation for CooperativeLoading<W> {
    fn check(geometry: &TileGeometry, num_units: u32) -> Result<(), InvalidConfigError> {
        if num_units < 2 || num_units % 2 != 0 {
            return Err(FormattedConfigError::new(move || {
                format!(
                    "Cooperative loading splits the cube in two equal groups, got {num_units} units"
                )
            }));
        }

        if W == 0 || geometry.block_m % W != 0 || geometry.block_n % W != 0 {
            let (block_m, block_n) = (geometry.block_m, geometry.block_n);
            return Err(FormattedConfigError::new(move || {
                format!("Lines of {W} elements don't divide the block tile {block_m}x{block_n}")
            }));
        }

        Ok(())
    }
}

impl<const W: usize> CooperativeLoading<W> {
    /// Reads the slice starting at `k_offset` into the registers of every unit.
    pub fn fetch(
        cube: &Cube,
        inputs: &BlockInputs<'_>,
        k_offset: usize,
        geometry: &TileGeometry,
        registers: &mut LoadingRegisters<W>,
    ) {
        let group_size = cube.num_units() as usize / 2;
        let lhs_lines_per_k = geometry.block_m / W;
        let rhs_lines_per_k = geometry.block_n / W;
        let lhs_lines = lhs_lines_per_k * geometry.block_k;
        let rhs_lines = rhs_lines_per_k * geometry.block_k;

        registers.lines.clear();

        for unit in cube.units() {
            let unit = unit as usize;

            if unit < group_size {
                for line in (unit..lhs_lines).step_by(group_size) {
                    let k = line / lhs_lines_per_k;
                    let row = (line % lhs_lines_per_k) * W;
                    let values = inputs.lhs.read_line::<W>(
                        inputs.row + row,
                        k_offset + k,
                        MatrixLayout::ColMajor,
                    );
                    registers.lines.push(FetchedLine {
                        ident: StageIdent::Lhs,
                        row,
                        col: k,
                        values,
                    });
                }
            } else {
                for line in (unit - group_size..rhs_lines).step_by(group_size) {
                    let k = line / rhs_lines_per_k;
                    let col = (line % rhs_lines_per_k) * W;
                    let values = inputs.rhs.read_line::<W>(
                        k_offset + k,
                        inputs.col + col,
                        MatrixLayout::RowMajor,
                    );
                    registers.lines.push(FetchedLine {
                        ident: StageIdent::Rhs,
                        row: k,
                        col,
                        values,
                    });
                }
            }
        }
    }

    /// Writes the registers of every unit to a staging slot.
    pub fn flush(registers: &LoadingRegisters<W>, stage: &mut StageMemory, buffer: BufferId) {
        for line in registers.lines.iter() {
            stage.write_line(line.ident, buffer, line.row, line.col, &line.values);
        }
    }
}

impl<const W: usize> LoadingStrategy for CooperativeLoading<W> {
    fn fill_stage(
        cube: &Cube,
        inputs: &BlockInputs<'_>,
        k_offset: usize,
        geometry: &TileGeometry,
        stage: &mut StageMemory,
        buffer: BufferId,
    ) {
        let mut registers = LoadingRegisters::default();
        Self::fetch(cube, inputs, k_offset, geometry, &mut registers);
        Self::flush(&registers, stage, buffer);
    }
}
