use half::f16;
use hgemm_runtime::tensor::{MatrixLayout, TensorHandle};

/// Bounds checked reads of a global matrix.
///
/// Elements outside the matrix read as zero.
#[derive(Clone, Copy)]
pub struct TensorReader<'a> {
    tensor: &'a TensorHandle,
}

impl<'a> TensorReader<'a> {
    pub fn new(tensor: &'a TensorHandle) -> Self {
        Self { tensor }
    }

    pub fn shape(&self) -> [usize; 2] {
        self.tensor.shape()
    }

    #[inline]
    pub fn read_checked(&self, row: usize, col: usize) -> f16 {
        match self.tensor.contains(row, col) {
            true => self.tensor.memory().read(self.tensor.offset(row, col)),
            false => f16::ZERO,
        }
    }

    /// Reads `W` elements starting at (row, col), along rows when `axis` is column-major and
    /// along columns when it is row-major.
    ///
    /// Uses one vector read when the elements are contiguous in the tensor and all in bounds,
    /// otherwise gathers them one by one.
    #[inline]
    pub fn read_line<const W: usize>(&self, row: usize, col: usize, axis: MatrixLayout) -> [f16; W] {
        match self.try_read_vector::<W>(row, col, axis) {
            Some(line) => line,
            None => core::array::from_fn(|i| match axis {
                MatrixLayout::ColMajor => self.read_checked(row + i, col),
                MatrixLayout::RowMajor => self.read_checked(row, col + i),
            }),
        }
    }

    fn try_read_vector<const W: usize>(
        &self,
        row: usize,
        col: usize,
        axis: MatrixLayout,
    ) -> Option<[f16; W]> {
        if self.tensor.layout() != axis {
            return None;
        }

        let [rows, cols] = self.tensor.shape();
        let (end_row, end_col) = match axis {
            MatrixLayout::ColMajor => (row + W, col + 1),
            MatrixLayout::RowMajor => (row + 1, col + W),
        };
        if end_row > rows || end_col > cols {
            return None;
        }

        Some(
            self.tensor
                .memory()
                .read_line::<W>(self.tensor.offset(row, col)),
        )
    }
}

/// Global operands of the block tile computed by a cube.
#[derive(Clone, Copy)]
pub struct BlockInputs<'a> {
    pub lhs: TensorReader<'a>,
    pub rhs: TensorReader<'a>,
    /// First output row of the block.
    pub row: usize,
    /// First output column of the block.
    pub col: usize,
}
