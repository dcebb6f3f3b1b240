use std::sync::Arc;

use half::f16;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::memory::GlobalMemory;

/// Storage order of a matrix.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum MatrixLayout {
    /// Elements of a row are contiguous.
    #[default]
    RowMajor,
    /// Elements of a column are contiguous.
    ColMajor,
}

impl MatrixLayout {
    /// Linear offset of `(row, col)` in a `rows x cols` matrix stored with this layout.
    #[inline]
    pub const fn offset(&self, row: usize, col: usize, rows: usize, cols: usize) -> usize {
        match self {
            MatrixLayout::RowMajor => row * cols + col,
            MatrixLayout::ColMajor => col * rows + row,
        }
    }

    /// The other layout.
    pub const fn transposed(&self) -> Self {
        match self {
            MatrixLayout::RowMajor => MatrixLayout::ColMajor,
            MatrixLayout::ColMajor => MatrixLayout::RowMajor,
        }
    }
}

/// Half precision matrix living on the host.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    data: Vec<f16>,
    rows: usize,
    cols: usize,
    layout: MatrixLayout,
}

impl Matrix {
    /// Wrap existing storage.
    ///
    /// # Panics
    ///
    /// If the storage length is not `rows * cols`.
    pub fn new(data: Vec<f16>, rows: usize, cols: usize, layout: MatrixLayout) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "Storage of {} elements can't hold a {rows}x{cols} matrix",
            data.len()
        );

        Self {
            data,
            rows,
            cols,
            layout,
        }
    }

    /// Matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize, layout: MatrixLayout) -> Self {
        Self::filled(rows, cols, layout, f16::ZERO)
    }

    /// Matrix filled with a single value.
    pub fn filled(rows: usize, cols: usize, layout: MatrixLayout, value: f16) -> Self {
        Self::new(vec![value; rows * cols], rows, cols, layout)
    }

    /// Matrix whose element `(row, col)` is `func(row, col)`.
    pub fn from_fn<F: Fn(usize, usize) -> f16>(
        rows: usize,
        cols: usize,
        layout: MatrixLayout,
        func: F,
    ) -> Self {
        let mut matrix = Self::zeros(rows, cols, layout);
        for row in 0..rows {
            for col in 0..cols {
                matrix.set(row, col, func(row, col));
            }
        }
        matrix
    }

    /// Matrix of values drawn uniformly in `[0, 1)` from a seeded generator, rounded to f16.
    pub fn random(rows: usize, cols: usize, layout: MatrixLayout, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let data = (0..rows * cols)
            .map(|_| f16::from_f32(rng.random_range(0.0..1.0)))
            .collect();

        Self::new(data, rows, cols, layout)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `[rows, cols]`.
    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.cols]
    }

    /// Storage order.
    pub fn layout(&self) -> MatrixLayout {
        self.layout
    }

    /// Raw storage, in layout order.
    pub fn as_slice(&self) -> &[f16] {
        &self.data
    }

    /// Element at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> f16 {
        self.data[self.layout.offset(row, col, self.rows, self.cols)]
    }

    /// Overwrite the element at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: f16) {
        let offset = self.layout.offset(row, col, self.rows, self.cols);
        self.data[offset] = value;
    }

    /// Same matrix stored with another layout.
    pub fn to_layout(&self, layout: MatrixLayout) -> Self {
        if layout == self.layout {
            return self.clone();
        }

        Self::from_fn(self.rows, self.cols, layout, |row, col| self.get(row, col))
    }
}

/// Handle to a matrix living in device global memory.
///
/// Cloning the handle shares the memory.
#[derive(Clone, Debug)]
pub struct TensorHandle {
    memory: Arc<GlobalMemory>,
    rows: usize,
    cols: usize,
    layout: MatrixLayout,
}

impl TensorHandle {
    pub(crate) fn new(memory: GlobalMemory, rows: usize, cols: usize, layout: MatrixLayout) -> Self {
        Self {
            memory: Arc::new(memory),
            rows,
            cols,
            layout,
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `[rows, cols]`.
    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.cols]
    }

    /// Storage order.
    pub fn layout(&self) -> MatrixLayout {
        self.layout
    }

    /// Underlying global memory.
    pub fn memory(&self) -> &GlobalMemory {
        &self.memory
    }

    /// Linear offset of `(row, col)`.
    #[inline]
    pub fn offset(&self, row: usize, col: usize) -> usize {
        self.layout.offset(row, col, self.rows, self.cols)
    }

    /// Whether `(row, col)` is inside the matrix.
    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }
}
