use half::f16;
use hgemm_runtime::tensor::{Matrix, MatrixLayout};

/// Triple loop `lhs @ rhs` accumulating in f32, rounded to f16 once per element.
///
/// Operands may have any layout; the result is row-major.
///
/// # Panics
///
/// When the inner dimensions differ.
pub fn matmul_cpu(lhs: &Matrix, rhs: &Matrix) -> Matrix {
    let [m, k] = lhs.shape();
    let [rhs_k, n] = rhs.shape();
    assert_eq!(k, rhs_k, "Inner dimensions differ: {k} and {rhs_k}");

    Matrix::from_fn(m, n, MatrixLayout::RowMajor, |row, col| {
        let mut acc = 0.0f32;
        for i in 0..k {
            acc += lhs.get(row, i).to_f32() * rhs.get(i, col).to_f32();
        }
        f16::from_f32(acc)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_product() {
        let lhs = Matrix::from_fn(2, 3, MatrixLayout::RowMajor, |r, c| {
            f16::from_f32((r * 3 + c) as f32)
        });
        let rhs = Matrix::from_fn(3, 2, MatrixLayout::ColMajor, |r, c| {
            f16::from_f32((r + c) as f32)
        });

        let out = matmul_cpu(&lhs, &rhs);

        // [[0, 1, 2], [3, 4, 5]] @ [[0, 1], [1, 2], [2, 3]]
        assert_eq!(out.get(0, 0).to_f32(), 5.0);
        assert_eq!(out.get(0, 1).to_f32(), 8.0);
        assert_eq!(out.get(1, 0).to_f32(), 14.0);
        assert_eq!(out.get(1, 1).to_f32(), 26.0);
        assert_eq!(out.layout(), MatrixLayout::RowMajor);
    }

    #[test]
    fn empty_inner_dimension_gives_zeros() {
        let lhs = Matrix::zeros(3, 0, MatrixLayout::RowMajor);
        let rhs = Matrix::zeros(0, 4, MatrixLayout::RowMajor);

        let out = matmul_cpu(&lhs, &rhs);

        assert_eq!(out.shape(), [3, 4]);
        assert!(out.as_slice().iter().all(|v| *v == f16::ZERO));
    }
}
