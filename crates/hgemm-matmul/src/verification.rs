use core::fmt::{Debug, Display};

use hgemm_runtime::tensor::Matrix;

/// Relative tolerance accepted between a device result and the reference.
pub const DEFAULT_TOLERANCE: f32 = 5e-2;

/// Smallest magnitude used as the denominator of the relative difference.
const MIN_MAGNITUDE: f32 = 1e-5;

/// A device result that doesn't match the reference.
#[derive(Clone, PartialEq)]
pub enum VerificationError {
    /// The matrices don't have the same shape.
    ShapeMismatch {
        actual: [usize; 2],
        expected: [usize; 2],
    },
    /// The first element, in row-major order, further than the tolerance from the reference.
    Mismatch {
        row: usize,
        col: usize,
        actual: f32,
        expected: f32,
        rel_diff: f32,
    },
}

impl Debug for VerificationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            VerificationError::ShapeMismatch { actual, expected } => {
                write!(f, "Shape mismatch: got {actual:?}, expected {expected:?}")
            }
            VerificationError::Mismatch {
                row,
                col,
                actual,
                expected,
                rel_diff,
            } => write!(
                f,
                "Mismatch at ({row}, {col}): got {actual}, expected {expected}, relative difference {rel_diff}"
            ),
        }
    }
}

impl Display for VerificationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl core::error::Error for VerificationError {}

/// `|actual - expected| / max(|expected|, 1e-5)`
pub fn relative_difference(actual: f32, expected: f32) -> f32 {
    (actual - expected).abs() / expected.abs().max(MIN_MAGNITUDE)
}

/// Checks every element of `actual` is within `tolerance` of `expected`, relatively.
pub fn verify_results(
    actual: &Matrix,
    expected: &Matrix,
    tolerance: f32,
) -> Result<(), VerificationError> {
    if actual.shape() != expected.shape() {
        let err = VerificationError::ShapeMismatch {
            actual: actual.shape(),
            expected: expected.shape(),
        };
        log::error!("{err}");
        return Err(err);
    }

    let [rows, cols] = actual.shape();
    for row in 0..rows {
        for col in 0..cols {
            let a = actual.get(row, col).to_f32();
            let e = expected.get(row, col).to_f32();
            let rel_diff = relative_difference(a, e);

            if rel_diff.is_nan() || rel_diff > tolerance {
                let err = VerificationError::Mismatch {
                    row,
                    col,
                    actual: a,
                    expected: e,
                    rel_diff,
                };
                log::error!("{err}");
                return Err(err);
            }
        }
    }

    log::info!("Verified {rows}x{cols} elements within {tolerance}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use half::f16;
    use hgemm_runtime::tensor::MatrixLayout;

    #[test]
    fn close_values_pass() {
        let expected = Matrix::filled(4, 4, MatrixLayout::RowMajor, f16::from_f32(10.0));
        let actual = Matrix::filled(4, 4, MatrixLayout::ColMajor, f16::from_f32(10.25));

        assert_eq!(verify_results(&actual, &expected, DEFAULT_TOLERANCE), Ok(()));
    }

    #[test]
    fn first_mismatch_is_reported() {
        let expected = Matrix::filled(3, 3, MatrixLayout::RowMajor, f16::ONE);
        let mut actual = expected.clone();
        actual.set(2, 0, f16::from_f32(2.0));
        actual.set(1, 2, f16::from_f32(1.5));

        let err = verify_results(&actual, &expected, DEFAULT_TOLERANCE).unwrap_err();

        assert_eq!(
            err,
            VerificationError::Mismatch {
                row: 1,
                col: 2,
                actual: 1.5,
                expected: 1.0,
                rel_diff: 0.5
            }
        );
    }

    #[test]
    fn zero_reference_uses_floor() {
        assert_eq!(relative_difference(0.0, 0.0), 0.0);
        assert!(relative_difference(1e-3, 0.0) > DEFAULT_TOLERANCE);
    }

    #[test]
    fn nan_fails() {
        let expected = Matrix::zeros(1, 1, MatrixLayout::RowMajor);
        let actual = Matrix::filled(1, 1, MatrixLayout::RowMajor, f16::NAN);

        assert!(verify_results(&actual, &expected, DEFAULT_TOLERANCE).is_err());
    }

    #[test]
    fn shapes_must_match() {
        let expected = Matrix::zeros(2, 3, MatrixLayout::RowMajor);
        let actual = Matrix::zeros(3, 2, MatrixLayout::RowMajor);

        assert!(matches!(
            verify_results(&actual, &expected, DEFAULT_TOLERANCE),
            Err(VerificationError::ShapeMismatch { .. })
        ));
    }
}
