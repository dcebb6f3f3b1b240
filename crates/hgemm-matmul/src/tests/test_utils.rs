use std::sync::Arc;

use half::f16;
use hgemm_runtime::{client::ComputeClient, config::GlobalConfig, tensor::Matrix};

use crate::components::{MatmulIdent, MatmulProblem};

/// Seeds of the sample operands.
pub const LHS_SEED: u64 = 1234;
pub const RHS_SEED: u64 = 5678;

/// Client with write tracking on, independent of any configuration file.
pub fn test_client() -> ComputeClient {
    test_client_with(GlobalConfig::default())
}

/// Client with write tracking on, built from `config`.
pub fn test_client_with(mut config: GlobalConfig) -> ComputeClient {
    if config.scheduler.workers == 0 {
        config.scheduler.workers = 4;
    }
    ComputeClient::from_config(Arc::new(config)).with_write_tracking(true)
}

/// Seeded operand of the problem, uniform in [0, 1).
pub fn sample(problem: &MatmulProblem, ident: MatmulIdent) -> Matrix {
    let [rows, cols] = problem.shape(ident);
    let seed = match ident {
        MatmulIdent::Lhs => LHS_SEED,
        MatmulIdent::Rhs => RHS_SEED,
        MatmulIdent::Out => 0,
    };
    Matrix::random(rows, cols, problem.layout(ident), seed)
}

/// Bit patterns of the matrix elements in row-major order.
pub fn row_major_bits(matrix: &Matrix) -> Vec<u16> {
    let row_major = matrix.to_layout(hgemm_runtime::tensor::MatrixLayout::RowMajor);
    bytemuck::cast_slice::<f16, u16>(row_major.as_slice()).to_vec()
}

/// Asserts two matrices hold the same bits at every position.
pub fn assert_bitwise_eq(actual: &Matrix, expected: &Matrix, context: &str) {
    assert_eq!(actual.shape(), expected.shape(), "{context}");

    let (actual_bits, expected_bits) = (row_major_bits(actual), row_major_bits(expected));
    if let Some(index) = actual_bits
        .iter()
        .zip(expected_bits.iter())
        .position(|(a, e)| a != e)
    {
        let cols = actual.cols();
        panic!(
            "{context}: first difference at ({}, {}): {} != {}",
            index / cols,
            index % cols,
            f16::from_bits(actual_bits[index]),
            f16::from_bits(expected_bits[index]),
        );
    }
}
