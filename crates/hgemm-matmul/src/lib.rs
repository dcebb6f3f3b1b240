//! Tiled half precision matrix multiplication on the HGEMM runtime.
//!
//! A launch splits the output in block tiles, one per cube. Each cube streams k slices of both
//! operands through shared memory, lets its warps multiply hardware tiles of 16x16x16 into
//! register accumulators, then writes the block tile back.

#[macro_use]
extern crate derive_new;

/// Components for matrix multiplication
pub mod components;
/// Kernel variants and their launch configuration
pub mod kernels;
/// Plain CPU product used as ground truth
pub mod reference;
/// Comparison of device results with the ground truth
pub mod verification;

mod base;

/// Tests for the matmul kernels
#[cfg(any(test, feature = "export_tests"))]
pub mod tests;

pub use base::*;
