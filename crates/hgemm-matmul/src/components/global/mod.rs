//! Everything between global memory and the warps: loaders filling the staging slots,
//! pipelines ordering loads and computes along k, and writers storing the accumulators.

pub mod load;
pub mod memory;
pub mod pipeline;
pub mod write;

pub use pipeline::*;
