#![warn(missing_docs)]

//! HGEMM runtime crate: a CPU realization of a SIMT accelerator.
//!
//! Kernels are executed cube by cube on a pool of worker threads. Inside a cube, units run
//! phase by phase, a phase being the code between two [sync_cube](cube::Cube::sync_cube) calls.

#[macro_use]
extern crate derive_new;

/// Compute client module.
pub mod client;
/// Global configuration and logging.
pub mod config;
/// Cube topology: dimensions, counts and positions.
pub mod cube;
/// Kernel abstraction executed by the compute client.
pub mod kernel;
/// Global and shared memory.
pub mod memory;
/// Host matrices and device tensor handles.
pub mod tensor;

mod compute;
mod properties;

pub use properties::*;
