//! Assignment of output block tiles to cubes.

mod hilbert;
mod scheduler;

pub use hilbert::*;
pub use scheduler::*;
