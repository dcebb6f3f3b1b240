/// Device config module.
pub mod device;
/// Pipeline config module.
pub mod pipeline;
/// Profiling config module.
pub mod profiling;
/// Scheduler config module.
pub mod scheduler;

mod base;
mod logger;

pub use base::*;
pub use logger::*;
