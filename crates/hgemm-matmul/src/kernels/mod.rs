//! Kernel variants composing the components, and their launch configuration.

mod algorithm;
mod config;
mod kernel;
mod variant;

pub use algorithm::*;
pub use config::*;
pub use kernel::*;
pub use variant::*;
