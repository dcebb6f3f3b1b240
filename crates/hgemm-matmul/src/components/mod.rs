pub mod batch;
pub mod global;
pub mod stage;
pub mod tile;

mod error;
mod ident;
mod problem;
mod tiling;

pub use error::*;
pub use hgemm_runtime::tensor::MatrixLayout;
pub use ident::*;
pub use problem::*;
pub use tiling::*;
