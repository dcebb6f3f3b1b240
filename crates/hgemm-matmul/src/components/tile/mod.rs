mod fragment;
mod instruction;
mod io;

pub use fragment::*;
pub use instruction::*;
pub use io::*;
