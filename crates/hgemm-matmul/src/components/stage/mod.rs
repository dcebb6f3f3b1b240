mod event_listener;
mod stage_memory;
mod warp_matmul;

pub use event_listener::*;
pub use stage_memory::*;
pub use warp_matmul::*;
