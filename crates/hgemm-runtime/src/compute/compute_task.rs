use core::ops::Range;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, mpsc};

use crate::{
    cube::{Cube, CubeCount, CubeDim},
    kernel::{CubeKernel, ExecutionError},
};

/// Contiguous range of cubes executed by one worker.
pub struct ComputeTask {
    pub kernel: Arc<dyn CubeKernel>,
    pub cubes: Range<u32>,
    pub cube_count: CubeCount,
    pub cube_dim: CubeDim,
    pub plane_dim: u32,
    pub done: mpsc::Sender<Result<(), ExecutionError>>,
}

impl ComputeTask {
    pub fn compute(self) {
        let result = catch_unwind(AssertUnwindSafe(|| self.run())).unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|msg| msg.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());

            Err(ExecutionError::Panicked { message })
        });

        // The dispatcher may have stopped listening after an earlier failure.
        let _ = self.done.send(result);
    }

    fn run(&self) -> Result<(), ExecutionError> {
        for absolute in self.cubes.clone() {
            let position = self.cube_count.position(absolute);
            let mut cube = Cube::new(position, self.cube_dim, self.plane_dim);

            self.kernel
                .execute(&mut cube)
                .map_err(|source| ExecutionError::Kernel {
                    cube: position,
                    source,
                })?;
        }

        Ok(())
    }
}
