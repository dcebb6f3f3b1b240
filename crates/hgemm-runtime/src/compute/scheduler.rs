use std::fmt::Debug;
use std::sync::{Arc, mpsc};

use crate::{
    cube::{CubeCount, CubeDim},
    kernel::{CubeKernel, ExecutionError},
};

use super::{compute_task::ComputeTask, worker::Worker};

/// Spreads the cubes of a launch over a fixed pool of worker threads.
pub struct Scheduler {
    workers: Vec<Worker>,
}

impl Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", &self.workers)
    }
}

impl Scheduler {
    pub fn new(num_workers: usize) -> Self {
        let workers = (0..num_workers.max(1)).map(Worker::new).collect();

        Scheduler { workers }
    }

    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Run every cube of the launch and wait for completion.
    ///
    /// Each worker receives a contiguous range of absolute cube indices. Cubes never communicate,
    /// so the split only affects load balance.
    pub fn dispatch_execute(
        &self,
        kernel: Arc<dyn CubeKernel>,
        cube_count: CubeCount,
        cube_dim: CubeDim,
        plane_dim: u32,
    ) -> Result<(), ExecutionError> {
        let num_cubes = cube_count.num_cubes();
        if num_cubes == 0 {
            return Ok(());
        }

        let chunk_size = num_cubes.div_ceil(self.workers.len() as u32);
        let (send, receive) = mpsc::channel();
        let mut msg_count = 0;

        for (index, worker) in self.workers.iter().enumerate() {
            let start = index as u32 * chunk_size;
            if start >= num_cubes {
                break;
            }
            let end = (start + chunk_size).min(num_cubes);

            let compute_task = ComputeTask {
                kernel: kernel.clone(),
                cubes: start..end,
                cube_count,
                cube_dim,
                plane_dim,
                done: send.clone(),
            };
            msg_count += 1;

            if let Err(compute_task) = worker.send_task(compute_task) {
                log::warn!("Worker {index} is gone, running its cubes on the caller thread");
                compute_task.compute();
            }
        }
        drop(send);

        let mut result = Ok(());
        for status in receive.iter().take(msg_count) {
            // Keep the first failure, but wait for every worker before returning.
            if result.is_ok() {
                result = status;
            }
        }

        result
    }
}
