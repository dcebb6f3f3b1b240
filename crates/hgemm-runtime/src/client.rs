use core::fmt::Display;
use std::sync::Arc;
use std::time::Instant;

use crate::{
    DeviceProperties,
    compute::Scheduler,
    config::{GlobalConfig, LogLevel, Logger, profiling::ProfilingLogLevel},
    cube::{CubeCount, CubeDim},
    kernel::{CubeKernel, ExecutionError},
    memory::GlobalMemory,
    tensor::{Matrix, MatrixLayout, TensorHandle},
};

/// Entry point to the simulated device: allocates global memory and executes kernels.
///
/// Cloning the client is cheap; clones share the worker pool and the logger.
#[derive(Clone, Debug)]
pub struct ComputeClient {
    scheduler: Arc<Scheduler>,
    properties: Arc<DeviceProperties>,
    logger: Arc<spin::Mutex<Logger>>,
    config: Arc<GlobalConfig>,
    track_writes: bool,
}

impl Default for ComputeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeClient {
    /// Client configured from the global configuration.
    pub fn new() -> Self {
        Self::from_config(GlobalConfig::get())
    }

    /// Client configured from the given configuration.
    pub fn from_config(config: Arc<GlobalConfig>) -> Self {
        let scheduler = Scheduler::new(config.scheduler.num_workers());
        log::debug!("Compute client started with {} workers", scheduler.num_workers());

        Self {
            scheduler: Arc::new(scheduler),
            properties: Arc::new(DeviceProperties::from_config(&config.device)),
            logger: Arc::new(spin::Mutex::new(Logger::from_config(&config))),
            config,
            track_writes: false,
        }
    }

    /// Count stores per element on every buffer allocated by this client from now on.
    pub fn with_write_tracking(mut self, enabled: bool) -> Self {
        self.track_writes = enabled;
        self
    }

    /// Properties of the device.
    pub fn properties(&self) -> &DeviceProperties {
        &self.properties
    }

    /// Configuration the client was created with.
    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// Upload a host matrix to global memory.
    pub fn create(&self, matrix: &Matrix) -> TensorHandle {
        TensorHandle::new(
            GlobalMemory::from_values(matrix.as_slice(), self.track_writes),
            matrix.rows(),
            matrix.cols(),
            matrix.layout(),
        )
    }

    /// Allocate a zeroed matrix in global memory.
    pub fn empty(&self, rows: usize, cols: usize, layout: MatrixLayout) -> TensorHandle {
        TensorHandle::new(
            GlobalMemory::zeros(rows * cols, self.track_writes),
            rows,
            cols,
            layout,
        )
    }

    /// Download a matrix from global memory.
    pub fn read(&self, handle: &TensorHandle) -> Matrix {
        Matrix::new(
            handle.memory().to_vec(),
            handle.rows(),
            handle.cols(),
            handle.layout(),
        )
    }

    /// Number of stores each element of the handle received, in storage order.
    ///
    /// Returns `None` when the handle was allocated without write tracking.
    pub fn write_counts(&self, handle: &TensorHandle) -> Option<Vec<u32>> {
        handle.memory().write_counts()
    }

    /// Execute a kernel over `cube_count` cubes of `cube_dim` units and wait for completion.
    pub fn execute(
        &self,
        kernel: Arc<dyn CubeKernel>,
        cube_count: CubeCount,
        cube_dim: CubeDim,
    ) -> Result<(), ExecutionError> {
        let level = self.config.profiling.logger.level;
        let start = Instant::now();

        let name = level.enabled().then(|| kernel.name());

        let result = self.scheduler.dispatch_execute(
            kernel,
            cube_count,
            cube_dim,
            self.properties.plane_dim,
        );

        if let Some(name) = name {
            let elapsed = start.elapsed();
            let msg = match level {
                ProfilingLogLevel::Full => format!(
                    "{name} | cube_count={cube_count:?} cube_dim={cube_dim:?} | {elapsed:?}"
                ),
                _ => format!("{name} | {elapsed:?}"),
            };
            self.logger.lock().log_profiling(&msg);
        }

        result
    }

    /// Whether pipeline messages are recorded anywhere.
    pub fn pipeline_log_enabled(&self) -> bool {
        self.config.pipeline.logger.level.enabled()
    }

    /// Log a message to the pipeline loggers.
    pub fn log_pipeline<S: Display>(&self, msg: &S) {
        self.logger.lock().log_pipeline(msg);
    }
}
