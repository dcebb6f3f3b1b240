/// Configuration of the worker pool running cubes.
#[derive(Default, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SchedulerConfig {
    /// Number of worker threads. `0` uses the available parallelism.
    #[serde(default)]
    pub workers: usize,
}

impl SchedulerConfig {
    /// Number of workers to spawn.
    pub fn num_workers(&self) -> usize {
        match self.workers {
            0 => std::thread::available_parallelism()
                .map(|count| count.get())
                .unwrap_or(1),
            workers => workers,
        }
    }
}
