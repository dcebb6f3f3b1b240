use crate::config::device::DeviceConfig;

/// Properties of the simulated device, checked by kernels at setup time.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct DeviceProperties {
    /// Number of lanes in a plane.
    pub plane_dim: u32,
    /// Shared memory available to one cube, in bytes.
    pub max_shared_memory_size: usize,
    /// Maximum number of units in one cube.
    pub max_units_per_cube: u32,
}

impl DeviceProperties {
    /// Properties described by the device section of the configuration.
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self {
            plane_dim: config.plane_dim,
            max_shared_memory_size: config.max_shared_memory_size,
            max_units_per_cube: config.max_units_per_cube,
        }
    }
}

impl Default for DeviceProperties {
    fn default() -> Self {
        Self::from_config(&DeviceConfig::default())
    }
}
