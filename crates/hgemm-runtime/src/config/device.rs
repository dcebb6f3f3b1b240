use crate::cube::PLANE_DIM;

/// Limits of the simulated device.
///
/// The defaults describe an RDNA3 compute unit: wave32, 64 KiB of LDS per workgroup and at
/// most 1024 work items per workgroup.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeviceConfig {
    /// Number of lanes in a plane.
    #[serde(default = "plane_dim_default")]
    pub plane_dim: u32,

    /// Shared memory available to one cube, in bytes.
    #[serde(default = "max_shared_memory_size_default")]
    pub max_shared_memory_size: usize,

    /// Maximum number of units in one cube.
    #[serde(default = "max_units_per_cube_default")]
    pub max_units_per_cube: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            plane_dim: plane_dim_default(),
            max_shared_memory_size: max_shared_memory_size_default(),
            max_units_per_cube: max_units_per_cube_default(),
        }
    }
}

fn plane_dim_default() -> u32 {
    PLANE_DIM
}

fn max_shared_memory_size_default() -> usize {
    64 * 1024
}

fn max_units_per_cube_default() -> u32 {
    1024
}
