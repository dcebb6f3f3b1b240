use hgemm_runtime::{cube::CubeDim, kernel::ExecutionError};
use std::fmt::{Debug, Display};

use crate::components::stage::PipelineHazard;

/// Errors that can occur during the setup phase of a matmul operation.
pub enum MatmulSetupError {
    /// A required hardware or runtime feature is not available.
    Unavailable(MatmulAvailabilityError),

    /// The provided configuration is invalid or rejected by a component.
    InvalidConfig(InvalidConfigError),

    /// The operands don't describe a valid matmul.
    InvalidProblem(InvalidConfigError),
}

/// A specific feature required for matmul is not available on the device.
pub enum MatmulAvailabilityError {
    /// The requested cube dimensions are too large for the device.
    CubeDimTooBig(CubeDim),

    /// The staging memory of the tile geometry doesn't fit in shared memory.
    SharedMemoryTooBig { requested: usize, max: usize },

    /// The requested plane dimension is not supported.
    PlaneDimUnsupported { plane_dim: u32 },
}

impl From<MatmulAvailabilityError> for MatmulSetupError {
    fn from(value: MatmulAvailabilityError) -> Self {
        Self::Unavailable(value)
    }
}

impl Display for MatmulSetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Debug for MatmulSetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatmulSetupError::Unavailable(err) => {
                writeln!(
                    f,
                    "Unable to launch matmul because a required feature is unavailable: {err:?}"
                )
            }
            MatmulSetupError::InvalidConfig(err) => {
                writeln!(
                    f,
                    "Unable to launch matmul because the config is invalid: {:?}",
                    err.to_string()
                )
            }
            MatmulSetupError::InvalidProblem(err) => {
                writeln!(
                    f,
                    "Unable to launch matmul because the problem is invalid: {:?}",
                    err.to_string()
                )
            }
        }
    }
}

impl Debug for MatmulAvailabilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatmulAvailabilityError::CubeDimTooBig(dim) => {
                writeln!(f, "Cube dim too big {dim:?}")
            }
            MatmulAvailabilityError::SharedMemoryTooBig { requested, max } => {
                writeln!(
                    f,
                    "Shared memory too big: {requested} bytes requested, {max} bytes available."
                )
            }
            MatmulAvailabilityError::PlaneDimUnsupported { plane_dim } => {
                writeln!(
                    f,
                    "Plane dimension unsupported: {plane_dim}. Only 32 is supported."
                )
            }
        }
    }
}

/// Errors that can occur when launching a matmul.
pub enum MatmulLaunchError {
    /// The launch was rejected before any cube ran.
    Setup(MatmulSetupError),

    /// A traced launch observed a staging order that reads or overwrites a buffer too early.
    PipelineHazard(PipelineHazard),

    /// The device failed while running the kernel.
    Execution(ExecutionError),
}

impl From<MatmulSetupError> for MatmulLaunchError {
    fn from(value: MatmulSetupError) -> Self {
        Self::Setup(value)
    }
}

impl From<MatmulAvailabilityError> for MatmulLaunchError {
    fn from(value: MatmulAvailabilityError) -> Self {
        Self::Setup(value.into())
    }
}

impl From<ExecutionError> for MatmulLaunchError {
    fn from(value: ExecutionError) -> Self {
        match value {
            ExecutionError::Kernel { cube, source } => match source.downcast::<PipelineHazard>() {
                Ok(hazard) => {
                    log::debug!("Pipeline hazard on cube {cube:?}");
                    Self::PipelineHazard(*hazard)
                }
                Err(source) => Self::Execution(ExecutionError::Kernel { cube, source }),
            },
            other => Self::Execution(other),
        }
    }
}

impl Display for MatmulLaunchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Debug for MatmulLaunchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatmulLaunchError::Setup(err) => write!(f, "{err:?}"),
            MatmulLaunchError::PipelineHazard(hazard) => {
                writeln!(f, "Matmul pipeline hazard: {hazard}")
            }
            MatmulLaunchError::Execution(err) => writeln!(f, "Matmul execution failed: {err}"),
        }
    }
}

/// Error that araises from invalid configurations
pub type InvalidConfigError = Box<dyn Display + Send + Sync>;

/// Error that araises from invalid configurations
pub struct FormattedConfigError {
    func: Box<dyn Fn() -> String + Send + Sync>,
}

impl FormattedConfigError {
    #[allow(clippy::new_ret_no_self)]
    pub fn new<F: Fn() -> String + Send + Sync + 'static>(func: F) -> InvalidConfigError {
        Box::new(Self {
            func: Box::new(func),
        })
    }
}

impl Display for FormattedConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let string = (self.func)();
        write!(f, "{string}")
    }
}
