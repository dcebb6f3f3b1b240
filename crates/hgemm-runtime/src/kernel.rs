use core::fmt::{Debug, Display};

use crate::{
    config::{TypeNameFormatLevel, type_name_format},
    cube::{Cube, CubePosition},
};

/// Error returned by a kernel for one cube.
pub type KernelError = Box<dyn core::error::Error + Send + Sync>;

/// A kernel that can be executed cube by cube by the compute client.
///
/// `execute` is called once per cube, possibly concurrently from different workers. Everything
/// the kernel allocates inside `execute` is local to the cube.
pub trait CubeKernel: Send + Sync + 'static {
    /// Name used when logging launches.
    fn name(&self) -> String {
        type_name_format(core::any::type_name::<Self>(), TypeNameFormatLevel::Balanced)
    }

    /// Run the whole kernel for one cube.
    fn execute(&self, cube: &mut Cube) -> Result<(), KernelError>;
}

/// Failure of a kernel launch.
pub enum ExecutionError {
    /// The kernel returned an error for a cube.
    Kernel {
        /// Cube that failed.
        cube: CubePosition,
        /// Error returned by the kernel.
        source: KernelError,
    },
    /// The kernel panicked while running a cube.
    Panicked {
        /// Panic payload, when it is a string.
        message: String,
    },
}

impl Debug for ExecutionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ExecutionError::Kernel { cube, source } => {
                write!(f, "Kernel failed on cube {cube:?}: {source}")
            }
            ExecutionError::Panicked { message } => write!(f, "Kernel panicked: {message}"),
        }
    }
}

impl Display for ExecutionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl core::error::Error for ExecutionError {}
