use hgemm_runtime::{
    DeviceProperties,
    cube::{CubeCount, CubeDim, PLANE_DIM},
};

use crate::components::{
    MatmulAvailabilityError, MatmulProblem, MatmulSetupError, TileGeometry,
    batch::BlockScheduler,
    global::{GlobalPipeline, write::OutputWriter},
    stage::StageLayout,
};

use super::Algorithm;

/// Size of an f16 element in shared memory.
const ELEM_SIZE: usize = 2;

/// Everything a block matmul kernel needs to know before running.
#[derive(Debug, Clone)]
pub struct MatmulConfig {
    pub problem: MatmulProblem,
    pub geometry: TileGeometry,
    pub scheduler: BlockScheduler,
    pub cube_dim: CubeDim,
    pub stage_layout: StageLayout,
    pub trace_pipeline: bool,
}

impl MatmulConfig {
    /// Validates the algorithm against the device and the problem.
    ///
    /// Checks, in order: the tile geometry, the plane dimension, the cube size, the shared
    /// memory footprint, then the constraints of the pipeline and of the writer.
    pub fn setup<A: Algorithm>(
        problem: MatmulProblem,
        properties: &DeviceProperties,
        trace_pipeline: bool,
    ) -> Result<Self, MatmulSetupError> {
        let geometry = A::geometry();
        geometry.validate().map_err(MatmulSetupError::InvalidConfig)?;

        if properties.plane_dim != PLANE_DIM {
            return Err(MatmulAvailabilityError::PlaneDimUnsupported {
                plane_dim: properties.plane_dim,
            }
            .into());
        }

        let cube_dim = geometry.cube_dim(properties.plane_dim);
        if cube_dim.num_elems() > properties.max_units_per_cube {
            return Err(MatmulAvailabilityError::CubeDimTooBig(cube_dim).into());
        }

        let num_stages = A::GlobalPipeline::NUM_STAGES;
        let requested = geometry.shared_memory_size(num_stages) * ELEM_SIZE;
        if requested > properties.max_shared_memory_size {
            return Err(MatmulAvailabilityError::SharedMemoryTooBig {
                requested,
                max: properties.max_shared_memory_size,
            }
            .into());
        }

        A::GlobalPipeline::check(&geometry, cube_dim.num_elems())
            .map_err(MatmulSetupError::InvalidConfig)?;
        A::Writer::check(&geometry, num_stages).map_err(MatmulSetupError::InvalidConfig)?;

        let (grid_m, grid_n) = geometry.grid(problem.m, problem.n);

        Ok(Self {
            problem,
            geometry,
            scheduler: BlockScheduler::new(
                grid_m,
                grid_n,
                A::global_order(),
                A::cube_distribution(),
            ),
            cube_dim,
            stage_layout: StageLayout::new(&geometry, num_stages),
            trace_pipeline,
        })
    }

    pub fn cube_count(&self) -> CubeCount {
        self.scheduler.cube_count()
    }
}
