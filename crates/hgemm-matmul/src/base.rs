use std::sync::Arc;

use hgemm_runtime::{
    client::ComputeClient,
    config::{GlobalConfig, TypeNameFormatLevel, type_name_format},
    tensor::{Matrix, MatrixLayout, TensorHandle},
};

use crate::{
    components::{MatmulLaunchError, MatmulProblem},
    kernels::{
        Algorithm, BlockMatmulKernel, KernelVariant, MatmulConfig, NaiveAlgorithm, Opt1Algorithm,
        Opt2Algorithm, PrefetchAlgorithm, SharedAlgorithm, SharedWarpAlgorithm,
        SharedWarpBufAlgorithm, SharedWarpBufVecAlgorithm,
    },
};

/// Options of a single launch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Record the staging order of every cube and fail the launch on a hazard.
    pub trace_pipeline: bool,
}

impl LaunchOptions {
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self {
            trace_pipeline: config.pipeline.trace,
        }
    }
}

/// Launches `out = lhs @ rhs` with the given kernel variant.
///
/// M, N and K are read from the handles. Options come from the configuration of the client.
pub fn launch(
    client: &ComputeClient,
    variant: KernelVariant,
    out: &TensorHandle,
    lhs: &TensorHandle,
    rhs: &TensorHandle,
) -> Result<(), MatmulLaunchError> {
    let options = LaunchOptions::from_config(client.config());
    launch_with_options(client, variant, out, lhs, rhs, options)
}

/// Launches `out = lhs @ rhs` with the given kernel variant and options.
pub fn launch_with_options(
    client: &ComputeClient,
    variant: KernelVariant,
    out: &TensorHandle,
    lhs: &TensorHandle,
    rhs: &TensorHandle,
    options: LaunchOptions,
) -> Result<(), MatmulLaunchError> {
    match variant {
        KernelVariant::WmmaNaive => {
            launch_algorithm::<NaiveAlgorithm>(client, out, lhs, rhs, options)
        }
        KernelVariant::WmmaShared => {
            launch_algorithm::<SharedAlgorithm>(client, out, lhs, rhs, options)
        }
        KernelVariant::WmmaSharedWarp => {
            launch_algorithm::<SharedWarpAlgorithm>(client, out, lhs, rhs, options)
        }
        KernelVariant::WmmaSharedWarpBuf => {
            launch_algorithm::<SharedWarpBufAlgorithm>(client, out, lhs, rhs, options)
        }
        KernelVariant::WmmaSharedWarpBufVec => {
            launch_algorithm::<SharedWarpBufVecAlgorithm>(client, out, lhs, rhs, options)
        }
        KernelVariant::WmmaOpt1 => {
            launch_algorithm::<Opt1Algorithm>(client, out, lhs, rhs, options)
        }
        KernelVariant::WmmaOpt2 => {
            launch_algorithm::<Opt2Algorithm>(client, out, lhs, rhs, options)
        }
        KernelVariant::WmmaPrefetch => {
            launch_algorithm::<PrefetchAlgorithm>(client, out, lhs, rhs, options)
        }
    }
}

/// Launches `out = lhs @ rhs` with the given algorithm.
pub fn launch_algorithm<A: Algorithm>(
    client: &ComputeClient,
    out: &TensorHandle,
    lhs: &TensorHandle,
    rhs: &TensorHandle,
    options: LaunchOptions,
) -> Result<(), MatmulLaunchError> {
    let problem = MatmulProblem::from_handles(lhs, rhs, out)?;
    let config = MatmulConfig::setup::<A>(problem, client.properties(), options.trace_pipeline)?;

    let cube_count = config.cube_count();
    let cube_dim = config.cube_dim;
    log::debug!(
        "Launching {problem:?} on {} cubes of {} units",
        cube_count.num_cubes(),
        cube_dim.num_elems()
    );

    let kernel = BlockMatmulKernel::<A::GlobalPipeline, A::Writer, A::TileMatmul>::new(
        config,
        lhs.clone(),
        rhs.clone(),
        out.clone(),
    );
    let result = client.execute(Arc::new(kernel), cube_count, cube_dim);

    if client.pipeline_log_enabled() {
        let name = type_name_format(
            core::any::type_name::<A::GlobalPipeline>(),
            TypeNameFormatLevel::Balanced,
        );
        let status = match (&result, options.trace_pipeline) {
            (Ok(()), true) => "hazard free",
            (Ok(()), false) => "untraced",
            (Err(_), _) => "failed",
        };
        client.log_pipeline(&format!(
            "{name} | m={} n={} k={} | {status}",
            problem.m, problem.n, problem.k
        ));
    }

    result.map_err(MatmulLaunchError::from)
}

/// Computes `lhs @ rhs` on the device, into a new row-major matrix.
pub fn matmul(
    client: &ComputeClient,
    variant: KernelVariant,
    lhs: &Matrix,
    rhs: &Matrix,
) -> Result<Matrix, MatmulLaunchError> {
    let lhs = client.create(lhs);
    let rhs = client.create(rhs);
    let out = client.empty(lhs.rows(), rhs.cols(), MatrixLayout::RowMajor);

    launch(client, variant, &out, &lhs, &rhs)?;

    Ok(client.read(&out))
}
