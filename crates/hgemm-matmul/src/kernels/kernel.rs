use core::marker::PhantomData;

use hgemm_runtime::{
    cube::Cube,
    kernel::{CubeKernel, KernelError},
    tensor::TensorHandle,
};

use crate::components::{
    global::{GlobalPipeline, memory::BlockInputs, memory::TensorReader, write::OutputWriter},
    stage::{NoEvent, PipelineTrace, StageMemory, WarpAccumulators},
    tile::MmaInstruction,
};

use super::MatmulConfig;

/// Computes one output block tile per cube: `out = lhs @ rhs`.
///
/// The pipeline fills the accumulators of every warp along k, then the writer stores them.
pub struct BlockMatmulKernel<P: GlobalPipeline, W: OutputWriter, I: MmaInstruction> {
    config: MatmulConfig,
    lhs: TensorHandle,
    rhs: TensorHandle,
    out: TensorHandle,
    _strategies: PhantomData<fn() -> (P, W, I)>,
}

impl<P: GlobalPipeline, W: OutputWriter, I: MmaInstruction> BlockMatmulKernel<P, W, I> {
    pub fn new(
        config: MatmulConfig,
        lhs: TensorHandle,
        rhs: TensorHandle,
        out: TensorHandle,
    ) -> Self {
        Self {
            config,
            lhs,
            rhs,
            out,
            _strategies: PhantomData,
        }
    }
}

impl<P: GlobalPipeline, W: OutputWriter, I: MmaInstruction> CubeKernel
    for BlockMatmulKernel<P, W, I>
{
    fn execute(&self, cube: &mut Cube) -> Result<(), KernelError> {
        let geometry = &self.config.geometry;
        let block = self.config.scheduler.block_coord(cube.position());
        let (row, col) = (block.row * geometry.block_m, block.col * geometry.block_n);

        let inputs = BlockInputs {
            lhs: TensorReader::new(&self.lhs),
            rhs: TensorReader::new(&self.rhs),
            row,
            col,
        };
        let mut stage = StageMemory::new(self.config.stage_layout.clone());
        let mut accumulators: Vec<WarpAccumulators> = cube
            .planes()
            .map(|warp| WarpAccumulators::new(geometry, warp as usize))
            .collect();
        let k = self.config.problem.k;

        if self.config.trace_pipeline {
            let mut trace = PipelineTrace::default();
            P::execute::<I, _>(
                cube,
                &inputs,
                k,
                geometry,
                &mut stage,
                &mut accumulators,
                &mut trace,
            );
            trace.validate()?;
        } else {
            P::execute::<I, _>(
                cube,
                &inputs,
                k,
                geometry,
                &mut stage,
                &mut accumulators,
                &mut NoEvent,
            );
        }

        W::write(
            cube,
            &self.out,
            (row, col),
            geometry,
            &mut stage,
            &accumulators,
        );

        Ok(())
    }
}
