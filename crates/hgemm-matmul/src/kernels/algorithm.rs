use core::marker::PhantomData;

use crate::components::{
    TileGeometry,
    batch::{CubeDistribution, GlobalOrder},
    global::{
        DirectPipeline, DoubleBufferPipeline, GlobalPipeline, PrefetchPipeline,
        SingleBufferPipeline,
        load::{CooperativeLoading, StridedLoading},
        write::{DirectWriter, OutputWriter, StagedWriter},
    },
    tile::{MmaInstruction, Wmma16x16x16},
};

/// Specifications for a block matmul algorithm
pub trait Algorithm: 'static {
    type TileMatmul: MmaInstruction;
    type GlobalPipeline: GlobalPipeline;
    type Writer: OutputWriter;

    fn geometry() -> TileGeometry;

    fn global_order() -> GlobalOrder {
        GlobalOrder::RowMajor
    }

    fn cube_distribution() -> CubeDistribution {
        CubeDistribution::FromProblem
    }
}

macro_rules! algorithm {
    (
        $(#[$meta:meta])*
        $name:ident,
        geometry: $geometry:expr,
        pipeline: $pipeline:ty,
        writer: $writer:ty
        $(, order: $order:expr, distribution: $distribution:expr)?
    ) => {
        $(#[$meta])*
        pub struct $name<TMM = Wmma16x16x16> {
            pub _tmm: PhantomData<TMM>,
        }

        impl<TMM: MmaInstruction> Algorithm for $name<TMM> {
            type TileMatmul = TMM;
            type GlobalPipeline = $pipeline;
            type Writer = $writer;

            fn geometry() -> TileGeometry {
                $geometry
            }

            $(
                fn global_order() -> GlobalOrder {
                    $order
                }

                fn cube_distribution() -> CubeDistribution {
                    $distribution
                }
            )?
        }
    };
}

algorithm!(
    /// Fragments loaded straight from global memory, one hardware tile per warp.
    NaiveAlgorithm,
    geometry: TileGeometry::new(4, 4, 1, 1, 16),
    pipeline: DirectPipeline,
    writer: DirectWriter
);

algorithm!(
    /// Operands staged in shared memory by all units.
    SharedAlgorithm,
    geometry: TileGeometry::new(8, 4, 1, 1, 64),
    pipeline: SingleBufferPipeline<StridedLoading>,
    writer: DirectWriter
);

algorithm!(
    /// Shared staging with a 2x2 grid of hardware tiles per warp.
    SharedWarpAlgorithm,
    geometry: TileGeometry::new(4, 4, 2, 2, 32),
    pipeline: SingleBufferPipeline<StridedLoading>,
    writer: DirectWriter
);

algorithm!(
    /// Warp tiling with double buffered staging.
    SharedWarpBufAlgorithm,
    geometry: TileGeometry::new(4, 4, 2, 2, 32),
    pipeline: DoubleBufferPipeline<StridedLoading>,
    writer: DirectWriter
);

algorithm!(
    /// Double buffering with cooperative vector loads of 16 elements and 4x4 warp tiles.
    SharedWarpBufVecAlgorithm,
    geometry: TileGeometry::new(4, 4, 4, 4, 32),
    pipeline: DoubleBufferPipeline<CooperativeLoading<16>>,
    writer: DirectWriter
);

algorithm!(
    /// Double buffering with cooperative vector loads of 8 elements.
    Opt1Algorithm,
    geometry: TileGeometry::new(4, 4, 4, 4, 32),
    pipeline: DoubleBufferPipeline<CooperativeLoading<8>>,
    writer: DirectWriter
);

algorithm!(
    /// Double buffering, Hilbert ordered blocks and an output re-staged through shared memory.
    Opt2Algorithm,
    geometry: TileGeometry::new(4, 4, 4, 4, 32),
    pipeline: DoubleBufferPipeline<CooperativeLoading<16>>,
    writer: StagedWriter,
    order: GlobalOrder::Hilbert,
    distribution: CubeDistribution::Flattened
);

algorithm!(
    /// Double buffering with the next slice prefetched into registers.
    PrefetchAlgorithm,
    geometry: TileGeometry::new(4, 4, 4, 4, 16),
    pipeline: PrefetchPipeline<16>,
    writer: DirectWriter
);
