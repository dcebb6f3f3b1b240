use hgemm_runtime::cube::{CubeCount, CubePosition};
use serde::{Deserialize, Serialize};

use super::hilbert_index_to_cell;

#[derive(Default, Copy, Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
/// Describes the global traversal order as flattened cube position increases.
///
/// - `RowMajor`: standard row-first traversal
/// - `ColMajor`: standard column-first traversal
/// - `Hilbert`: along a Hilbert curve, keeping consecutive cubes on neighbouring tiles
pub enum GlobalOrder {
    #[default]
    RowMajor,
    ColMajor,
    Hilbert,
}

#[derive(Default, Copy, Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
/// Shape of the launched cube grid.
pub enum CubeDistribution {
    #[default]
    /// X: num blocks in m, Y: num blocks in n. The global order is not used.
    FromProblem,

    /// X: total blocks flattened, visited in the global order.
    Flattened,
}

/// Output block tile, in block units.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub struct BlockCoord {
    pub row: usize,
    pub col: usize,
}

/// Maps every cube of a launch to a distinct output block tile.
#[derive(new, Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub struct BlockScheduler {
    pub grid_m: usize,
    pub grid_n: usize,
    pub order: GlobalOrder,
    pub distribution: CubeDistribution,
}

impl BlockScheduler {
    pub fn num_blocks(&self) -> usize {
        self.grid_m * self.grid_n
    }

    /// Cubes to launch so that each block tile gets one.
    pub fn cube_count(&self) -> CubeCount {
        match self.distribution {
            CubeDistribution::FromProblem => {
                CubeCount::new(self.grid_m as u32, self.grid_n as u32, 1)
            }
            CubeDistribution::Flattened => CubeCount::new(self.num_blocks() as u32, 1, 1),
        }
    }

    /// Block tile computed by the cube at `position`.
    pub fn block_coord(&self, position: CubePosition) -> BlockCoord {
        match self.distribution {
            CubeDistribution::FromProblem => BlockCoord {
                row: position.x as usize,
                col: position.y as usize,
            },
            CubeDistribution::Flattened => self.block_at(position.absolute as usize),
        }
    }

    /// The `index`-th block tile in the global order.
    pub fn block_at(&self, index: usize) -> BlockCoord {
        match self.order {
            GlobalOrder::RowMajor => BlockCoord {
                row: index / self.grid_n,
                col: index % self.grid_n,
            },
            GlobalOrder::ColMajor => BlockCoord {
                row: index % self.grid_m,
                col: index / self.grid_m,
            },
            GlobalOrder::Hilbert => {
                let (row, col) =
                    hilbert_index_to_cell(index as u32, self.grid_m as u32, self.grid_n as u32);
                BlockCoord {
                    row: row as usize,
                    col: col as usize,
                }
            }
        }
    }
}
