use hgemm_runtime::cube::CubeDim;

use super::{FormattedConfigError, InvalidConfigError, MatmulIdent};

/// Size of the hardware MMA tile along every axis.
pub const TILE_SIZE: usize = 16;

/// Hierarchy of tiles used by a kernel: block tile, warp grid and warp tile.
///
/// Every size is in elements, except for `warps_*` (number of warps along an axis) and
/// `warp_tile_*` (number of hardware tiles each warp owns along an axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileGeometry {
    pub block_m: usize,
    pub block_n: usize,
    pub block_k: usize,
    pub warps_m: usize,
    pub warps_n: usize,
    pub warp_tile_m: usize,
    pub warp_tile_n: usize,
}

impl TileGeometry {
    /// Geometry of `warps_m x warps_n` warps each owning `warp_tile_m x warp_tile_n`
    /// hardware tiles, consuming K by slices of `block_k`.
    pub const fn new(
        warps_m: usize,
        warps_n: usize,
        warp_tile_m: usize,
        warp_tile_n: usize,
        block_k: usize,
    ) -> Self {
        Self {
            block_m: warps_m * warp_tile_m * TILE_SIZE,
            block_n: warps_n * warp_tile_n * TILE_SIZE,
            block_k,
            warps_m,
            warps_n,
            warp_tile_m,
            warp_tile_n,
        }
    }

    pub const fn total_warps(&self) -> usize {
        self.warps_m * self.warps_n
    }

    /// Units in a cube: one plane per warp.
    pub fn cube_dim(&self, plane_dim: u32) -> CubeDim {
        CubeDim::new_2d(plane_dim, self.total_warps() as u32)
    }

    /// Elements between two consecutive k of the staged lhs, stored column-major.
    pub const fn lds_stride_lhs(&self) -> usize {
        self.block_m
    }

    /// Elements between two consecutive k of the staged rhs, stored row-major.
    pub const fn lds_stride_rhs(&self) -> usize {
        self.block_n
    }

    /// Number of elements of one staged operand slice.
    pub const fn stage_size(&self, ident: MatmulIdent) -> usize {
        match ident {
            MatmulIdent::Lhs => self.block_m * self.block_k,
            MatmulIdent::Rhs => self.block_k * self.block_n,
            MatmulIdent::Out => self.block_m * self.block_n,
        }
    }

    /// Elements of shared memory for `num_stages` copies of both staged operands.
    pub const fn shared_memory_size(&self, num_stages: usize) -> usize {
        num_stages * (self.stage_size(MatmulIdent::Lhs) + self.stage_size(MatmulIdent::Rhs))
    }

    /// Number of block tiles along m and n covering an `m x n` output.
    pub const fn grid(&self, m: usize, n: usize) -> (usize, usize) {
        (m.div_ceil(self.block_m), n.div_ceil(self.block_n))
    }

    /// Offsets (row, col) of the warp's tile inside the block tile.
    pub const fn warp_offsets(&self, warp: usize) -> (usize, usize) {
        let warp_row = warp / self.warps_n;
        let warp_col = warp % self.warps_n;

        (
            warp_row * self.warp_tile_m * TILE_SIZE,
            warp_col * self.warp_tile_n * TILE_SIZE,
        )
    }

    /// Checks the geometry can be consumed by hardware tiles.
    pub fn validate(&self) -> Result<(), InvalidConfigError> {
        if self.total_warps() == 0 || self.warp_tile_m == 0 || self.warp_tile_n == 0 {
            let geometry = *self;
            return Err(FormattedConfigError::new(move || {
                format!("Tile geometry has an empty warp grid: {geometry:?}")
            }));
        }

        if self.block_k == 0 || self.block_k % TILE_SIZE != 0 {
            let block_k = self.block_k;
            return Err(FormattedConfigError::new(move || {
                format!("Block k must be a positive multiple of {TILE_SIZE}, got {block_k}")
            }));
        }

        Ok(())
    }
}
