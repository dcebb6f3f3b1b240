use crate::components::{
    TILE_SIZE, TileGeometry,
    tile::{FragmentSource, MmaInstruction, WarpFragment, fill_lhs, fill_rhs},
};

/// Accumulators of one warp: a grid of `warp_tile_m x warp_tile_n` hardware tiles.
///
/// Created zeroed when the cube starts and kept for the whole k reduction.
#[derive(Debug, Clone)]
pub struct WarpAccumulators {
    row_offset: usize,
    col_offset: usize,
    warp_tile_m: usize,
    warp_tile_n: usize,
    tiles: Vec<WarpFragment>,
}

impl WarpAccumulators {
    /// Zeroed accumulators of the given warp of the block.
    pub fn new(geometry: &TileGeometry, warp: usize) -> Self {
        let (row_offset, col_offset) = geometry.warp_offsets(warp);

        Self {
            row_offset,
            col_offset,
            warp_tile_m: geometry.warp_tile_m,
            warp_tile_n: geometry.warp_tile_n,
            tiles: vec![WarpFragment::zeros(); geometry.warp_tile_m * geometry.warp_tile_n],
        }
    }

    /// Position of the warp tile inside the block tile.
    pub fn offsets(&self) -> (usize, usize) {
        (self.row_offset, self.col_offset)
    }

    pub fn tile(&self, i: usize, j: usize) -> &WarpFragment {
        &self.tiles[i * self.warp_tile_n + j]
    }

    /// Every accumulator with the position of its first element inside the block tile.
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize, &WarpFragment)> {
        self.tiles.iter().enumerate().map(|(index, tile)| {
            let (i, j) = (index / self.warp_tile_n, index % self.warp_tile_n);
            (
                self.row_offset + i * TILE_SIZE,
                self.col_offset + j * TILE_SIZE,
                tile,
            )
        })
    }
}

/// Multiplies the operands of one k slice into the accumulators of a warp.
///
/// `source` is addressed relative to the block tile and the slice. Hardware tiles are walked
/// in increasing k; the whole lhs column and rhs row of the warp tile are loaded once per step.
pub fn warp_matmul<I: MmaInstruction, S: FragmentSource + ?Sized>(
    source: &S,
    slice_k: usize,
    acc: &mut WarpAccumulators,
) {
    let mut lhs = vec![WarpFragment::zeros(); acc.warp_tile_m];
    let mut rhs = vec![WarpFragment::zeros(); acc.warp_tile_n];

    for k in (0..slice_k).step_by(TILE_SIZE) {
        for (i, fragment) in lhs.iter_mut().enumerate() {
            fill_lhs(source, acc.row_offset + i * TILE_SIZE, k, fragment);
        }
        for (j, fragment) in rhs.iter_mut().enumerate() {
            fill_rhs(source, k, acc.col_offset + j * TILE_SIZE, fragment);
        }

        for (index, out) in acc.tiles.iter_mut().enumerate() {
            let (i, j) = (index / acc.warp_tile_n, index % acc.warp_tile_n);
            I::multiply_accumulate_tile(&lhs[i], &rhs[j], out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::tile::Wmma16x16x16;
    use half::f16;

    struct Ones;

    impl FragmentSource for Ones {
        fn lhs(&self, _row: usize, _k: usize) -> f16 {
            f16::ONE
        }

        fn rhs(&self, _k: usize, _col: usize) -> f16 {
            f16::ONE
        }
    }

    struct Coords;

    impl FragmentSource for Coords {
        fn lhs(&self, row: usize, k: usize) -> f16 {
            f16::from_f32(if k == 0 { row as f32 } else { 0.0 })
        }

        fn rhs(&self, k: usize, col: usize) -> f16 {
            f16::from_f32(if k == 0 { col as f32 } else { 0.0 })
        }
    }

    #[test]
    fn every_step_accumulates() {
        let geometry = TileGeometry::new(2, 2, 2, 1, 32);
        let mut acc = WarpAccumulators::new(&geometry, 3);

        warp_matmul::<Wmma16x16x16, _>(&Ones, geometry.block_k, &mut acc);
        warp_matmul::<Wmma16x16x16, _>(&Ones, geometry.block_k, &mut acc);

        assert_eq!(acc.offsets(), (32, 16));
        for (_, _, tile) in acc.tiles() {
            assert!(tile.accumulator_values().all(|(_, _, v)| v == f16::from_f32(64.0)));
        }
    }

    #[test]
    fn tiles_follow_warp_offsets() {
        let geometry = TileGeometry::new(2, 2, 2, 2, 16);
        let mut acc = WarpAccumulators::new(&geometry, 1);

        warp_matmul::<Wmma16x16x16, _>(&Coords, geometry.block_k, &mut acc);

        for (row, col, tile) in acc.tiles() {
            for (r, c, value) in tile.accumulator_values() {
                assert_eq!(value.to_f32(), ((row + r) * (col + c)) as f32);
            }
        }
        assert_eq!(acc.tile(1, 1).accumulator_value(0, 0).to_f32(), (16 * 48) as f32);
    }
}
