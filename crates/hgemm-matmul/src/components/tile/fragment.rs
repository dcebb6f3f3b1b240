use half::f16;
use hgemm_runtime::cube::PLANE_DIM;

use crate::components::TILE_SIZE;

/// Number of lanes cooperating on one hardware tile.
pub const FRAGMENT_LANES: usize = PLANE_DIM as usize;

/// Registers of one lane holding its share of a hardware tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fragment {
    pub data: [f16; TILE_SIZE],
}

impl Fragment {
    pub const fn zeros() -> Self {
        Self {
            data: [f16::ZERO; TILE_SIZE],
        }
    }
}

impl Default for Fragment {
    fn default() -> Self {
        Self::zeros()
    }
}

/// A 16x16 hardware tile spread over the lanes of a plane.
///
/// The layout depends on the role of the tile:
/// - lhs: lane `l` holds row `l % 16`, one element per k.
/// - rhs: lane `l` holds column `l % 16`, one element per k.
/// - accumulator: lane `l` holds column `l % 16`. Element `2i` stores row `2i + l / 16`,
///   odd elements are unused.
///
/// Lanes `l` and `l + 16` hold the same operand row or column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WarpFragment {
    pub lanes: [Fragment; FRAGMENT_LANES],
}

impl WarpFragment {
    pub const fn zeros() -> Self {
        Self {
            lanes: [Fragment::zeros(); FRAGMENT_LANES],
        }
    }

    /// Lane and register holding the accumulator value at (row, col) of the tile.
    pub const fn accumulator_slot(row: usize, col: usize) -> (usize, usize) {
        let half = row % 2;
        (half * TILE_SIZE + col, row - half)
    }

    /// Accumulator value at (row, col) of the tile.
    pub fn accumulator_value(&self, row: usize, col: usize) -> f16 {
        let (lane, register) = Self::accumulator_slot(row, col);
        self.lanes[lane].data[register]
    }

    /// Every accumulator value with its (row, col) in the tile, row by row.
    pub fn accumulator_values(&self) -> impl Iterator<Item = (usize, usize, f16)> + '_ {
        (0..TILE_SIZE).flat_map(move |row| {
            (0..TILE_SIZE).map(move |col| (row, col, self.accumulator_value(row, col)))
        })
    }
}

impl Default for WarpFragment {
    fn default() -> Self {
        Self::zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_slots_cover_the_tile_once() {
        let mut seen = [[false; TILE_SIZE]; FRAGMENT_LANES];

        for row in 0..TILE_SIZE {
            for col in 0..TILE_SIZE {
                let (lane, register) = WarpFragment::accumulator_slot(row, col);
                assert_eq!(register % 2, 0);
                assert_eq!(lane % TILE_SIZE, col);
                assert!(!seen[lane][register]);
                seen[lane][register] = true;
            }
        }
    }

    #[test]
    fn odd_rows_live_in_upper_half() {
        assert_eq!(WarpFragment::accumulator_slot(0, 3), (3, 0));
        assert_eq!(WarpFragment::accumulator_slot(1, 3), (19, 0));
        assert_eq!(WarpFragment::accumulator_slot(15, 15), (31, 14));
    }
}
