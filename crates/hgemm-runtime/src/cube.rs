use core::ops::Range;

/// Number of lanes in a plane (wavefront) on the simulated device.
pub const PLANE_DIM: u32 = 32;

/// Number of units in a cube along each axis.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[allow(missing_docs)]
pub struct CubeDim {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl CubeDim {
    /// A one dimensional cube of `x` units.
    pub const fn new_1d(x: u32) -> Self {
        Self { x, y: 1, z: 1 }
    }

    /// A two dimensional cube of `x * y` units.
    pub const fn new_2d(x: u32, y: u32) -> Self {
        Self { x, y, z: 1 }
    }

    /// Total number of units in the cube.
    pub const fn num_elems(&self) -> u32 {
        self.x * self.y * self.z
    }
}

impl Default for CubeDim {
    fn default() -> Self {
        Self::new_1d(PLANE_DIM)
    }
}

/// Number of cubes dispatched along each axis.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub struct CubeCount {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl CubeCount {
    /// Total number of cubes.
    pub const fn num_cubes(&self) -> u32 {
        self.x * self.y * self.z
    }

    /// Position of the cube with the given absolute index.
    ///
    /// The absolute index follows `x + y * count_x + z * count_x * count_y`.
    pub fn position(&self, absolute: u32) -> CubePosition {
        let x = absolute % self.x;
        let y = (absolute / self.x) % self.y;
        let z = absolute / (self.x * self.y);

        CubePosition { x, y, z, absolute }
    }
}

/// Position of a cube in the dispatched grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub struct CubePosition {
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub absolute: u32,
}

/// Execution context of one cube.
///
/// Units of a cube run phase by phase: every unit completes the current phase before
/// [sync_cube](Cube::sync_cube) opens the next one. The barrier epoch counts how many phases
/// have been closed so far.
#[derive(Debug)]
pub struct Cube {
    position: CubePosition,
    dim: CubeDim,
    plane_dim: u32,
    epoch: u32,
}

impl Cube {
    /// Context for the cube at `position`, with no barrier crossed yet.
    pub fn new(position: CubePosition, dim: CubeDim, plane_dim: u32) -> Self {
        Self {
            position,
            dim,
            plane_dim,
            epoch: 0,
        }
    }

    /// Position of this cube in the grid.
    pub fn position(&self) -> CubePosition {
        self.position
    }

    /// Number of lanes per plane.
    pub fn plane_dim(&self) -> u32 {
        self.plane_dim
    }

    /// Number of units in the cube.
    pub fn num_units(&self) -> u32 {
        self.dim.num_elems()
    }

    /// Number of planes in the cube.
    pub fn num_planes(&self) -> u32 {
        self.num_units().div_ceil(self.plane_dim)
    }

    /// Linear unit indices, in the order a phase visits them.
    pub fn units(&self) -> Range<u32> {
        0..self.num_units()
    }

    /// Plane indices.
    pub fn planes(&self) -> Range<u32> {
        0..self.num_planes()
    }

    /// Cube-wide barrier: closes the current phase.
    pub fn sync_cube(&mut self) {
        self.epoch += 1;
    }

    /// Number of barriers crossed since the cube started.
    pub fn epoch(&self) -> u32 {
        self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_roundtrips_absolute_index() {
        let count = CubeCount::new(3, 4, 2);

        for absolute in 0..count.num_cubes() {
            let pos = count.position(absolute);
            assert_eq!(pos.x + pos.y * count.x + pos.z * count.x * count.y, absolute);
            assert!(pos.x < 3 && pos.y < 4 && pos.z < 2);
        }
    }

    #[test]
    fn units_are_grouped_in_planes() {
        let cube = Cube::new(
            CubeCount::new(1, 1, 1).position(0),
            CubeDim::new_2d(32, 4),
            PLANE_DIM,
        );

        assert_eq!(cube.num_units(), 128);
        assert_eq!(cube.num_planes(), 4);
        assert_eq!(cube.planes(), 0..4);
        assert_eq!(cube.units().len(), 128);
    }

    #[test]
    fn sync_cube_advances_epoch() {
        let count = CubeCount::new(1, 1, 1);
        let mut cube = Cube::new(count.position(0), CubeDim::default(), PLANE_DIM);

        assert_eq!(cube.epoch(), 0);
        cube.sync_cube();
        cube.sync_cube();
        assert_eq!(cube.epoch(), 2);
    }
}
