use half::f16;
use hgemm_runtime::memory::SharedMemory;

use crate::components::{StageIdent, TileGeometry, tile::FragmentSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// One of the two staging slots of a double buffered pipeline.
pub enum BufferId {
    A,
    B,
}

impl BufferId {
    /// Slot holding the given k slice when slots alternate, starting with `A`.
    pub const fn from_slice(slice: usize) -> Self {
        match slice % 2 {
            0 => BufferId::A,
            _ => BufferId::B,
        }
    }

    pub const fn other(self) -> Self {
        match self {
            BufferId::A => BufferId::B,
            BufferId::B => BufferId::A,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            BufferId::A => 0,
            BufferId::B => 1,
        }
    }
}

/// A rectangular region of the staging memory.
///
/// Elements along the contiguous axis are adjacent; consecutive lines are `stride` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageRegion {
    pub offset: usize,
    pub stride: usize,
    pub line_len: usize,
    pub num_lines: usize,
}

impl StageRegion {
    /// One past the last element of the region.
    pub const fn end(&self) -> usize {
        match self.num_lines {
            0 => self.offset,
            lines => self.offset + (lines - 1) * self.stride + self.line_len,
        }
    }

    #[inline]
    pub fn index(&self, contiguous: usize, line: usize) -> usize {
        debug_assert!(contiguous < self.line_len && line < self.num_lines);
        self.offset + line * self.stride + contiguous
    }
}

/// Placement of the staged operands in shared memory.
///
/// The lhs is staged column-major (one line per k, `block_m` long) and the rhs row-major (one
/// line per k, `block_n` long). Stages follow each other: `[lhs A | rhs A | lhs B | rhs B]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageLayout {
    lhs: Vec<StageRegion>,
    rhs: Vec<StageRegion>,
    len: usize,
}

impl StageLayout {
    /// Layout holding `num_stages` (at most two) copies of both operands of a k slice.
    pub fn new(geometry: &TileGeometry, num_stages: usize) -> Self {
        assert!(num_stages <= 2, "At most two stages are supported, got {num_stages}");

        let lhs_size = geometry.block_m * geometry.block_k;
        let rhs_size = geometry.block_k * geometry.block_n;
        let stage_size = lhs_size + rhs_size;

        let lhs = (0..num_stages)
            .map(|stage| StageRegion {
                offset: stage * stage_size,
                stride: geometry.lds_stride_lhs(),
                line_len: geometry.block_m,
                num_lines: geometry.block_k,
            })
            .collect();
        let rhs = (0..num_stages)
            .map(|stage| StageRegion {
                offset: stage * stage_size + lhs_size,
                stride: geometry.lds_stride_rhs(),
                line_len: geometry.block_n,
                num_lines: geometry.block_k,
            })
            .collect();

        Self::from_regions(num_stages * stage_size, lhs, rhs)
    }

    /// Layout from explicit regions.
    ///
    /// # Panics
    ///
    /// When a region doesn't fit in `len` elements, when a line is longer than its stride, or
    /// when two regions overlap.
    pub fn from_regions(len: usize, lhs: Vec<StageRegion>, rhs: Vec<StageRegion>) -> Self {
        assert_eq!(lhs.len(), rhs.len(), "Each stage needs both operands");

        let mut spans: Vec<(usize, usize)> = Vec::with_capacity(lhs.len() * 2);
        for region in lhs.iter().chain(rhs.iter()) {
            assert!(
                region.num_lines <= 1 || region.line_len <= region.stride,
                "Stage lines overlap: {region:?}"
            );
            assert!(
                region.end() <= len,
                "Stage region {region:?} exceeds the {len} staged elements"
            );
            spans.push((region.offset, region.end()));
        }

        spans.sort_unstable();
        for pair in spans.windows(2) {
            assert!(pair[0].1 <= pair[1].0, "Stage regions overlap: {spans:?}");
        }

        Self { lhs, rhs, len }
    }

    /// Number of staged elements, every stage included.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn num_stages(&self) -> usize {
        self.lhs.len()
    }

    /// Region of the operand in the given slot.
    pub fn region(&self, ident: StageIdent, buffer: BufferId) -> &StageRegion {
        match ident {
            StageIdent::Lhs => &self.lhs[buffer.index()],
            StageIdent::Rhs => &self.rhs[buffer.index()],
        }
    }
}

/// Shared memory of one cube organized by a [StageLayout].
///
/// Operand coordinates are relative to the block tile and the k slice: lhs elements are
/// addressed by (row, k) and rhs elements by (k, col).
pub struct StageMemory {
    layout: StageLayout,
    smem: SharedMemory<f16>,
}

impl StageMemory {
    pub fn new(layout: StageLayout) -> Self {
        let smem = SharedMemory::new(layout.len());
        Self { layout, smem }
    }

    pub fn layout(&self) -> &StageLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.smem.len()
    }

    pub fn is_empty(&self) -> bool {
        self.smem.is_empty()
    }

    #[inline]
    fn index(&self, ident: StageIdent, buffer: BufferId, row: usize, col: usize) -> usize {
        let region = self.layout.region(ident, buffer);
        match ident {
            StageIdent::Lhs => region.index(row, col),
            _ => region.index(col, row),
        }
    }

    #[inline]
    pub fn read(&self, ident: StageIdent, buffer: BufferId, row: usize, col: usize) -> f16 {
        self.smem[self.index(ident, buffer, row, col)]
    }

    #[inline]
    pub fn write(&mut self, ident: StageIdent, buffer: BufferId, row: usize, col: usize, value: f16) {
        let index = self.index(ident, buffer, row, col);
        self.smem[index] = value;
    }

    /// Writes values along the contiguous axis of the operand, starting at (row, col).
    ///
    /// Along rows for the lhs, along columns for the rhs.
    pub fn write_line(
        &mut self,
        ident: StageIdent,
        buffer: BufferId,
        row: usize,
        col: usize,
        values: &[f16],
    ) {
        let start = self.index(ident, buffer, row, col);
        let region = self.layout.region(ident, buffer);
        let contiguous = match ident {
            StageIdent::Lhs => row,
            StageIdent::Rhs => col,
        };
        assert!(
            contiguous + values.len() <= region.line_len,
            "Line of {} elements overflows the staged line",
            values.len()
        );

        self.smem
            .slice_mut(start..start + values.len())
            .copy_from_slice(values);
    }

    /// Fragment source over the operands staged in `buffer`.
    pub fn reader(&self, buffer: BufferId) -> StageReader<'_> {
        StageReader {
            stage: self,
            buffer,
        }
    }

    /// The whole shared memory, once no staged operand is needed anymore.
    pub fn scratch(&mut self) -> &mut [f16] {
        let len = self.smem.len();
        self.smem.slice_mut(0..len)
    }
}

/// Reads hardware tile operands from one staging slot.
pub struct StageReader<'a> {
    stage: &'a StageMemory,
    buffer: BufferId,
}

impl FragmentSource for StageReader<'_> {
    fn lhs(&self, row: usize, k: usize) -> f16 {
        self.stage.read(StageIdent::Lhs, self.buffer, row, k)
    }

    fn rhs(&self, k: usize, col: usize) -> f16 {
        self.stage.read(StageIdent::Rhs, self.buffer, k, col)
    }
}
