use core::ops::{Index, IndexMut, Range};
use core::sync::atomic::{AtomicU16, AtomicU32, Ordering};

use half::f16;

/// Device global memory holding half precision values.
///
/// Cells are stored as `f16` bit patterns in relaxed atomics so that cubes running on different
/// workers can write disjoint elements of the same buffer without any lock. Relaxed accesses
/// carry no ordering: kernels only rely on every element having a single writer.
#[derive(Debug)]
pub struct GlobalMemory {
    cells: Box<[AtomicU16]>,
    writes: Option<Box<[AtomicU32]>>,
}

impl GlobalMemory {
    /// Allocate memory initialized with the given values.
    pub fn from_values(values: &[f16], track_writes: bool) -> Self {
        let bits: &[u16] = bytemuck::cast_slice(values);
        let cells = bits.iter().map(|bits| AtomicU16::new(*bits)).collect();

        Self {
            cells,
            writes: track_writes.then(|| Self::counters(values.len())),
        }
    }

    /// Allocate zeroed memory.
    pub fn zeros(len: usize, track_writes: bool) -> Self {
        Self {
            cells: (0..len).map(|_| AtomicU16::new(0)).collect(),
            writes: track_writes.then(|| Self::counters(len)),
        }
    }

    fn counters(len: usize) -> Box<[AtomicU32]> {
        (0..len).map(|_| AtomicU32::new(0)).collect()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the memory holds no element.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Read one element.
    #[inline]
    pub fn read(&self, index: usize) -> f16 {
        f16::from_bits(self.cells[index].load(Ordering::Relaxed))
    }

    /// Read `W` contiguous elements starting at `index`.
    #[inline]
    pub fn read_line<const W: usize>(&self, index: usize) -> [f16; W] {
        let cells = &self.cells[index..index + W];
        core::array::from_fn(|i| f16::from_bits(cells[i].load(Ordering::Relaxed)))
    }

    /// Write one element.
    #[inline]
    pub fn write(&self, index: usize, value: f16) {
        self.cells[index].store(value.to_bits(), Ordering::Relaxed);

        if let Some(writes) = &self.writes {
            writes[index].fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Write contiguous elements starting at `index`.
    #[inline]
    pub fn write_line(&self, index: usize, values: &[f16]) {
        for (offset, value) in values.iter().enumerate() {
            self.write(index + offset, *value);
        }
    }

    /// Copy the content back to the host.
    pub fn to_vec(&self) -> Vec<f16> {
        let bits: Vec<u16> = self
            .cells
            .iter()
            .map(|cell| cell.load(Ordering::Relaxed))
            .collect();

        bytemuck::cast_slice::<u16, f16>(&bits).to_vec()
    }

    /// Number of stores each element received, when write tracking is enabled.
    pub fn write_counts(&self) -> Option<Vec<u32>> {
        self.writes.as_ref().map(|writes| {
            writes
                .iter()
                .map(|count| count.load(Ordering::Relaxed))
                .collect()
        })
    }
}

/// Memory local to one cube, dropped when the cube retires.
#[derive(Debug, Clone)]
pub struct SharedMemory<E> {
    data: Vec<E>,
}

impl<E: Copy + Default> SharedMemory<E> {
    /// Allocate `len` elements, initialized to the default value.
    pub fn new(len: usize) -> Self {
        Self {
            data: vec![E::default(); len],
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the memory holds no element.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Mutable view over a range.
    pub fn slice_mut(&mut self, range: Range<usize>) -> &mut [E] {
        &mut self.data[range]
    }
}

impl<E> Index<usize> for SharedMemory<E> {
    type Output = E;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<E> IndexMut<usize> for SharedMemory<E> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_memory_keeps_bit_patterns() {
        let values = [f16::from_f32(1.5), f16::NEG_ZERO, f16::NAN, f16::MAX];
        let memory = GlobalMemory::from_values(&values, false);

        let read = memory.to_vec();
        for (a, b) in read.iter().zip(values.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn lines_are_contiguous() {
        let values: Vec<f16> = (0..8).map(|i| f16::from_f32(i as f32)).collect();
        let memory = GlobalMemory::from_values(&values, false);

        let line = memory.read_line::<4>(2);
        assert_eq!(line.map(f16::to_f32), [2.0, 3.0, 4.0, 5.0]);

        memory.write_line(4, &[f16::ONE; 4]);
        assert_eq!(memory.read(7), f16::ONE);
        assert_eq!(memory.read(3), f16::from_f32(3.0));
    }

    #[test]
    fn write_tracking_counts_stores() {
        let memory = GlobalMemory::zeros(4, true);
        memory.write(1, f16::ONE);
        memory.write(1, f16::ONE);
        memory.write_line(2, &[f16::ONE; 2]);

        assert_eq!(memory.write_counts(), Some(vec![0, 2, 1, 1]));
        assert_eq!(GlobalMemory::zeros(4, false).write_counts(), None);
    }

    #[test]
    #[should_panic]
    fn out_of_bounds_write_panics() {
        let memory = GlobalMemory::zeros(4, false);
        memory.write(4, f16::ONE);
    }
}
