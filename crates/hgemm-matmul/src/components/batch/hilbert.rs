//! Hilbert curve traversal of a grid of any shape.
//!
//! The grid is embedded in the smallest power of two square covering it. Cells outside the
//! grid are skipped, so the `i`-th cell of the traversal is the `i`-th valid cell met along the
//! curve of the square.

/// Position along the Hilbert curve of an `n x n` square to (x, y), `n` a power of two.
pub fn hilbert_d2xy(n: u32, d: u32) -> (u32, u32) {
    let (mut x, mut y) = (0, 0);
    let mut t = d;
    let mut s = 1;

    while s < n {
        let rx = 1 & (t / 2);
        let ry = 1 & (t ^ rx);

        if ry == 0 {
            if rx == 1 {
                x = s - 1 - x;
                y = s - 1 - y;
            }
            core::mem::swap(&mut x, &mut y);
        }

        x += s * rx;
        y += s * ry;
        t /= 4;
        s *= 2;
    }

    (x, y)
}

/// Cell (x, y) of the `index`-th valid cell along the Hilbert curve covering `width x height`.
///
/// `x` is in `0..width` and `y` in `0..height`. Each level of the descent counts the valid
/// cells of the four quadrants in curve order and enters the one holding `index`.
///
/// # Panics
///
/// When `index` is not smaller than `width * height`.
pub fn hilbert_index_to_cell(index: u32, width: u32, height: u32) -> (u32, u32) {
    assert!(
        index < width * height,
        "Cell {index} is outside a {width}x{height} grid"
    );

    let n = width.max(height).next_power_of_two();
    let mut remaining = index;
    let mut base = 0;
    let mut size = n;

    while size > 1 {
        let half = size / 2;
        let area = half * half;
        let mut entered = false;

        for quadrant in 0..4 {
            let start = base + quadrant * area;
            let (x, y) = hilbert_d2xy(n, start);
            let (x0, y0) = (x & !(half - 1), y & !(half - 1));

            let count = overlap(x0, half, width) * overlap(y0, half, height);
            if remaining < count {
                base = start;
                entered = true;
                break;
            }
            remaining -= count;
        }

        debug_assert!(entered, "Valid cells are all counted");
        size = half;
    }

    hilbert_d2xy(n, base)
}

/// Number of values of `start..start + len` below `bound`.
fn overlap(start: u32, len: u32, bound: u32) -> u32 {
    bound.saturating_sub(start).min(len)
}
