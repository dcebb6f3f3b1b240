use half::f16;

use crate::components::TILE_SIZE;

use super::WarpFragment;

/// Hardware matrix multiply-accumulate on 16x16x16 tiles.
///
/// Operands and accumulator follow the [WarpFragment] layouts. Implementations only promise the
/// tile shape and half precision inputs and accumulation.
pub trait MmaInstruction: Send + Sync + 'static {
    /// Computes `acc += lhs @ rhs` for one hardware tile.
    fn multiply_accumulate_tile(lhs: &WarpFragment, rhs: &WarpFragment, acc: &mut WarpFragment);
}

/// WMMA with f16 inputs and an f16 accumulator, as exposed by RDNA3.
///
/// Each product is exact in f32. The accumulator is rounded back to f16 after every
/// multiply-add, walking k in increasing order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wmma16x16x16;

impl MmaInstruction for Wmma16x16x16 {
    fn multiply_accumulate_tile(lhs: &WarpFragment, rhs: &WarpFragment, acc: &mut WarpFragment) {
        for (lane, out) in acc.lanes.iter_mut().enumerate() {
            let half = lane / TILE_SIZE;
            let b = &rhs.lanes[lane % TILE_SIZE].data;

            for i in 0..TILE_SIZE / 2 {
                let a = &lhs.lanes[2 * i + half].data;
                let mut c = out.data[2 * i];

                for k in 0..TILE_SIZE {
                    c = f16::from_f32(c.to_f32() + a[k].to_f32() * b[k].to_f32());
                }

                out.data[2 * i] = c;
            }
        }
    }
}
