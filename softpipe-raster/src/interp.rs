//! Attribute interpolation.
//!
//! Three primitive operations on register files plus the chain entry
//! point that ties them to the fragment's lazy-evaluation contract.

use glam::Vec4;

use crate::fragment::{AttrState, Fragment};
use crate::gradient::Gradient;

/// The perspective-correct interpolator.
///
/// Stateless; all state lives in the fragment payload and the
/// per-triangle [`Gradient`].
pub struct Interpolator;

impl Interpolator {
    /// Advance a register file by one pixel along a known axis:
    /// `regs[i] += grad[i]`.
    #[inline]
    pub fn advance(regs: &mut [Vec4], grad: &[Vec4]) {
        debug_assert_eq!(regs.len(), grad.len());
        for (reg, g) in regs.iter_mut().zip(grad) {
            *reg += *g;
        }
    }

    /// Evaluate at an offset from a seed:
    /// `out[i] = seed[i] + gx[i] * sx + gy[i] * sy`.
    ///
    /// Used to position a span start at its first pixel center.
    #[inline]
    pub fn eval_at(seed: &[Vec4], gx: &[Vec4], gy: &[Vec4], sx: f32, sy: f32, out: &mut [Vec4]) {
        debug_assert_eq!(seed.len(), gx.len());
        debug_assert_eq!(seed.len(), gy.len());
        debug_assert_eq!(seed.len(), out.len());
        for i in 0..seed.len() {
            out[i] = seed[i] + gx[i] * sx + gy[i] * sy;
        }
    }

    /// Convert `(attr/w, 1/w)` back to `attr`.
    ///
    /// Register 0 keeps its linear `(x, y, z)` and gets the true `w`;
    /// every other register is multiplied by it.
    #[inline]
    pub fn perspective_divide(start: &[Vec4], out: &mut [Vec4]) {
        debug_assert_eq!(start.len(), out.len());
        let w_true = 1.0 / start[0].w;
        out[0] = start[0];
        out[0].w = w_true;
        for i in 1..start.len() {
            out[i] = start[i] * w_true;
        }
    }

    /// Chain entry point: bring `frag.inputs` up to date for the current
    /// pixel.
    ///
    /// Steps the span accumulator only when the payload reports it is
    /// one pixel behind, then performs the perspective divide. Safe to
    /// re-enter: a `Ready` fragment is left untouched, so a stage placed
    /// before the interpolator may force evaluation without the normal
    /// path double-stepping.
    #[inline]
    pub fn accept(frag: &mut Fragment, grad: &Gradient) {
        match frag.attrs {
            AttrState::Ready => return,
            AttrState::Stale => Self::advance(&mut frag.start, &grad.dx),
            AttrState::Seeded => {}
        }
        Self::perspective_divide(&frag.start, &mut frag.inputs);
        frag.attrs = AttrState::Ready;
    }
}
