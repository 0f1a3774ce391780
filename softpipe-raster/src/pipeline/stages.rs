//! Rejecting stages: ownership, scissor, stencil, depth.
//!
//! Each returns whether the fragment survives. Buffer side effects
//! (stencil ops, depth write) happen here; color side effects live in
//! `output`.

use crate::fragment::Fragment;
use crate::state::{DepthState, ScissorRect, StencilState};
use crate::target::RawTarget;

/// Pixel ownership. A single owned surface owns every pixel.
#[inline]
pub(super) fn ownership_test(_frag: &Fragment) -> bool {
    true
}

/// Reject fragments outside the scissor rectangle.
#[inline]
pub(super) fn scissor_test(rect: &ScissorRect, frag: &Fragment) -> bool {
    rect.contains(frag.x, frag.y)
}

/// Stencil comparison. On failure the stencil-fail op is applied and
/// the fragment is rejected; the depth-fail/depth-pass ops are applied
/// by the depth stage, which knows the depth outcome.
#[inline]
pub(super) fn stencil_test(state: &StencilState, frag: &Fragment, rt: &RawTarget) -> bool {
    let stored = rt.stencil(frag.index);
    if state
        .func
        .compare(state.reference & state.mask, stored & state.mask)
    {
        return true;
    }
    write_stencil(state, frag, rt, state.sfail, stored);
    false
}

/// Depth comparison on the fragment's linear `z`.
///
/// When the stencil stage ran earlier in the chain, its depth-dependent
/// ops are resolved here. The depth write only happens on pass and only
/// when enabled.
#[inline]
pub(super) fn depth_test(
    state: &DepthState,
    stencil: Option<&StencilState>,
    frag: &Fragment,
    rt: &RawTarget,
) -> bool {
    let stored = rt.depth(frag.index);
    let pass = state.func.compare(frag.z, stored);

    if let Some(st) = stencil {
        let op = if pass { st.zpass } else { st.zfail };
        write_stencil(st, frag, rt, op, rt.stencil(frag.index));
    }

    if pass && state.write {
        rt.set_depth(frag.index, frag.z);
    }
    pass
}

#[inline]
fn write_stencil(
    state: &StencilState,
    frag: &Fragment,
    rt: &RawTarget,
    op: crate::state::StencilOp,
    stored: u8,
) {
    let updated = op.apply(stored, state.reference);
    let merged = (stored & !state.write_mask) | (updated & state.write_mask);
    if merged != stored {
        rt.set_stencil(frag.index, merged);
    }
}
