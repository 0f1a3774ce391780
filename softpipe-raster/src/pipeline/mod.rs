//! Fragment pipeline assembly and execution.
//!
//! The post-rasterizer pixel pipeline is a flat sequence of [`Stage`]s
//! rebuilt per draw from the enable set. A stage either mutates the
//! fragment and lets it continue or rejects it, ending the walk for
//! that pixel. Dynamic configuration (early depth, blend on/off) is
//! captured by which stages appear in the sequence, not by branches
//! inside them, which also makes the assembled order directly
//! inspectable.

mod stages;
mod output;

use crate::fragment::{Fragment, FragmentShader};
use crate::gradient::Gradient;
use crate::interp::Interpolator;
use crate::state::{Enables, PipelineState};
use crate::target::RawTarget;

/// One slot in the assembled fragment chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Pixel-ownership test. Pass-through for a single owned surface.
    Ownership,
    /// Scissor-rectangle rejection.
    Scissor,
    /// Stencil comparison; applies the stencil-fail op.
    Stencil,
    /// Depth comparison; applies stencil depth-fail/depth-pass ops when
    /// stencil is active, and the depth write.
    Depth,
    /// Attribute interpolation (lazy advance + perspective divide).
    Interpolate,
    /// The opaque fragment shader.
    Shade,
    /// Source/destination color blend.
    Blend,
    /// Ordered dithering of the output color.
    Dither,
    /// Framebuffer write.
    Write,
}

/// The assembled per-draw fragment chain.
#[derive(Debug, Clone)]
pub struct FragmentChain {
    stages: Vec<Stage>,
    state: PipelineState,
}

impl FragmentChain {
    /// Build the chain for the given state and shader capability.
    ///
    /// Depth moves in front of the interpolator (early depth) only when
    /// the shader cannot discard and no other kill stage is enabled: a
    /// discarded or scissored fragment must never have updated the
    /// depth buffer. A configuration that asks for early depth anyway
    /// is downgraded here, silently.
    pub fn assemble(state: &PipelineState, shader_can_discard: bool) -> Self {
        let enables = state.enables;
        let mut stages = vec![Stage::Ownership];

        if enables.contains(Enables::DEPTH_TEST) {
            let early_z = !shader_can_discard
                && !enables.contains(Enables::SCISSOR_TEST)
                && !enables.contains(Enables::STENCIL_TEST);

            if early_z {
                stages.extend([Stage::Depth, Stage::Interpolate, Stage::Shade]);
            } else {
                stages.extend([Stage::Interpolate, Stage::Shade]);
                if enables.contains(Enables::SCISSOR_TEST) {
                    stages.push(Stage::Scissor);
                }
                if enables.contains(Enables::STENCIL_TEST) {
                    stages.push(Stage::Stencil);
                }
                stages.push(Stage::Depth);
            }
        } else {
            stages.extend([Stage::Interpolate, Stage::Shade]);
        }

        if enables.contains(Enables::BLEND) {
            stages.push(Stage::Blend);
        }
        if enables.contains(Enables::DITHER) {
            stages.push(Stage::Dither);
        }
        stages.push(Stage::Write);

        Self {
            stages,
            state: *state,
        }
    }

    /// The assembled stage sequence.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run one fragment through the chain.
    pub(crate) fn run(
        &self,
        frag: &mut Fragment,
        grad: &Gradient,
        shader: &dyn FragmentShader,
        rt: &RawTarget,
    ) {
        let state = &self.state;
        let stencil_active = state.enables.contains(Enables::STENCIL_TEST);

        for stage in &self.stages {
            let keep = match stage {
                Stage::Ownership => stages::ownership_test(frag),
                Stage::Scissor => stages::scissor_test(&state.scissor, frag),
                Stage::Stencil => stages::stencil_test(&state.stencil, frag, rt),
                Stage::Depth => {
                    let stencil = stencil_active.then_some(&state.stencil);
                    stages::depth_test(&state.depth, stencil, frag, rt)
                }
                Stage::Interpolate => {
                    Interpolator::accept(frag, grad);
                    true
                }
                Stage::Shade => shader.shade(frag),
                Stage::Blend => {
                    output::blend(&state.blend, frag, rt);
                    true
                }
                Stage::Dither => {
                    output::dither(frag);
                    true
                }
                Stage::Write => {
                    output::write(frag, rt, state.write_alpha);
                    true
                }
            };
            if !keep {
                return;
            }
        }
    }
}
