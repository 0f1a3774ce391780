//! Assembly of the fragment chain from pipeline state.

use softpipe_raster::{Enables, FragmentChain, PipelineState, Stage};

fn state(enables: Enables) -> PipelineState {
    PipelineState {
        enables,
        ..Default::default()
    }
}

#[test]
fn early_depth_requested_with_discard_shader_is_downgraded() {
    // The configuration would qualify for early depth, but the shader
    // declares discard: depth must sit after the shader.
    let chain = FragmentChain::assemble(&state(Enables::DEPTH_TEST), true);
    let stages = chain.stages();

    let shade = stages.iter().position(|s| *s == Stage::Shade).unwrap();
    let depth = stages.iter().position(|s| *s == Stage::Depth).unwrap();
    assert!(
        depth > shade,
        "discarding shader must not run after the depth write: {stages:?}"
    );
}

#[test]
fn discard_free_shader_gets_early_depth() {
    let chain = FragmentChain::assemble(&state(Enables::DEPTH_TEST), false);
    let stages = chain.stages();

    let shade = stages.iter().position(|s| *s == Stage::Shade).unwrap();
    let depth = stages.iter().position(|s| *s == Stage::Depth).unwrap();
    let interp = stages.iter().position(|s| *s == Stage::Interpolate).unwrap();
    assert!(depth < interp, "early depth precedes interpolation");
    assert!(depth < shade);
}

#[test]
fn kill_stages_appear_between_shade_and_depth() {
    let chain = FragmentChain::assemble(
        &state(Enables::DEPTH_TEST | Enables::SCISSOR_TEST | Enables::STENCIL_TEST),
        false,
    );
    let stages = chain.stages();
    let shade = stages.iter().position(|s| *s == Stage::Shade).unwrap();
    let scissor = stages.iter().position(|s| *s == Stage::Scissor).unwrap();
    let stencil = stages.iter().position(|s| *s == Stage::Stencil).unwrap();
    let depth = stages.iter().position(|s| *s == Stage::Depth).unwrap();
    assert!(shade < scissor && scissor < stencil && stencil < depth);
}

#[test]
fn write_is_always_last() {
    for enables in [
        Enables::empty(),
        Enables::DEPTH_TEST,
        Enables::DEPTH_TEST | Enables::BLEND | Enables::DITHER,
        Enables::all(),
    ] {
        for discard in [false, true] {
            let chain = FragmentChain::assemble(&state(enables), discard);
            assert_eq!(*chain.stages().last().unwrap(), Stage::Write);
        }
    }
}
