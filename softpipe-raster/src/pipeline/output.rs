//! Color-side stages: blend, dither, framebuffer write.

use glam::Vec4;

use crate::fragment::Fragment;
use crate::state::{BlendFactor, BlendState};
use crate::target::RawTarget;

/// 4x4 Bayer threshold matrix, values 0..16.
const BAYER: [[u8; 4]; 4] = [
    [0, 8, 2, 10],
    [12, 4, 14, 6],
    [3, 11, 1, 9],
    [15, 7, 13, 5],
];

/// Unpack a BGRA8888 pixel into normalized RGBA.
#[inline]
pub(crate) fn unpack_bgra(pixel: u32) -> Vec4 {
    let b = (pixel & 0xFF) as f32;
    let g = ((pixel >> 8) & 0xFF) as f32;
    let r = ((pixel >> 16) & 0xFF) as f32;
    let a = (pixel >> 24) as f32;
    Vec4::new(r, g, b, a) / 255.0
}

/// Pack clamped RGBA into a BGRA8888 pixel.
#[inline]
pub(crate) fn pack_bgra(color: Vec4) -> u32 {
    let c = color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0;
    let r = c.x.round() as u32;
    let g = c.y.round() as u32;
    let b = c.z.round() as u32;
    let a = c.w.round() as u32;
    b | (g << 8) | (r << 16) | (a << 24)
}

#[inline]
fn factor(f: BlendFactor, src: Vec4, dst: Vec4) -> Vec4 {
    match f {
        BlendFactor::Zero => Vec4::ZERO,
        BlendFactor::One => Vec4::ONE,
        BlendFactor::SrcColor => src,
        BlendFactor::OneMinusSrcColor => Vec4::ONE - src,
        BlendFactor::DstColor => dst,
        BlendFactor::OneMinusDstColor => Vec4::ONE - dst,
        BlendFactor::SrcAlpha => Vec4::splat(src.w),
        BlendFactor::OneMinusSrcAlpha => Vec4::splat(1.0 - src.w),
        BlendFactor::DstAlpha => Vec4::splat(dst.w),
        BlendFactor::OneMinusDstAlpha => Vec4::splat(1.0 - dst.w),
    }
}

/// Combine the fragment color with the stored color:
/// `src * src_factor + dst * dst_factor`.
#[inline]
pub(super) fn blend(state: &BlendState, frag: &mut Fragment, rt: &RawTarget) {
    let src = frag.color;
    let dst = unpack_bgra(rt.color(frag.index));
    frag.color = src * factor(state.src, src, dst) + dst * factor(state.dst, src, dst);
}

/// Ordered dither: a position-dependent sub-LSB offset on the color
/// channels, so the rounding in the writer breaks up banding.
#[inline]
pub(super) fn dither(frag: &mut Fragment) {
    let threshold = BAYER[(frag.y & 3) as usize][(frag.x & 3) as usize];
    let offset = ((threshold as f32 + 0.5) / 16.0 - 0.5) / 255.0;
    frag.color.x += offset;
    frag.color.y += offset;
    frag.color.z += offset;
}

/// Convert the output color to BGRA8888 and store it. Alpha is forced
/// to 0xFF unless alpha writes are configured.
#[inline]
pub(super) fn write(frag: &Fragment, rt: &RawTarget, write_alpha: bool) {
    let mut pixel = pack_bgra(frag.color);
    if !write_alpha {
        pixel |= 0xFF00_0000;
    }
    rt.set_color(frag.index, pixel);
}
