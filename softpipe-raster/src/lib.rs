//! # softpipe-raster
//!
//! Scanline rasterization core of a software fixed-function 3D
//! pipeline. The crate consumes batches of already-transformed,
//! viewport-mapped triangles and produces shaded pixels in a
//! color/depth/stencil render target.
//!
//! ## Architecture
//!
//! A draw flows through three layers:
//! - **Scan conversion**: triangles decompose into edges bucketed in a
//!   global edge table; the scan loop maintains the active edge table
//!   and pairs edges into horizontal spans.
//! - **Span dispatch**: each scanline's spans become one task on a
//!   worker pool; a barrier joins every task before the draw returns.
//! - **Fragment chain**: every covered pixel walks an assembled
//!   sequence of stages (ownership, scissor, stencil, depth,
//!   interpolate, shade, blend, dither, write). Attribute interpolation
//!   is perspective-correct and lazy, so rejecting stages run first
//!   when the configuration allows it.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use glam::Vec4;
//! use softpipe_raster::{
//!     DrawContext, Fragment, FragmentShader, PipelineState, Primitive,
//!     RenderTarget, ScanlineRasterizer, Vertex,
//! };
//!
//! struct Flat;
//! impl FragmentShader for Flat {
//!     fn shade(&self, frag: &mut Fragment) -> bool {
//!         frag.color = Vec4::new(1.0, 0.0, 0.0, 1.0);
//!         true
//!     }
//! }
//!
//! let raster = ScanlineRasterizer::default();
//! let mut target = RenderTarget::new(256, 256);
//! let tri = Primitive::from_vertices([
//!     Vertex::new(Vec4::new(10.0, 10.0, 0.5, 1.0), &[]),
//!     Vertex::new(Vec4::new(200.0, 30.0, 0.5, 1.0), &[]),
//!     Vertex::new(Vec4::new(60.0, 220.0, 0.5, 1.0), &[]),
//! ]);
//! raster
//!     .draw(DrawContext {
//!         state: &PipelineState::default(),
//!         shader: Arc::new(Flat),
//!         target: &mut target,
//!         primitives: &[tri],
//!     })
//!     .unwrap();
//! ```

#![warn(missing_docs)]

mod edge;
mod error;
mod fragment;
mod gradient;
mod interp;
mod pipeline;
mod primitive;
mod scanline;
mod state;
mod target;

pub use error::DrawError;
pub use fragment::{AttrState, Fragment, FragmentShader, RegFile};
pub use gradient::{Gradient, LodCoefficients};
pub use interp::Interpolator;
pub use pipeline::{FragmentChain, Stage};
pub use primitive::{Primitive, RenderTarget, Vertex};
pub use scanline::{DrawContext, ScanlineRasterizer};
pub use state::{
    BlendFactor, BlendState, CompareFunc, DepthState, Enables, PipelineState, ScissorRect,
    StencilOp, StencilState,
};

// Re-export the pool configuration so callers can size the rasterizer
// without depending on the pool crate directly.
pub use softpipe_pool::PoolConfig;
