//! Shared fixtures for the rasterizer integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use glam::Vec4;
use softpipe_raster::{
    DrawContext, DrawError, Fragment, FragmentShader, PipelineState, PoolConfig, Primitive,
    RenderTarget, ScanlineRasterizer, Vertex,
};

/// A small rasterizer so tests exercise real parallel dispatch.
pub fn raster() -> ScanlineRasterizer {
    ScanlineRasterizer::new(PoolConfig {
        num_workers: 2,
        thread_name_prefix: None,
    })
}

pub fn vert(x: f32, y: f32, z: f32, w: f32, varyings: &[Vec4]) -> Vertex {
    Vertex::new(Vec4::new(x, y, z, w), varyings)
}

/// Flat triangle at constant depth with no varyings.
pub fn flat_tri(p: [(f32, f32); 3], z: f32) -> Primitive {
    Primitive::from_vertices([
        vert(p[0].0, p[0].1, z, 1.0, &[]),
        vert(p[1].0, p[1].1, z, 1.0, &[]),
        vert(p[2].0, p[2].1, z, 1.0, &[]),
    ])
}

pub fn draw(
    raster: &ScanlineRasterizer,
    state: &PipelineState,
    shader: Arc<dyn FragmentShader>,
    target: &mut RenderTarget,
    prims: &[Primitive],
) -> Result<(), DrawError> {
    raster.draw(DrawContext {
        state,
        shader,
        target,
        primitives: prims,
    })
}

/// Barycentric coordinates of `(x, y)` in a primitive, for closed-form
/// expectations.
pub fn bary(prim: &Primitive, x: f32, y: f32) -> [f32; 3] {
    let v0 = prim.verts[0].position();
    let v1 = prim.verts[1].position();
    let v2 = prim.verts[2].position();
    let b0 = ((v1.x - x) * (v2.y - y) - (v1.y - y) * (v2.x - x)) * prim.area_reciprocal;
    let b1 = ((v2.x - x) * (v0.y - y) - (v2.y - y) * (v0.x - x)) * prim.area_reciprocal;
    [b0, b1, 1.0 - b0 - b1]
}

/// Writes a constant color.
pub struct SolidShader(pub Vec4);

impl FragmentShader for SolidShader {
    fn shade(&self, frag: &mut Fragment) -> bool {
        frag.color = self.0;
        true
    }
}

/// Discards everything.
pub struct DiscardAllShader;

impl FragmentShader for DiscardAllShader {
    fn shade(&self, _frag: &mut Fragment) -> bool {
        false
    }

    fn can_discard(&self) -> bool {
        true
    }
}

/// What the probe saw for one pixel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbeRecord {
    pub count: u32,
    pub index: usize,
    pub z: f32,
    /// `inputs[1]` if the layout has a varying register.
    pub varying: Vec4,
    /// True `w` recovered by the perspective divide.
    pub w: f32,
}

/// Records every delivered fragment, keyed by pixel coordinate.
pub struct ProbeShader {
    pub color: Vec4,
    pub hits: Mutex<HashMap<(i32, i32), ProbeRecord>>,
}

impl ProbeShader {
    pub fn new(color: Vec4) -> Arc<Self> {
        Arc::new(Self {
            color,
            hits: Mutex::new(HashMap::new()),
        })
    }

    pub fn covered(&self) -> HashMap<(i32, i32), ProbeRecord> {
        self.hits.lock().unwrap().clone()
    }
}

impl FragmentShader for ProbeShader {
    fn shade(&self, frag: &mut Fragment) -> bool {
        let mut hits = self.hits.lock().unwrap();
        let rec = hits.entry((frag.x, frag.y)).or_default();
        rec.count += 1;
        rec.index = frag.index;
        rec.z = frag.z;
        rec.w = frag.inputs[0].w;
        if frag.inputs.len() > 1 {
            rec.varying = frag.inputs[1];
        }
        frag.color = self.color;
        true
    }
}
