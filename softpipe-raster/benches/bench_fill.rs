use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use glam::Vec4;
use softpipe_raster::{
    DrawContext, Enables, Fragment, FragmentShader, PipelineState, PoolConfig, Primitive,
    RenderTarget, ScanlineRasterizer, Vertex,
};

struct GradientShader;

impl FragmentShader for GradientShader {
    fn shade(&self, frag: &mut Fragment) -> bool {
        frag.color = frag.inputs[1];
        true
    }
}

fn quad(size: f32) -> Vec<Primitive> {
    let color = |r: f32, g: f32| Vec4::new(r, g, 0.0, 1.0);
    let v = |x: f32, y: f32, c: Vec4| Vertex::new(Vec4::new(x, y, 0.5, 1.0), &[c]);
    vec![
        Primitive::from_vertices([
            v(0.0, 0.0, color(0.0, 0.0)),
            v(size, 0.0, color(1.0, 0.0)),
            v(0.0, size, color(0.0, 1.0)),
        ]),
        Primitive::from_vertices([
            v(size, 0.0, color(1.0, 0.0)),
            v(size, size, color(1.0, 1.0)),
            v(0.0, size, color(0.0, 1.0)),
        ]),
    ]
}

fn bench_fill(c: &mut Criterion) {
    let raster = ScanlineRasterizer::new(PoolConfig::default());
    let mut target = RenderTarget::new(256, 256);
    let prims = quad(256.0);
    let state = PipelineState {
        enables: Enables::DEPTH_TEST,
        ..Default::default()
    };
    let shader: Arc<dyn FragmentShader> = Arc::new(GradientShader);

    c.bench_function("fill_256x256_quad", |b| {
        b.iter(|| {
            target.clear(0, 1.0, 0);
            raster
                .draw(DrawContext {
                    state: &state,
                    shader: Arc::clone(&shader),
                    target: &mut target,
                    primitives: &prims,
                })
                .unwrap();
        })
    });
}

criterion_group!(benches, bench_fill);
criterion_main!(benches);
