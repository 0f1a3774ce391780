//! The scanline rasterizer: scan conversion and span dispatch.
//!
//! The scan loop walks the draw's vertical range once, maintaining the
//! active edge table. Edge bookkeeping is strictly sequential; the
//! pixel work of each scanline is packaged into one task and handed to
//! the worker pool, so scanlines shade in parallel while the loop keeps
//! advancing. A barrier at the end of the draw joins every task before
//! the per-draw arenas drop.

use std::sync::Arc;

use log::{debug, error, trace};
use softpipe_pool::{Pool, PoolConfig};

use crate::edge::{EdgeTable, TriangleState};
use crate::error::DrawError;
use crate::fragment::{AttrState, Fragment, FragmentShader};
use crate::gradient::Gradient;
use crate::interp::Interpolator;
use crate::pipeline::FragmentChain;
use crate::primitive::{Primitive, RenderTarget};
use crate::state::PipelineState;
use crate::target::RawTarget;

/// Everything a draw call hands to the rasterizer.
pub struct DrawContext<'a> {
    /// Pipeline state snapshot for this draw.
    pub state: &'a PipelineState,
    /// The fragment shader stage.
    pub shader: Arc<dyn FragmentShader>,
    /// Destination buffers.
    pub target: &'a mut RenderTarget,
    /// Screen-space triangles, already clipped and viewport-mapped.
    pub primitives: &'a [Primitive],
}

/// A horizontal run of one triangle on one scanline, bounded by its two
/// active edges.
struct Span {
    xl: f32,
    xr: f32,
    tri: usize,
}

/// Per-draw data shared read-only with every span task.
struct DrawShared {
    gradients: Vec<Gradient>,
    chain: FragmentChain,
    shader: Arc<dyn FragmentShader>,
    target: RawTarget,
}

/// One scanline's worth of spans, dispatched as a single pool task.
struct ScanlineTask {
    y: i32,
    spans: Vec<Span>,
    shared: Arc<DrawShared>,
}

impl ScanlineTask {
    /// Walk every span, handing each covered pixel to the fragment
    /// chain.
    fn run(self) {
        let shared = &*self.shared;
        let rt = &shared.target;
        let y = self.y;
        let mut frag = Fragment {
            y,
            ..Default::default()
        };

        for span in &self.spans {
            let grad = &shared.gradients[span.tri];

            // Pixel centers covered by [xl, xr), clamped to the target.
            let xstart = ((span.xl - 0.5).ceil() as i32).max(0);
            let xend = ((span.xr - 0.5).ceil() as i32).min(rt.width as i32);
            if xend <= xstart {
                continue;
            }

            frag.resize_regs(grad.reg_count());
            Interpolator::eval_at(
                &grad.starts[0],
                &grad.dx,
                &grad.dy,
                xstart as f32 + 0.5 - grad.origin.x,
                y as f32 + 0.5 - grad.origin.y,
                &mut frag.start,
            );

            frag.x = xstart;
            frag.z = frag.start[0].z;
            frag.index = (rt.height - 1 - y as usize) * rt.width + xstart as usize;
            frag.attrs = AttrState::Seeded;
            let dzdx = grad.dx[0].z;

            for x in xstart..xend {
                frag.x = x;
                shared.chain.run(&mut frag, grad, shared.shader.as_ref(), rt);

                frag.z += dzdx;
                frag.index += 1;
                frag.attrs = AttrState::Stale;
            }
        }
    }
}

/// Scanline rasterizer with its own worker pool.
///
/// One instance serves many draws; draws on the same instance are
/// serialized by the `&mut RenderTarget` they borrow.
pub struct ScanlineRasterizer {
    pool: Pool<ScanlineTask>,
}

impl ScanlineRasterizer {
    /// Create a rasterizer backed by a pool with the given
    /// configuration.
    pub fn new(config: PoolConfig) -> Self {
        Self {
            pool: Pool::new(config, ScanlineTask::run),
        }
    }

    /// Rasterize a batch of triangles.
    ///
    /// Errors abort the draw after the worker barrier; the render
    /// target may then hold partial results, which the error taxonomy
    /// permits.
    pub fn draw(&self, ctx: DrawContext<'_>) -> Result<(), DrawError> {
        let DrawContext {
            state,
            shader,
            target,
            primitives,
        } = ctx;

        debug!(
            "rasterizing {} triangles onto {}x{}",
            primitives.len(),
            target.width,
            target.height
        );

        let tex_reg = shader.tex_coord_register();
        let mut gradients = Vec::with_capacity(primitives.len());
        for (i, prim) in primitives.iter().enumerate() {
            match Gradient::new(prim, tex_reg, i) {
                Ok(grad) => gradients.push(grad),
                Err(err) => {
                    error!("aborting draw: {err}");
                    return Err(err);
                }
            }
        }

        let mut table = EdgeTable::build(primitives);
        if table.is_empty() {
            return Ok(());
        }

        let chain = FragmentChain::assemble(state, shader.can_discard());
        let height = target.height as i32;
        let shared = Arc::new(DrawShared {
            gradients,
            chain,
            shader,
            target: RawTarget::new(target),
        });

        let result = self.scan(&mut table, primitives.len(), height, &shared);

        // The barrier must run even on the error path: tasks hold
        // pointers into the target borrow and Arcs into the arena.
        self.pool.wait_for_all();
        result
    }

    /// The scan loop proper. Sequential over `y`; dispatches one task
    /// per scanline that produced spans.
    fn scan(
        &self,
        table: &mut EdgeTable,
        tri_count: usize,
        height: i32,
        shared: &Arc<DrawShared>,
    ) -> Result<(), DrawError> {
        let mut tris = vec![TriangleState::default(); tri_count];
        let mut aet: Vec<usize> = Vec::new();

        // Scanlines below 0 still need their edge bookkeeping so that
        // partially off-target triangles enter the AET with correct x;
        // everything past the top of the target is unreachable.
        let ystop = table.ymax.min(height - 1);

        for y in table.ymin..=ystop {
            // Remove expired edges.
            let edges = &table.edges;
            aet.retain(|&e| {
                if edges[e].ymax < y {
                    tris[edges[e].tri].unset_active(e);
                    false
                } else {
                    true
                }
            });

            // Activate edges starting on this scanline.
            if let Some(incoming) = table.starts.get(&y) {
                for &e in incoming {
                    let tri = table.edges[e].tri;
                    if tris[tri].set_active(e).is_err() {
                        error!("triangle {tri} acquired a third active edge at scanline {y}");
                        return Err(DrawError::ThirdActiveEdge(tri));
                    }
                    aet.push(e);
                }
            }

            for &e in &aet {
                table.edges[e].active = true;
            }

            // Pair edges into spans. Each pair is consumed once: both
            // sides drop their active flag when the left one is seen.
            let mut spans: Vec<Span> = Vec::new();
            for &e in &aet {
                if !table.edges[e].active {
                    continue;
                }
                let tri = table.edges[e].tri;
                let Some(adj) = tris[tri].adjacent(e) else {
                    error!("triangle {tri} has an unpaired active edge at scanline {y}");
                    table.edges[e].active = false;
                    continue;
                };
                table.edges[e].active = false;
                table.edges[adj].active = false;

                let (xl, xr) = if table.edges[e].x <= table.edges[adj].x {
                    (table.edges[e].x, table.edges[adj].x)
                } else {
                    (table.edges[adj].x, table.edges[e].x)
                };

                // Skip spans whose rounded pixel range is empty.
                if (xr - 0.5).ceil() <= (xl - 0.5).ceil() {
                    continue;
                }
                spans.push(Span { xl, xr, tri });
            }

            if y >= 0 && !spans.is_empty() {
                trace!("scanline {y}: {} spans", spans.len());
                self.pool.submit(ScanlineTask {
                    y,
                    spans,
                    shared: Arc::clone(shared),
                });
            }

            // Step every live edge to the next scanline.
            for &e in &aet {
                let edge = &mut table.edges[e];
                edge.x += edge.dx;
            }
        }

        Ok(())
    }
}

impl Default for ScanlineRasterizer {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}
