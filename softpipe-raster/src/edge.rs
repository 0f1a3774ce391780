//! Global edge table construction and per-triangle active-edge slots.
//!
//! Scan conversion decomposes each triangle into its non-horizontal
//! edges, bucketed by the scanline at which they first cross a pixel
//! center. Edges live in one per-draw arena (`Vec<Edge>`); the tables
//! and the triangles refer to them by index, so the whole graph drops
//! wholesale at draw end.

use std::collections::HashMap;

use crate::primitive::Primitive;

/// One non-horizontal edge of one triangle.
#[derive(Debug, Clone)]
pub(crate) struct Edge {
    /// Intersection of the edge with the current scanline's center.
    pub x: f32,
    /// Change of `x` per unit `y`.
    pub dx: f32,
    /// Last scanline this edge participates in.
    pub ymax: i32,
    /// Index of the owning triangle.
    pub tri: usize,
    /// Per-scanline pairing flag; cleared as spans consume edges.
    pub active: bool,
}

/// Per-triangle scratch: the up-to-two edges currently in the AET.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TriangleState {
    e0: Option<usize>,
    e1: Option<usize>,
}

impl TriangleState {
    /// Claim an active-edge slot. Errors when both slots are taken,
    /// which no well-formed triangle can cause.
    pub fn set_active(&mut self, edge: usize) -> Result<(), ()> {
        if self.e0.is_none() {
            self.e0 = Some(edge);
            Ok(())
        } else if self.e1.is_none() {
            self.e1 = Some(edge);
            Ok(())
        } else {
            Err(())
        }
    }

    /// Release the slot holding `edge`.
    pub fn unset_active(&mut self, edge: usize) {
        if self.e0 == Some(edge) {
            self.e0 = None;
        } else if self.e1 == Some(edge) {
            self.e1 = None;
        } else {
            log::error!("edge {edge} released but was not active");
        }
    }

    /// The sibling of `edge`, if both slots are live.
    pub fn adjacent(&self, edge: usize) -> Option<usize> {
        if self.e0 == Some(edge) {
            self.e1
        } else if self.e1 == Some(edge) {
            self.e0
        } else {
            None
        }
    }
}

/// The global edge table of one draw: edges bucketed by starting
/// scanline, plus the draw's overall vertical range.
#[derive(Debug)]
pub(crate) struct EdgeTable {
    /// Edge arena. Indices in `starts` and the AET point here.
    pub edges: Vec<Edge>,
    /// Scanline -> edges whose `ystart` is that scanline.
    pub starts: HashMap<i32, Vec<usize>>,
    /// First scanline any edge starts on.
    pub ymin: i32,
    /// Last scanline any edge participates in.
    pub ymax: i32,
}

impl EdgeTable {
    /// Build the GET for a batch of triangles.
    ///
    /// Horizontal edges are discarded (the other two edges of the
    /// triangle cover the same scanlines), as are edges whose rounded
    /// vertical range is empty. A fully degenerate triangle therefore
    /// contributes nothing and is silently skipped.
    ///
    /// Scanline ownership follows the pixel-center fill convention:
    /// an edge covers the scanlines whose centers `y + 0.5` lie in
    /// `[low.y, high.y)`, so shared edges between vertically adjacent
    /// triangles are covered exactly once.
    pub fn build(prims: &[Primitive]) -> Self {
        let mut table = EdgeTable {
            edges: Vec::new(),
            starts: HashMap::new(),
            ymin: i32::MAX,
            ymax: i32::MIN,
        };

        for (tri, prim) in prims.iter().enumerate() {
            for i in 0..3 {
                let a = prim.verts[i].position();
                let b = prim.verts[(i + 1) % 3].position();

                let (low, high) = if a.y > b.y { (b, a) } else { (a, b) };

                // Horizontal or sub-pixel edges cross no center row.
                // One shared rounding rule keeps this consistent with
                // the ranges of the triangle's other edges, so a live
                // scanline always sees the edges in pairs.
                let ystart = (low.y - 0.5).ceil() as i32;
                let ymax = (high.y - 0.5).ceil() as i32 - 1;
                if ymax < ystart {
                    continue;
                }

                // Non-empty row range implies high.y > low.y.
                let dx = (high.x - low.x) / (high.y - low.y);
                let x = low.x + ((ystart as f32 + 0.5) - low.y) * dx;

                let idx = table.edges.len();
                table.edges.push(Edge {
                    x,
                    dx,
                    ymax,
                    tri,
                    active: false,
                });
                table.starts.entry(ystart).or_default().push(idx);

                table.ymin = table.ymin.min(ystart);
                table.ymax = table.ymax.max(ymax);
            }
        }

        if !table.edges.is_empty() {
            log::trace!(
                "edge table: {} edges over scanlines {}..={}",
                table.edges.len(),
                table.ymin,
                table.ymax
            );
        }
        table
    }

    /// Whether the draw produced any scan-convertible edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
