//! Per-triangle gradient precomputation.
//!
//! Perspective-correct interpolation works on `attr/w` and `1/w`, both
//! of which are linear in screen space. For each triangle this module
//! prepares the per-vertex starting values and the screen-space partial
//! derivatives that let the span walk advance a register file one pixel
//! at a time with a single add.

use glam::Vec2;

use crate::error::DrawError;
use crate::fragment::RegFile;
use crate::primitive::Primitive;

/// Coefficients for downstream mip-level selection.
///
/// Derived from the screen-space partials of `(u/w, v/w, 1/w)` for the
/// shader's texture-coordinate register; the texture unit combines them
/// with the fragment position to recover `du/dx`, `dv/dx` and friends
/// without per-pixel division.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LodCoefficients {
    /// `du/dx * dz/dy - dz/dx * du/dy`
    pub a: f32,
    /// `dv/dx * dz/dy - dz/dx * dv/dy`
    pub b: f32,
    /// `du/dx * z0 - dz/dx * u0`
    pub c: f32,
    /// `dv/dx * z0 - dz/dx * v0`
    pub d: f32,
    /// `du/dy * z0 - dz/dy * u0`
    pub e: f32,
    /// `dv/dy * z0 - dz/dy * v0`
    pub f: f32,
}

/// Precomputed interpolation data for one triangle.
///
/// `starts[k]` holds vertex `k`'s registers divided by `w`, except
/// register 0 where `(x, y, z)` stay as-is (depth is linear in screen
/// space and must not be perspective-corrected) and `w` is replaced by
/// `1/w`. `dx`/`dy` are the screen-space partials of those values.
#[derive(Debug, Clone)]
pub struct Gradient {
    /// Perspective-prepared register files at the three vertices.
    pub starts: [RegFile; 3],
    /// Partial derivative of every register with respect to screen x.
    pub dx: RegFile,
    /// Partial derivative of every register with respect to screen y.
    pub dy: RegFile,
    /// Vertex 0 position, the anchor for span seeding.
    pub origin: Vec2,
    /// Mip-level coefficients for the texture-coordinate register.
    pub lod: LodCoefficients,
}

impl Gradient {
    /// Precompute gradients for `prim`, with LOD coefficients taken from
    /// register `tex_reg`.
    ///
    /// `tri_index` only labels the error when the primitive carries a
    /// non-finite or zero `area_reciprocal`.
    pub fn new(prim: &Primitive, tex_reg: usize, tri_index: usize) -> Result<Self, DrawError> {
        if !prim.area_reciprocal.is_finite() || prim.area_reciprocal == 0.0 {
            return Err(DrawError::BadAreaReciprocal(tri_index));
        }

        let size = prim.reg_count();
        let p0 = prim.verts[0].position();
        let p1 = prim.verts[1].position();
        let p2 = prim.verts[2].position();

        let mut starts: [RegFile; 3] = [
            Vec::with_capacity(size),
            Vec::with_capacity(size),
            Vec::with_capacity(size),
        ];
        for (k, vert) in prim.verts.iter().enumerate() {
            let w_recip = 1.0 / vert.position().w;
            let mut pos = vert.position();
            pos.w = w_recip;
            starts[k].push(pos);
            for reg in &vert.regs[1..] {
                starts[k].push(*reg * w_recip);
            }
        }

        // Barycentric derivative coefficients.
        let y12 = (p1.y - p2.y) * prim.area_reciprocal;
        let y20 = (p2.y - p0.y) * prim.area_reciprocal;
        let y01 = (p0.y - p1.y) * prim.area_reciprocal;
        let x21 = (p2.x - p1.x) * prim.area_reciprocal;
        let x02 = (p0.x - p2.x) * prim.area_reciprocal;
        let x10 = (p1.x - p0.x) * prim.area_reciprocal;

        let mut dx: RegFile = Vec::with_capacity(size);
        let mut dy: RegFile = Vec::with_capacity(size);
        for i in 0..size {
            dx.push(y12 * starts[0][i] + y20 * starts[1][i] + y01 * starts[2][i]);
            dy.push(x21 * starts[0][i] + x02 * starts[1][i] + x10 * starts[2][i]);
        }

        // Position is exact in screen space.
        dx[0].x = 1.0;
        dx[0].y = 0.0;
        dy[0].x = 0.0;
        dy[0].y = 1.0;

        let lod = if tex_reg >= 1 && tex_reg < size {
            let dudx = dx[tex_reg].x;
            let dvdx = dx[tex_reg].y;
            let dudy = dy[tex_reg].x;
            let dvdy = dy[tex_reg].y;
            let dzdx = dx[0].w;
            let dzdy = dy[0].w;
            let z0 = starts[0][0].w;
            let u0 = starts[0][tex_reg].x;
            let v0 = starts[0][tex_reg].y;
            LodCoefficients {
                a: dudx * dzdy - dzdx * dudy,
                b: dvdx * dzdy - dzdx * dvdy,
                c: dudx * z0 - dzdx * u0,
                d: dvdx * z0 - dzdx * v0,
                e: dudy * z0 - dzdy * u0,
                f: dvdy * z0 - dzdy * v0,
            }
        } else {
            LodCoefficients::default()
        };

        Ok(Self {
            starts,
            dx,
            dy,
            origin: Vec2::new(p0.x, p0.y),
            lod,
        })
    }

    /// Number of registers per vertex.
    #[inline]
    pub fn reg_count(&self) -> usize {
        self.dx.len()
    }
}
