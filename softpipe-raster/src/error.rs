//! Draw-level error taxonomy.
//!
//! Only upstream-invariant violations surface as errors; numerical edge
//! cases (degenerate triangles, sub-pixel edges) are absorbed during
//! edge-table construction and yield zero coverage instead. The coarsest
//! recovery unit is the draw: no error is recovered mid-scanline.

use thiserror::Error;

/// Fatal conditions that abort a draw.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DrawError {
    /// A triangle would hold three simultaneous active edges. The edge
    /// tables guarantee at most two per scanline for well-formed input,
    /// so this indicates broken clipping or primitive assembly upstream.
    #[error("triangle {0} would hold three simultaneous active edges")]
    ThirdActiveEdge(usize),

    /// `area_reciprocal` was non-finite or zero. Degenerate triangles
    /// must be filtered before rasterization.
    #[error("triangle {0} has a non-finite or zero area reciprocal")]
    BadAreaReciprocal(usize),
}
