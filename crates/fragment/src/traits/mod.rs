use image::GrayImage;

use crate::{error::Result, types::Ring};

/// Trait for iso-contour tracing algorithms.
pub trait ContourTracer: Send + Sync {
    /// Trace closed iso-contours of `mask` at the given level (0.0..1.0,
    /// scaled against the 0..255 mask range). Every returned ring is a
    /// closed loop, stored without a duplicated end point.
    fn trace(&self, mask: &GrayImage, level: f32) -> Vec<Ring>;
}

/// Trait for polygon ring simplification algorithms.
pub trait RingSimplifier: Send + Sync {
    /// Reduce the point count of a closed ring within `tolerance`.
    fn simplify(&self, ring: &Ring, tolerance: f32) -> Result<Ring>;
}
