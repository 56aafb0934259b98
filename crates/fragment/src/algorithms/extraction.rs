//! Mask-to-polygon extraction.
//!
//! Turns a binary opacity mask into one outer polygon plus zero or more
//! hole polygons, in the mask's own coordinate frame. The mask is padded
//! with transparent pixels before tracing so shapes touching the raster
//! border still close, then traced at two iso-levels: the high level
//! yields outer-boundary candidates, the low level yields the hole
//! candidates (it traces the boundary of every enclosed background
//! region, along with an echo of the outer boundary itself).

use image::GrayImage;

use crate::{
    error::{FragmentError, Result},
    traits::{ContourTracer, RingSimplifier},
    types::{FragmentGeometry, Ring, ring_bounds_area},
};

use super::{simplification::DouglasPeuckerSimplifier, tracing::MarchingSquaresTracer};

/// Transparent margin added around the mask before tracing.
pub const PADDING: u32 = 4;

/// Iso-level for outer boundary candidates.
pub const OUTER_LEVEL: f32 = 0.6;

/// Iso-level for hole candidates.
pub const HOLE_LEVEL: f32 = 0.4;

/// Douglas-Peucker tolerance applied in the single-contour case.
pub const SIMPLIFY_TOLERANCE: f32 = 0.2;

/// Hole rings with this many points or fewer are discarded as noise.
pub const MIN_HOLE_POINTS: usize = 20;

/// Stateless mask-to-polygon extractor.
#[derive(Debug, Clone)]
pub struct ContourExtractor<T, S>
where
    T: ContourTracer,
    S: RingSimplifier,
{
    pub tracer: T,
    pub simplifier: S,
    pub padding: u32,
    pub outer_level: f32,
    pub hole_level: f32,
    pub tolerance: f32,
    pub min_hole_points: usize,
}

/// Extractor with the standard tracer and simplifier.
pub type StandardExtractor = ContourExtractor<MarchingSquaresTracer, DouglasPeuckerSimplifier>;

impl Default for StandardExtractor {
    fn default() -> Self {
        Self::new(MarchingSquaresTracer, DouglasPeuckerSimplifier)
    }
}

impl<T, S> ContourExtractor<T, S>
where
    T: ContourTracer,
    S: RingSimplifier,
{
    pub fn new(tracer: T, simplifier: S) -> Self {
        Self {
            tracer,
            simplifier,
            padding: PADDING,
            outer_level: OUTER_LEVEL,
            hole_level: HOLE_LEVEL,
            tolerance: SIMPLIFY_TOLERANCE,
            min_hole_points: MIN_HOLE_POINTS,
        }
    }

    /// Extract the outer contour and inner-hole contours of a mask.
    ///
    /// Points are returned in the mask's local frame; the caller adds its
    /// world offset. Fails with [`FragmentError::EmptyContour`] when no
    /// outer boundary can be traced.
    pub fn extract(&self, mask: &GrayImage) -> Result<FragmentGeometry> {
        let padded = pad_mask(mask, self.padding);

        let contours = self.tracer.trace(&padded, self.outer_level);
        let hole_candidates = self.tracer.trace(&padded, self.hole_level);

        let mut geometry = match contours.len() {
            0 => return Err(FragmentError::EmptyContour),
            1 => {
                let outer = self
                    .simplifier
                    .simplify(&contours[0], self.tolerance)?;
                FragmentGeometry {
                    outer,
                    holes: Vec::new(),
                }
            }
            _ => self.split_outer_and_holes(contours, hole_candidates),
        };

        // undo the padding shift
        geometry.translate(-(self.padding as f32), -(self.padding as f32));
        Ok(geometry)
    }

    /// Multi-contour disambiguation: the ring with the largest
    /// bounding-box area is the true outer boundary. Its echo in the
    /// hole-level set (again the largest) is discarded; the remaining
    /// hole candidates are kept when large enough to be real holes.
    ///
    /// The outer ring is intentionally NOT simplified on this path,
    /// matching the single-contour/multi-contour asymmetry of the
    /// reference behavior.
    fn split_outer_and_holes(&self, contours: Vec<Ring>, hole_candidates: Vec<Ring>) -> FragmentGeometry {
        let outer_idx = largest_bounds_index(&contours).unwrap_or(0);
        let echo_idx = largest_bounds_index(&hole_candidates);

        let outer = contours.into_iter().nth(outer_idx).unwrap_or_default();

        let holes = hole_candidates
            .into_iter()
            .enumerate()
            .filter(|(i, ring)| Some(*i) != echo_idx && ring.len() > self.min_hole_points)
            .map(|(_, ring)| ring)
            .collect();

        FragmentGeometry { outer, holes }
    }
}

/// Index of the ring with the largest axis-aligned bounding-box area.
fn largest_bounds_index(rings: &[Ring]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, ring) in rings.iter().enumerate() {
        let area = ring_bounds_area(ring);
        if best.is_none_or(|(_, a)| area > a) {
            best = Some((i, area));
        }
    }
    best.map(|(i, _)| i)
}

/// Surround the mask with a transparent margin on all four sides.
fn pad_mask(mask: &GrayImage, padding: u32) -> GrayImage {
    let (w, h) = mask.dimensions();
    let mut padded = GrayImage::new(w + 2 * padding, h + 2 * padding);
    for (x, y, px) in mask.enumerate_pixels() {
        padded.put_pixel(x + padding, y + padding, *px);
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn disk(mask: &mut GrayImage, cx: f32, cy: f32, r: f32, value: u8) {
        let (w, h) = mask.dimensions();
        for y in 0..h {
            for x in 0..w {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                if (dx * dx + dy * dy).sqrt() <= r {
                    mask.put_pixel(x, y, Luma([value]));
                }
            }
        }
    }

    #[test]
    fn solid_disk_yields_one_outer_and_no_holes() {
        let mut mask = GrayImage::new(30, 30);
        disk(&mut mask, 15.0, 15.0, 10.0, 255);

        let geom = StandardExtractor::default().extract(&mask).unwrap();
        assert!(!geom.outer.is_empty());
        assert!(geom.holes.is_empty());

        // every simplified point sits near the true circle
        for &[x, y] in &geom.outer {
            let r = ((x - 15.0).powi(2) + (y - 15.0).powi(2)).sqrt();
            assert!((9.0..=12.0).contains(&r), "point off the circle: r = {r}");
        }
    }

    #[test]
    fn annulus_yields_one_hole_inside_the_outer() {
        let mut mask = GrayImage::new(40, 40);
        disk(&mut mask, 20.0, 20.0, 14.0, 255);
        disk(&mut mask, 20.0, 20.0, 6.0, 0);

        let geom = StandardExtractor::default().extract(&mask).unwrap();
        assert_eq!(geom.holes.len(), 1);

        let (ox, oy, ow, oh) = crate::types::ring_bounds(&geom.outer, 0.0);
        let (hx, hy, hw, hh) = crate::types::ring_bounds(&geom.holes[0], 0.0);
        assert!(hx > ox && hy > oy);
        assert!(hx + hw < ox + ow && hy + hh < oy + oh);
    }

    #[test]
    fn multi_contour_outer_is_not_simplified() {
        let mut mask = GrayImage::new(40, 40);
        disk(&mut mask, 20.0, 20.0, 14.0, 255);
        disk(&mut mask, 20.0, 20.0, 6.0, 0);

        let geom = StandardExtractor::default().extract(&mask).unwrap();
        // the raw traced ring keeps roughly one point per boundary cell
        assert!(geom.outer.len() > 50, "outer was simplified: {} points", geom.outer.len());
    }

    #[test]
    fn border_touching_mask_still_closes() {
        let mut mask = GrayImage::new(20, 20);
        for y in 0..20 {
            for x in 0..20 {
                mask.put_pixel(x, y, Luma([255u8]));
            }
        }

        let geom = StandardExtractor::default().extract(&mask).unwrap();
        assert!(geom.outer.len() >= 4);
        assert!(geom.holes.is_empty());
        for &[x, y] in &geom.outer {
            assert!((-0.5..=19.5).contains(&x));
            assert!((-0.5..=19.5).contains(&y));
        }
    }

    #[test]
    fn small_holes_are_filtered_as_noise() {
        let mut mask = GrayImage::new(40, 40);
        disk(&mut mask, 20.0, 20.0, 14.0, 255);
        disk(&mut mask, 20.0, 20.0, 2.0, 0);

        let geom = StandardExtractor::default().extract(&mask).unwrap();
        assert!(geom.holes.is_empty());
        assert!(!geom.outer.is_empty());
    }

    #[test]
    fn blank_mask_fails_with_empty_contour() {
        let mask = GrayImage::new(16, 16);
        let err = StandardExtractor::default().extract(&mask).unwrap_err();
        assert!(matches!(err, FragmentError::EmptyContour));
    }

    #[test]
    fn two_blobs_pick_the_larger_as_outer() {
        let mut mask = GrayImage::new(60, 40);
        disk(&mut mask, 20.0, 20.0, 12.0, 255);
        disk(&mut mask, 48.0, 20.0, 4.0, 255);

        let geom = StandardExtractor::default().extract(&mask).unwrap();
        let (ox, _, ow, _) = crate::types::ring_bounds(&geom.outer, 0.0);
        // the big blob around x = 20 wins
        assert!(ox < 20.0 && ox + ow > 20.0);
        assert!(ox + ow < 40.0);
    }
}
