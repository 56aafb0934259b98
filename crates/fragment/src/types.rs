use geo_types::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

/// A closed contour, stored without a duplicated closing point.
pub type Ring = Vec<[f32; 2]>;

/// Axis-aligned placement box in world (canvas) coordinates.
///
/// `x, y` is the top-left offset of the fragment on the canvas; `width`
/// and `height` are the raster dimensions in pixels (zero when no raster
/// is loaded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True if `other` lies strictly inside this box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.x > self.x
            && other.y > self.y
            && other.x + other.width as i32 <= self.x + self.width as i32
            && other.y + other.height as i32 <= self.y + self.height as i32
    }
}

/// Bounding extent of a point ring, with an optional symmetric pad.
///
/// Returns `(min_x, min_y, width, height)` where the minima are shifted
/// by `-pad` and the extents grow by `2 * pad`. Used for area comparisons
/// between candidate contours; an empty ring yields a zero extent.
pub fn ring_bounds(points: &[[f32; 2]], pad: f32) -> (f32, f32, f32, f32) {
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for &[x, y] in points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    if points.is_empty() {
        return (0.0, 0.0, 0.0, 0.0);
    }

    (
        min_x - pad,
        min_y - pad,
        max_x - min_x + 2.0 * pad,
        max_y - min_y + 2.0 * pad,
    )
}

/// Area of the axis-aligned box spanned by a ring.
pub fn ring_bounds_area(points: &[[f32; 2]]) -> f32 {
    let (_, _, w, h) = ring_bounds(points, 0.0);
    w * h
}

/// The polygonal shape of a fragment: one outer boundary plus the holes
/// enclosed within it. All points share one coordinate frame at all times.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FragmentGeometry {
    /// Exterior boundary of the opaque region.
    pub outer: Ring,
    /// Interior boundaries (holes); insertion order, no semantic ordering.
    pub holes: Vec<Ring>,
}

impl FragmentGeometry {
    pub fn is_empty(&self) -> bool {
        self.outer.is_empty()
    }

    /// Shift every point of the outer ring and every hole by `(dx, dy)`.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        for p in &mut self.outer {
            p[0] += dx;
            p[1] += dy;
        }
        for hole in &mut self.holes {
            for p in hole {
                p[0] += dx;
                p[1] += dy;
            }
        }
    }

    /// Convert to a geo-types polygon for geometric queries.
    pub fn to_geo_polygon(&self) -> Polygon<f32> {
        let exterior = LineString::new(
            self.outer
                .iter()
                .map(|&[x, y]| Coord { x, y })
                .collect::<Vec<_>>(),
        );
        let interiors = self
            .holes
            .iter()
            .map(|hole| {
                LineString::new(hole.iter().map(|&[x, y]| Coord { x, y }).collect::<Vec<_>>())
            })
            .collect();
        Polygon::new(exterior, interiors)
    }

    /// Unsigned area of the outer ring minus the holes.
    pub fn area(&self) -> f32 {
        use geo::Area;
        self.to_geo_polygon().unsigned_area()
    }

    /// Extent of the outer ring as `(min_x, min_y, width, height)`.
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        ring_bounds(&self.outer, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_bounds_with_padding() {
        let ring = vec![[2.0, 3.0], [8.0, 3.0], [8.0, 7.0], [2.0, 7.0]];
        let (x, y, w, h) = ring_bounds(&ring, 1.0);
        assert_eq!((x, y, w, h), (1.0, 2.0, 8.0, 6.0));
        assert_eq!(ring_bounds_area(&ring), 24.0);
    }

    #[test]
    fn empty_ring_has_zero_extent() {
        assert_eq!(ring_bounds(&[], 2.0), (0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn geometry_translation_moves_all_rings() {
        let mut geom = FragmentGeometry {
            outer: vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]],
            holes: vec![vec![[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 2.0]]],
        };
        geom.translate(10.0, -5.0);
        assert_eq!(geom.outer[0], [10.0, -5.0]);
        assert_eq!(geom.holes[0][2], [12.0, -3.0]);
    }

    #[test]
    fn bbox_containment_is_strict() {
        let outer = BoundingBox::new(0, 0, 10, 10);
        let inner = BoundingBox::new(2, 2, 4, 4);
        assert!(outer.contains(&inner));
        assert!(!outer.contains(&outer));
        assert!(!inner.contains(&outer));
    }
}
