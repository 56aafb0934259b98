//! Marching-squares iso-contour tracing.
//!
//! The tracer walks every 2x2 pixel cell of the mask, emits the line
//! segments crossing the requested iso-level with linear sub-pixel
//! interpolation, and links the segments into closed loops. On a raster
//! whose border row/column is below the level (the extractor guarantees
//! this by zero-padding), every crossing edge is shared by exactly two
//! cells, so every traced contour closes.

use std::collections::HashMap;

use image::GrayImage;

use crate::{traits::ContourTracer, types::Ring};

type Point = [f32; 2];
type Segment = (Point, Point);

/// Marching-squares tracer with linear edge interpolation.
#[derive(Debug, Clone, Default)]
pub struct MarchingSquaresTracer;

impl ContourTracer for MarchingSquaresTracer {
    fn trace(&self, mask: &GrayImage, level: f32) -> Vec<Ring> {
        let (width, height) = mask.dimensions();
        if width < 2 || height < 2 {
            return Vec::new();
        }

        let level = level * 255.0;
        let mut segments: Vec<Segment> = Vec::new();

        for y in 0..height - 1 {
            for x in 0..width - 1 {
                let tl = mask.get_pixel(x, y).0[0] as f32;
                let tr = mask.get_pixel(x + 1, y).0[0] as f32;
                let bl = mask.get_pixel(x, y + 1).0[0] as f32;
                let br = mask.get_pixel(x + 1, y + 1).0[0] as f32;

                let case = ((tl > level) as u8)
                    | (((tr > level) as u8) << 1)
                    | (((br > level) as u8) << 2)
                    | (((bl > level) as u8) << 3);

                if case == 0 || case == 15 {
                    continue;
                }

                let (fx, fy) = (x as f32, y as f32);
                let top = lerp_edge(tl, tr, level, [fx, fy], [fx + 1.0, fy]);
                let right = lerp_edge(tr, br, level, [fx + 1.0, fy], [fx + 1.0, fy + 1.0]);
                let bottom = lerp_edge(bl, br, level, [fx, fy + 1.0], [fx + 1.0, fy + 1.0]);
                let left = lerp_edge(tl, bl, level, [fx, fy], [fx, fy + 1.0]);

                match case {
                    1 => segments.push((left, top)),
                    2 => segments.push((top, right)),
                    3 => segments.push((left, right)),
                    4 => segments.push((right, bottom)),
                    // saddle cells: fixed disambiguation
                    5 => {
                        segments.push((left, top));
                        segments.push((right, bottom));
                    }
                    6 => segments.push((top, bottom)),
                    7 => segments.push((left, bottom)),
                    8 => segments.push((bottom, left)),
                    9 => segments.push((bottom, top)),
                    10 => {
                        segments.push((top, left));
                        segments.push((bottom, right));
                    }
                    11 => segments.push((bottom, right)),
                    12 => segments.push((right, left)),
                    13 => segments.push((right, top)),
                    14 => segments.push((top, left)),
                    _ => unreachable!(),
                }
            }
        }

        link_segments(segments)
    }
}

/// Position of the iso-level crossing along a cell edge.
///
/// Both cells sharing an edge compute this from the same pixel values in
/// the same order, so shared endpoints are bit-identical and segment
/// linking can match them exactly.
fn lerp_edge(v1: f32, v2: f32, level: f32, a: Point, b: Point) -> Point {
    if v1 == v2 {
        return [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0];
    }
    let t = ((level - v1) / (v2 - v1)).clamp(0.0, 1.0);
    [a[0] + t * (b[0] - a[0]), a[1] + t * (b[1] - a[1])]
}

fn point_key(p: Point) -> (u32, u32) {
    (p[0].to_bits(), p[1].to_bits())
}

/// Link loose segments into closed rings.
///
/// Every endpoint of a crossing segment has degree two on a zero-bordered
/// raster; chains that fail to close (degenerate input) are dropped.
fn link_segments(segments: Vec<Segment>) -> Vec<Ring> {
    let mut incident: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
    for (i, (a, b)) in segments.iter().enumerate() {
        incident.entry(point_key(*a)).or_default().push(i);
        incident.entry(point_key(*b)).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut rings = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;

        let (first, mut current) = segments[start];
        let mut ring: Ring = vec![first];
        let first_key = point_key(first);

        loop {
            let current_key = point_key(current);
            if current_key == first_key {
                break;
            }
            ring.push(current);

            let next = incident
                .get(&current_key)
                .and_then(|ids| ids.iter().copied().find(|&i| !used[i]));

            let Some(next) = next else {
                // open chain, cannot occur on a padded mask
                ring.clear();
                break;
            };

            used[next] = true;
            let (a, b) = segments[next];
            current = if point_key(a) == current_key { b } else { a };
        }

        if ring.len() >= 3 {
            rings.push(ring);
        }
    }

    rings
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn filled_rect(w: u32, h: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> GrayImage {
        let mut img = GrayImage::new(w, h);
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        img
    }

    #[test]
    fn solid_square_traces_one_closed_ring() {
        let mask = filled_rect(20, 20, 5, 5, 15, 15);
        let rings = MarchingSquaresTracer.trace(&mask, 0.6);
        assert_eq!(rings.len(), 1);
        assert!(rings[0].len() >= 8);

        // every point stays near the square's boundary
        for &[x, y] in &rings[0] {
            assert!((4.0..=15.0).contains(&x), "x out of range: {x}");
            assert!((4.0..=15.0).contains(&y), "y out of range: {y}");
        }
    }

    #[test]
    fn ring_mask_traces_two_rings() {
        let mut mask = filled_rect(30, 30, 3, 3, 27, 27);
        for y in 10..20 {
            for x in 10..20 {
                mask.put_pixel(x, y, Luma([0u8]));
            }
        }
        let rings = MarchingSquaresTracer.trace(&mask, 0.6);
        assert_eq!(rings.len(), 2);
    }

    #[test]
    fn blank_mask_traces_nothing() {
        let mask = GrayImage::new(10, 10);
        assert!(MarchingSquaresTracer.trace(&mask, 0.6).is_empty());
    }

    #[test]
    fn tiny_raster_traces_nothing() {
        let mask = GrayImage::new(1, 5);
        assert!(MarchingSquaresTracer.trace(&mask, 0.6).is_empty());
    }

    #[test]
    fn level_shifts_crossing_position() {
        // edge between a zero and a full pixel: the crossing moves with the level
        let mask = filled_rect(6, 6, 2, 2, 4, 4);
        let low = MarchingSquaresTracer.trace(&mask, 0.4);
        let high = MarchingSquaresTracer.trace(&mask, 0.6);
        assert_eq!(low.len(), 1);
        assert_eq!(high.len(), 1);

        let min_x = |ring: &Ring| ring.iter().map(|p| p[0]).fold(f32::INFINITY, f32::min);
        // the higher level bites deeper into the transparent side's neighbour
        assert!(min_x(&high[0]) > min_x(&low[0]));
    }
}
