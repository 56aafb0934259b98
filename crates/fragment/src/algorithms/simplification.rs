use geo_types::{Coord, LineString};

use crate::{error::Result, traits::RingSimplifier, types::Ring};

/// Douglas-Peucker simplifier using the geo crate's implementation.
#[derive(Debug, Clone, Default)]
pub struct DouglasPeuckerSimplifier;

impl RingSimplifier for DouglasPeuckerSimplifier {
    fn simplify(&self, ring: &Ring, tolerance: f32) -> Result<Ring> {
        use geo::Simplify;

        if ring.len() < 4 {
            return Ok(ring.clone());
        }

        // close the ring so the join point survives simplification
        let mut coords: Vec<Coord<f32>> =
            ring.iter().map(|&[x, y]| Coord { x, y }).collect();
        coords.push(coords[0]);

        let simplified = LineString::new(coords).simplify(&tolerance);

        let mut out: Ring = simplified.coords().map(|c| [c.x, c.y]).collect();
        if out.len() > 1 && out.first() == out.last() {
            out.pop();
        }
        Ok(out)
    }
}
