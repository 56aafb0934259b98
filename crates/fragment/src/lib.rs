//! # Fragment Geometry Library
//!
//! Geometry core for assembling scanned papyrus fragments on a shared
//! canvas. Each fragment's alpha mask is turned into a polygonal contour
//! (outer boundary plus inner holes) used for selection, highlighting and
//! spatial bookkeeping, and kept synchronized with the fragment's
//! placement as it moves.
//!
//! ## Core Features
//!
//! - **Mask-to-polygon extraction**: iso-contour tracing at two levels,
//!   border padding, hole filtering, polygon simplification
//! - **Fragment records**: placement box, mask centroid, contours, all in
//!   one world frame at all times
//! - **Project collection**: insertion-ordered, group-filtered listing
//!   and plain key-value persistence
//! - **GeoJSON export**: polygons with holes for external viewers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fragment::{FragmentRecord, Project, GroupFilter};
//!
//! let mut project = Project::new();
//! let record = FragmentRecord::from_path("piece01.png", 120, 80, project.next_id())?;
//! project.add(record);
//!
//! for fragment in project.fragments(GroupFilter::All) {
//!     println!("#{}: {} outline points", fragment.id, fragment.geometry.outer.len());
//! }
//! # Ok::<(), fragment::FragmentError>(())
//! ```
//!
//! ## Custom extraction
//!
//! ```rust
//! use fragment::algorithms::{ContourExtractor, MarchingSquaresTracer, DouglasPeuckerSimplifier};
//!
//! let mut extractor = ContourExtractor::new(MarchingSquaresTracer, DouglasPeuckerSimplifier);
//! extractor.min_hole_points = 40; // drop more hole noise
//! ```

pub mod algorithms;
pub mod error;
pub mod fragment;
pub mod io;
pub mod project;
pub mod raster;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use algorithms::{ContourExtractor, StandardExtractor};
pub use error::{FragmentError, Result};
pub use fragment::{FragmentRecord, SerializedFragment, UNGROUPED};
pub use project::{GroupFilter, LoadPolicy, Project};
pub use traits::*;
pub use types::{BoundingBox, FragmentGeometry, Ring};

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn punched_card(w: u32, h: u32) -> RgbaImage {
        let mut img = RgbaImage::new(w, h);
        for y in 0..h {
            for x in 0..w {
                img.put_pixel(x, y, Rgba([190, 170, 140, 255]));
            }
        }
        // a hole big enough to survive the noise filter
        for y in h / 3..2 * h / 3 {
            for x in w / 3..2 * w / 3 {
                img.put_pixel(x, y, Rgba([0, 0, 0, 0]));
            }
        }
        img
    }

    #[test]
    fn full_flow_from_raster_to_records() {
        let mut project = Project::new();
        let record =
            FragmentRecord::from_image(punched_card(36, 36), None, String::new(), 40, 40, 0)
                .expect("extraction should succeed");
        project.add(record);

        let fragment = project.get(0).unwrap();
        assert!(!fragment.geometry.outer.is_empty());
        assert_eq!(fragment.geometry.holes.len(), 1);

        let restored = Project::from_records(project.to_records());
        assert_eq!(
            restored.get(0).unwrap().geometry,
            project.get(0).unwrap().geometry
        );
    }

    #[test]
    fn moving_a_fragment_keeps_every_frame_in_sync() {
        let mut record =
            FragmentRecord::from_image(punched_card(36, 36), None, String::new(), 0, 0, 1).unwrap();
        let before = record.clone();

        record.translate(25, -10);

        assert_eq!(record.bbox.x, before.bbox.x + 25);
        assert_eq!(record.bbox.y, before.bbox.y - 10);
        assert_eq!(record.center[0], before.center[0] + 25.0);
        assert_eq!(record.center[1], before.center[1] - 10.0);
        for (p, q) in record.geometry.outer.iter().zip(&before.geometry.outer) {
            assert_eq!(p[0], q[0] + 25.0);
            assert_eq!(p[1], q[1] - 10.0);
        }
    }

    #[test]
    fn failed_extraction_leaves_fragment_representable() {
        // all-transparent raster: geometry setup fails, but a placeholder
        // is still selectable and movable
        let transparent = RgbaImage::new(12, 12);
        let err =
            FragmentRecord::from_image(transparent, None, "ghost.png".to_string(), 5, 5, 2)
                .unwrap_err();
        assert!(matches!(err, FragmentError::DegenerateMask));

        let mut fallback = FragmentRecord::placeholder(5, 5, 2);
        fallback.translate(10, 10);
        assert_eq!(fallback.center, [15.0, 15.0]);
        assert!(fallback.geometry.is_empty());
    }
}
