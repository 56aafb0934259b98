//! The per-fragment data record.
//!
//! A [`FragmentRecord`] holds a fragment's identity, its placement on the
//! shared canvas (bounding box plus mask centroid) and its shape (outer
//! contour plus holes), all in world coordinates. Geometry is derived
//! from the alpha channel of the front raster and re-derived whenever a
//! raster is (re)established.

use std::path::Path;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    algorithms::StandardExtractor,
    error::Result,
    raster,
    types::{BoundingBox, FragmentGeometry},
};

/// Group id of fragments not assigned to any group.
pub const UNGROUPED: i32 = -1;

/// A papyrus fragment placed on the canvas.
#[derive(Debug, Clone, Default)]
pub struct FragmentRecord {
    pub id: u32,
    /// Path of the front raster; empty for placeholder fragments.
    pub source_path: String,
    pub group_id: i32,
    pub note: String,
    /// Placement box in world coordinates; width/height are the raster
    /// dimensions (zero when no raster is loaded).
    pub bbox: BoundingBox,
    /// Mask centroid in world coordinates (not the box center).
    pub center: [f32; 2],
    pub geometry: FragmentGeometry,
    /// Open extension mapping, opaque to the core and not serialized.
    pub user_data: Map<String, Value>,

    image: Option<RgbaImage>,
    back_image: Option<RgbaImage>,
}

impl FragmentRecord {
    /// A fragment with no raster: zero-sized box at the offset, center at
    /// the offset, empty geometry. Used for deferred loads and for
    /// fragments whose extraction failed but must stay representable.
    pub fn placeholder(offset_x: i32, offset_y: i32, id: u32) -> Self {
        Self {
            id,
            group_id: UNGROUPED,
            bbox: BoundingBox::new(offset_x, offset_y, 0, 0),
            center: [offset_x as f32, offset_y as f32],
            ..Self::default()
        }
    }

    /// Load a fragment from disk and place it at the given world offset.
    ///
    /// The back raster is looked up via the `_back` naming convention and
    /// is optional. An empty path yields a placeholder.
    pub fn from_path(
        path: impl AsRef<Path>,
        offset_x: i32,
        offset_y: i32,
        id: u32,
    ) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Ok(Self::placeholder(offset_x, offset_y, id));
        }

        let image = raster::load_rgba(path)?;
        let back_image = raster::load_back_rgba(path);
        Self::from_image(
            image,
            back_image,
            path.to_string_lossy().into_owned(),
            offset_x,
            offset_y,
            id,
        )
    }

    /// Build a fragment from an already-decoded raster pair.
    pub fn from_image(
        image: RgbaImage,
        back_image: Option<RgbaImage>,
        source_path: String,
        offset_x: i32,
        offset_y: i32,
        id: u32,
    ) -> Result<Self> {
        let (w, h) = image.dimensions();
        let mut record = Self {
            id,
            source_path,
            group_id: UNGROUPED,
            bbox: BoundingBox::new(offset_x, offset_y, w, h),
            center: [offset_x as f32, offset_y as f32],
            image: Some(image),
            back_image,
            ..Self::default()
        };
        record.rebuild_geometry()?;
        Ok(record)
    }

    pub fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    pub fn back_image(&self) -> Option<&RgbaImage> {
        self.back_image.as_ref()
    }

    pub fn has_back(&self) -> bool {
        self.back_image.is_some()
    }

    /// Re-derive centroid and contours from the loaded raster's mask.
    ///
    /// No-op when no raster is loaded. Errors from centroid computation
    /// (all-transparent raster) and contour tracing propagate untouched;
    /// the record's previous geometry is left in place in that case.
    pub fn rebuild_geometry(&mut self) -> Result<()> {
        self.rebuild_geometry_with(&StandardExtractor::default())
    }

    /// Like [`rebuild_geometry`](Self::rebuild_geometry), with a custom
    /// extractor configuration.
    pub fn rebuild_geometry_with<T, S>(
        &mut self,
        extractor: &crate::algorithms::ContourExtractor<T, S>,
    ) -> Result<()>
    where
        T: crate::traits::ContourTracer,
        S: crate::traits::RingSimplifier,
    {
        let Some(image) = &self.image else {
            return Ok(());
        };

        let mask = raster::opacity_mask(image);
        let local_center = raster::mask_centroid(&mask)?;

        let mut geometry = extractor.extract(&mask)?;
        geometry.translate(self.bbox.x as f32, self.bbox.y as f32);

        self.center = [
            local_center[0] + self.bbox.x as f32,
            local_center[1] + self.bbox.y as f32,
        ];
        self.geometry = geometry;

        debug!(
            id = self.id,
            points = self.geometry.outer.len(),
            holes = self.geometry.holes.len(),
            "rebuilt fragment geometry"
        );
        Ok(())
    }

    /// Move the fragment by `(dx, dy)` on the canvas.
    ///
    /// Center, box offset, outer contour and every hole move by the same
    /// vector, atomically.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.center[0] += dx as f32;
        self.center[1] += dy as f32;
        self.bbox.translate(dx, dy);
        self.geometry.translate(dx as f32, dy as f32);
    }

    /// Move the fragment so its center lands on `(x, y)`.
    ///
    /// Implemented as a translation by the displacement from the current
    /// center, rounded to the canvas pixel grid, so the shape is
    /// preserved and all fields stay in one frame. The center ends within
    /// half a pixel of the target.
    pub fn set_position(&mut self, x: f32, y: f32) {
        let dx = (x - self.center[0]).round() as i32;
        let dy = (y - self.center[1]).round() as i32;
        self.translate(dx, dy);
    }

    /// Reload front/back rasters from `source_path`.
    ///
    /// Does NOT touch the stored geometry; call
    /// [`rebuild_geometry`](Self::rebuild_geometry) explicitly to
    /// re-derive it from the freshly loaded mask.
    pub fn reload_rasters(&mut self) -> Result<()> {
        if self.source_path.is_empty() {
            return Ok(());
        }
        self.image = Some(raster::load_rgba(&self.source_path)?);
        self.back_image = raster::load_back_rgba(&self.source_path);

        let (w, h) = self.image.as_ref().map(|i| i.dimensions()).unwrap_or((0, 0));
        self.bbox.width = w;
        self.bbox.height = h;
        Ok(())
    }

    /// Snapshot the record into the persistence schema.
    pub fn to_record(&self) -> SerializedFragment {
        SerializedFragment {
            filename: self.source_path.clone(),
            id: self.id,
            group_id: self.group_id,
            note: self.note.clone(),
            bbox: [
                self.bbox.y,
                self.bbox.x,
                self.bbox.width as i32,
                self.bbox.height as i32,
            ],
            center: self.center,
            contour: self.geometry.outer.clone(),
            inner_contours: self.geometry.holes.clone(),
        }
    }

    /// Rebuild a record from the persistence schema.
    ///
    /// Stored geometry is authoritative: no raster is loaded and nothing
    /// is re-derived here. Use [`reload_rasters`](Self::reload_rasters)
    /// followed by [`rebuild_geometry`](Self::rebuild_geometry) to opt
    /// into re-derivation from pixels.
    pub fn from_record(record: SerializedFragment) -> Self {
        let [top, left, width, height] = record.bbox;
        Self {
            id: record.id,
            source_path: record.filename,
            group_id: record.group_id,
            note: record.note,
            bbox: BoundingBox::new(left, top, width.max(0) as u32, height.max(0) as u32),
            center: record.center,
            geometry: FragmentGeometry {
                outer: record.contour,
                holes: record.inner_contours,
            },
            ..Self::default()
        }
    }
}

/// The plain key-value persistence schema of a fragment.
///
/// Key spellings and the `[top, left, width, height]` box order come from
/// the project file format and are fixed; the in-memory record uses
/// uniform `(x, y, width, height)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedFragment {
    pub filename: String,
    pub id: u32,
    #[serde(rename = "group id")]
    pub group_id: i32,
    pub note: String,
    pub bbox: [i32; 4],
    pub center: [f32; 2],
    pub contour: Vec<[f32; 2]>,
    #[serde(rename = "inner contours")]
    pub inner_contours: Vec<Vec<[f32; 2]>>,
}
