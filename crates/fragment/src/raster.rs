//! Raster loading and mask derivation.
//!
//! Fragments are scanned front/back image pairs with an alpha channel; the
//! alpha channel is the only thing the geometry core cares about. The back
//! raster lives next to the front one under a fixed naming convention and
//! is optional.

use std::path::{Path, PathBuf};

use image::{GrayImage, RgbaImage};
use imageproc::contrast::{ThresholdType, threshold};
use tracing::warn;

use crate::error::Result;

/// Load an RGBA raster from disk.
pub fn load_rgba(path: impl AsRef<Path>) -> Result<RgbaImage> {
    Ok(image::open(path.as_ref())?.to_rgba8())
}

/// Derive the back-side raster path: `_back` inserted before the file
/// extension, e.g. `piece01.png` -> `piece01_back.png`.
pub fn back_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{stem}_back");
    if let Some(ext) = path.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    path.with_file_name(name)
}

/// Load the back raster for a front raster path, if present.
///
/// Absence is not an error: a missing back scan is logged and the
/// fragment proceeds front-only.
pub fn load_back_rgba(front_path: impl AsRef<Path>) -> Option<RgbaImage> {
    let back = back_path(front_path.as_ref());
    match image::open(&back) {
        Ok(img) => Some(img.to_rgba8()),
        Err(err) => {
            warn!(path = %back.display(), %err, "back raster missing, using front only");
            None
        }
    }
}

/// Binary opacity mask of a raster: 255 where alpha > 0, else 0.
pub fn opacity_mask(image: &RgbaImage) -> GrayImage {
    let (w, h) = image.dimensions();
    let alpha = GrayImage::from_fn(w, h, |x, y| image::Luma([image.get_pixel(x, y).0[3]]));
    threshold(&alpha, 0, ThresholdType::Binary)
}

/// Centroid of a mask's opaque region, from the first raw moments.
///
/// Fails with [`FragmentError::DegenerateMask`] on an all-zero mask; the
/// zeroth moment is the divisor and must not be zero.
///
/// [`FragmentError::DegenerateMask`]: crate::error::FragmentError::DegenerateMask
pub fn mask_centroid(mask: &GrayImage) -> Result<[f32; 2]> {
    let mut m00: u64 = 0;
    let mut m10: u64 = 0;
    let mut m01: u64 = 0;

    for (x, y, px) in mask.enumerate_pixels() {
        if px.0[0] > 0 {
            m00 += 1;
            m10 += x as u64;
            m01 += y as u64;
        }
    }

    if m00 == 0 {
        return Err(crate::error::FragmentError::DegenerateMask);
    }

    Ok([m10 as f32 / m00 as f32, m01 as f32 / m00 as f32])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FragmentError;
    use image::{Luma, Rgba};

    #[test]
    fn back_path_inserts_suffix_before_extension() {
        assert_eq!(back_path("piece01.png"), PathBuf::from("piece01_back.png"));
        assert_eq!(
            back_path("scans/recto.tiff"),
            PathBuf::from("scans/recto_back.tiff")
        );
    }

    #[test]
    fn opacity_mask_follows_alpha() {
        let mut img = RgbaImage::new(4, 4);
        img.put_pixel(1, 2, Rgba([10, 20, 30, 128]));
        img.put_pixel(3, 0, Rgba([0, 0, 0, 1]));

        let mask = opacity_mask(&img);
        assert_eq!(mask.get_pixel(1, 2), &Luma([255u8]));
        assert_eq!(mask.get_pixel(3, 0), &Luma([255u8]));
        assert_eq!(mask.get_pixel(0, 0), &Luma([0u8]));
    }

    #[test]
    fn centroid_of_uniform_square() {
        let mut mask = GrayImage::new(10, 10);
        for y in 2..6 {
            for x in 4..8 {
                mask.put_pixel(x, y, Luma([255u8]));
            }
        }
        let c = mask_centroid(&mask).unwrap();
        assert_eq!(c, [5.5, 3.5]);
    }

    #[test]
    fn centroid_of_empty_mask_is_rejected() {
        let mask = GrayImage::new(8, 8);
        let err = mask_centroid(&mask).unwrap_err();
        assert!(matches!(err, FragmentError::DegenerateMask));
    }
}
