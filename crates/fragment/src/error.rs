use thiserror::Error;

#[derive(Error, Debug)]
pub enum FragmentError {
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Degenerate mask: zero opaque area, centroid is undefined")]
    DegenerateMask,

    #[error("Empty contour: no outer boundary could be traced from the mask")]
    EmptyContour,

    #[error("No fragment with id {0}")]
    UnknownFragment(u32),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

pub type Result<T> = std::result::Result<T, FragmentError>;
