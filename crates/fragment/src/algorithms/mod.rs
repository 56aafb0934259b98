pub mod extraction;
pub mod simplification;
pub mod tracing;

pub use extraction::{ContourExtractor, StandardExtractor};
pub use simplification::DouglasPeuckerSimplifier;
pub use tracing::MarchingSquaresTracer;
