#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod error;
pub mod export;
pub mod geometry;
pub mod infer;
pub mod lattice;
pub mod types;

// Detection passes – public, but considered unstable internals.
pub mod raster;
pub mod stats;
pub mod vector;

// --- High-level re-exports -------------------------------------------------

// Main entry points: inference + synthesis and their results.
pub use crate::infer::{infer_template, infer_template_with, InferParams};
pub use crate::lattice::{synthesize_circles, Margins};
pub use crate::types::{ExtractedTemplate, ShapeKind, ShapeObservation};

// Error taxonomy surfaced by the entry points.
pub use crate::error::{DomainError, GridInferenceError, LayoutError};

// Detection passes feeding the inference engine.
pub use crate::raster::{detect_shapes, PageRaster, RasterParams};
pub use crate::vector::{parse_shapes, VectorParams, VectorPath};

// Projection helpers generally useful to consumers.
pub use crate::export::CoordSpace;
pub use crate::geometry::CircleLayout;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use grid_templator::prelude::*;
///
/// # fn main() -> Result<(), LayoutError> {
/// let template = synthesize_circles(
///     CircleLayout::Close,
///     612.0,
///     792.0,
///     90.0,
///     Margins::uniform(36.0),
///     6.0,
///     None,
///     None,
/// )?;
/// println!("{} circles", template.centers_count());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::error::{DomainError, GridInferenceError, LayoutError};
    pub use crate::export::CoordSpace;
    pub use crate::geometry::CircleLayout;
    pub use crate::raster::{detect_shapes, PageRaster, RasterParams};
    pub use crate::types::{ExtractedTemplate, ShapeKind, ShapeObservation};
    pub use crate::vector::{parse_shapes, VectorParams, VectorPath};
    pub use crate::{infer_template, infer_template_with, synthesize_circles, InferParams, Margins};
}
