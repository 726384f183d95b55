//! Vector-pass shape parser.
//!
//! Consumes a page's closed vector paths (as produced by a PDF reader) and
//! classifies each into a rectangle or circle observation. Paths that are
//! neither are discarded; documents routinely carry decorative marks.
//!
//! Output order follows document draw order. An empty result is the defined
//! "no vector content" outcome that tells the caller to fall back to the
//! raster pass; it is not an error.

mod classify;
#[cfg(test)]
mod tests;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::types::{PageMetrics, ShapeObservation};

pub use classify::classify_path;

/// One drawing primitive of a path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PathSegment {
    /// Straight segment.
    Line {
        from: Point2<f64>,
        to: Point2<f64>,
    },
    /// Cubic Bezier segment.
    Cubic {
        from: Point2<f64>,
        ctrl1: Point2<f64>,
        ctrl2: Point2<f64>,
        to: Point2<f64>,
    },
    /// Explicit axis-aligned rectangle op (`re` in PDF content streams).
    Rect {
        min: Point2<f64>,
        max: Point2<f64>,
    },
}

/// A stroked or filled path from the source document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VectorPath {
    pub segments: Vec<PathSegment>,
    #[serde(default)]
    pub closed: bool,
}

/// Tolerances for path classification.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorParams {
    /// Maximum deviation from the axes for rectangle sides, degrees.
    pub axis_angle_tol_deg: f64,
    /// Fraction of each bounding-box side that straight runs must cover
    /// for the rectangle classification.
    pub side_cover_min: f64,
    /// Relative radius deviation allowed for the circle fit.
    pub circle_fit_tol: f64,
    /// Shapes with a bounding box thinner than this (points) are noise.
    pub min_extent_pt: f64,
}

impl Default for VectorParams {
    fn default() -> Self {
        Self {
            axis_angle_tol_deg: 2.0,
            side_cover_min: 0.3,
            circle_fit_tol: 0.05,
            min_extent_pt: 4.0,
        }
    }
}

/// Classify every path of a page into shape observations.
///
/// Observations whose center falls outside the page bounds are dropped.
pub fn parse_shapes(
    paths: &[VectorPath],
    page: PageMetrics,
    params: &VectorParams,
) -> Vec<ShapeObservation> {
    paths
        .iter()
        .filter_map(|path| classify_path(path, params))
        .filter(|obs| in_page(obs.center, page))
        .collect()
}

fn in_page(center: Point2<f64>, page: PageMetrics) -> bool {
    center.x >= 0.0 && center.x <= page.width_pt && center.y >= 0.0 && center.y <= page.height_pt
}
