//! Data model: shape observations and the canonical template.
//!
//! A [`ShapeObservation`] is a single raw detection from the vector or
//! raster pass. An [`ExtractedTemplate`] is the canonical, idealized grid
//! description produced by inference or synthesis; it is immutable after
//! construction and its `centers_pt` are always row-major.

use std::collections::BTreeMap;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::geometry;

/// Geometric class of a detected or synthesized label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Rectangle,
    Circle,
}

/// Grid arrangement recorded on a template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridKind {
    /// Regular rows x columns grid (extraction always produces this).
    Rectangular,
    /// Square-packed circle lattice.
    CircleSimple,
    /// Hexagonally close-packed circle lattice.
    CircleClose,
}

/// A single raw detection in page coordinates (points).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeObservation {
    pub center: Point2<f64>,
    pub kind: ShapeKind,
    /// Width in points; equals the diameter for circles.
    pub width_pt: f64,
    /// Height in points; equals the diameter for circles.
    pub height_pt: f64,
    /// Estimated corner radius; `None` when not estimable.
    pub corner_radius_pt: Option<f64>,
}

impl ShapeObservation {
    pub fn rectangle(
        center: Point2<f64>,
        width_pt: f64,
        height_pt: f64,
        corner_radius_pt: Option<f64>,
    ) -> Self {
        Self {
            center,
            kind: ShapeKind::Rectangle,
            width_pt,
            height_pt,
            corner_radius_pt,
        }
    }

    pub fn circle(center: Point2<f64>, diameter_pt: f64) -> Self {
        Self {
            center,
            kind: ShapeKind::Circle,
            width_pt: diameter_pt,
            height_pt: diameter_pt,
            corner_radius_pt: None,
        }
    }
}

/// Physical page description in PDF points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageMetrics {
    pub width_pt: f64,
    pub height_pt: f64,
}

impl PageMetrics {
    pub fn new(width_pt: f64, height_pt: f64) -> Result<Self, DomainError> {
        if !(width_pt.is_finite() && width_pt > 0.0) {
            return Err(DomainError::NonPositivePageWidth(width_pt));
        }
        if !(height_pt.is_finite() && height_pt > 0.0) {
            return Err(DomainError::NonPositive {
                name: "page height",
                value: height_pt,
            });
        }
        Ok(Self {
            width_pt,
            height_pt,
        })
    }
}

/// Grid counts, spacing, and per-row layout metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridMetrics {
    pub kind: GridKind,
    pub rows: usize,
    pub cols: usize,
    /// Median center-to-center spacing along columns.
    pub dx_pt: f64,
    /// Median center-to-center spacing along rows (row pitch for hex).
    pub dy_pt: f64,
    /// Horizontal shift per row; empty for plain rectangular grids,
    /// alternating `0 / dx/2` for close packing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub row_offsets_pt: Vec<f64>,
    /// Present only when rows hold different column counts (ragged hex).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns_per_row: Option<Vec<usize>>,
}

impl GridMetrics {
    fn validate(&self) -> Result<(), DomainError> {
        if self.rows == 0 {
            return Err(DomainError::NonPositive {
                name: "grid rows",
                value: self.rows as f64,
            });
        }
        if self.cols == 0 {
            return Err(DomainError::NonPositive {
                name: "grid columns",
                value: self.cols as f64,
            });
        }
        if !(self.dx_pt.is_finite() && self.dx_pt > 0.0) {
            return Err(DomainError::NonPositive {
                name: "grid dx",
                value: self.dx_pt,
            });
        }
        if !(self.dy_pt.is_finite() && self.dy_pt > 0.0) {
            return Err(DomainError::NonPositive {
                name: "grid dy",
                value: self.dy_pt,
            });
        }
        Ok(())
    }

    /// Total number of centers this grid describes.
    pub fn expected_centers(&self) -> usize {
        match &self.columns_per_row {
            Some(counts) => counts.iter().sum(),
            None => self.rows * self.cols,
        }
    }
}

/// Geometric description of an individual label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelGeometry {
    pub shape: ShapeKind,
    pub width_pt: f64,
    pub height_pt: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius_pt: Option<f64>,
}

impl LabelGeometry {
    pub fn rectangle(width_pt: f64, height_pt: f64, corner_radius_pt: Option<f64>) -> Self {
        Self {
            shape: ShapeKind::Rectangle,
            width_pt,
            height_pt,
            corner_radius_pt,
        }
    }

    pub fn circle(diameter_pt: f64) -> Self {
        Self {
            shape: ShapeKind::Circle,
            width_pt: diameter_pt,
            height_pt: diameter_pt,
            corner_radius_pt: None,
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        if !(self.width_pt.is_finite() && self.width_pt > 0.0) {
            return Err(DomainError::NonPositive {
                name: "label width",
                value: self.width_pt,
            });
        }
        if !(self.height_pt.is_finite() && self.height_pt > 0.0) {
            return Err(DomainError::NonPositive {
                name: "label height",
                value: self.height_pt,
            });
        }
        Ok(())
    }

    /// Diameter in points; only meaningful for circular labels.
    pub fn diameter_pt(&self) -> f64 {
        self.width_pt
    }
}

/// Centers of the first and last row's first column.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnchorPoints {
    pub top_left_pt: Point2<f64>,
    pub bottom_left_pt: Point2<f64>,
}

const ANCHOR_EPS: f64 = 1e-6;

/// Canonical, immutable description of a label grid.
///
/// Produced atomically by the inference engine or the lattice synthesizer.
/// `centers_pt` is row-major: ascending row (top to bottom), then ascending
/// column within a row. Two templates built from the same inputs are
/// bit-identical.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTemplate {
    pub page: PageMetrics,
    pub grid: GridMetrics,
    pub label: LabelGeometry,
    pub anchors: AnchorPoints,
    pub centers_pt: Vec<Point2<f64>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl ExtractedTemplate {
    /// Build a template, sorting centers row-major and checking the
    /// count/anchor invariants.
    pub fn new(
        page: PageMetrics,
        grid: GridMetrics,
        label: LabelGeometry,
        anchors: AnchorPoints,
        mut centers_pt: Vec<Point2<f64>>,
        metadata: BTreeMap<String, String>,
    ) -> Result<Self, DomainError> {
        grid.validate()?;
        label.validate()?;
        let expected = grid.expected_centers();
        if centers_pt.len() != expected {
            return Err(DomainError::CenterCountMismatch {
                expected,
                actual: centers_pt.len(),
            });
        }
        geometry::ensure_row_major(&mut centers_pt);

        let first = centers_pt[0];
        if (first - anchors.top_left_pt).norm() > ANCHOR_EPS {
            return Err(DomainError::AnchorMismatch { name: "top_left" });
        }
        let last_row_start = match &grid.columns_per_row {
            Some(counts) => expected - counts[counts.len() - 1],
            None => expected - grid.cols,
        };
        if (centers_pt[last_row_start] - anchors.bottom_left_pt).norm() > ANCHOR_EPS {
            return Err(DomainError::AnchorMismatch {
                name: "bottom_left",
            });
        }

        Ok(Self {
            page,
            grid,
            label,
            anchors,
            centers_pt,
            metadata,
        })
    }

    pub fn centers_count(&self) -> usize {
        self.centers_pt.len()
    }

    pub fn iter_centers(&self) -> impl Iterator<Item = &Point2<f64>> {
        self.centers_pt.iter()
    }
}
