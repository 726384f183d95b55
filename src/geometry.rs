//! Coordinate-space conversions and circle-lattice spacing formulas.
//!
//! All page coordinates in this crate are PDF points (1/72 in) with a
//! top-left origin. The percent-of-width space scales *both* axes by page
//! width; downstream consumers align label content horizontally and
//! vertically with the same scale factor, so `y_pct = 100 * y_pt / page_w_pt`
//! even on non-square pages. That asymmetry is a contract, not a bug.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const POINTS_PER_INCH: f64 = 72.0;
pub const MM_PER_INCH: f64 = 25.4;

fn validate_page_width(page_width_pt: f64) -> Result<(), DomainError> {
    if !page_width_pt.is_finite() {
        return Err(DomainError::NonFinite {
            name: "page width",
            value: page_width_pt,
        });
    }
    if page_width_pt <= 0.0 {
        return Err(DomainError::NonPositivePageWidth(page_width_pt));
    }
    Ok(())
}

/// Scale a point from PDF points into percent-of-page-width space.
///
/// Both components are divided by the page *width*.
pub fn percent_of_width(
    point: Point2<f64>,
    page_width_pt: f64,
) -> Result<Point2<f64>, DomainError> {
    validate_page_width(page_width_pt)?;
    let scale = 100.0 / page_width_pt;
    Ok(Point2::new(point.x * scale, point.y * scale))
}

/// Inverse of [`percent_of_width`].
pub fn from_percent_of_width(
    point: Point2<f64>,
    page_width_pt: f64,
) -> Result<Point2<f64>, DomainError> {
    validate_page_width(page_width_pt)?;
    let scale = page_width_pt / 100.0;
    Ok(Point2::new(point.x * scale, point.y * scale))
}

/// Convert PDF points to inches.
#[inline]
pub fn points_to_inches(value_pt: f64) -> f64 {
    value_pt / POINTS_PER_INCH
}

/// Convert PDF points to millimetres.
#[inline]
pub fn points_to_mm(value_pt: f64) -> f64 {
    points_to_inches(value_pt) * MM_PER_INCH
}

/// Convert inches to PDF points.
#[inline]
pub fn inches_to_points(value_in: f64) -> f64 {
    value_in * POINTS_PER_INCH
}

/// Convert millimetres to PDF points.
#[inline]
pub fn mm_to_points(value_mm: f64) -> f64 {
    value_mm * POINTS_PER_INCH / MM_PER_INCH
}

/// Sort points into row-major order: ascending y, then ascending x.
pub fn ensure_row_major(points: &mut [Point2<f64>]) {
    points.sort_by(|a, b| {
        (a.y, a.x)
            .partial_cmp(&(b.y, b.x))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Circle lattice packing style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CircleLayout {
    /// Square packing: the same pitch on both axes.
    Simple,
    /// Hexagonal close packing: row pitch shrinks by sqrt(3)/2 and
    /// alternating rows shift by half the column pitch.
    Close,
}

/// Center-to-center pitches for a circle lattice.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircleLattice {
    pub pitch_x_pt: f64,
    pub pitch_y_pt: f64,
    pub row_offset_pt: f64,
}

/// Compute lattice pitches for the requested layout.
///
/// Column pitch is `diameter + gap` for both layouts; close packing reduces
/// the row pitch to `(diameter + gap) * sqrt(3)/2` and offsets odd rows by
/// half the column pitch.
pub fn circle_lattice(
    layout: CircleLayout,
    diameter_pt: f64,
    gap_pt: f64,
) -> Result<CircleLattice, DomainError> {
    if !(diameter_pt.is_finite() && diameter_pt > 0.0) {
        return Err(DomainError::NonPositive {
            name: "circle diameter",
            value: diameter_pt,
        });
    }
    if !gap_pt.is_finite() || gap_pt < 0.0 {
        return Err(DomainError::Negative {
            name: "circle gap",
            value: gap_pt,
        });
    }
    let pitch_x = diameter_pt + gap_pt;
    Ok(match layout {
        CircleLayout::Simple => CircleLattice {
            pitch_x_pt: pitch_x,
            pitch_y_pt: pitch_x,
            row_offset_pt: 0.0,
        },
        CircleLayout::Close => CircleLattice {
            pitch_x_pt: pitch_x,
            pitch_y_pt: 3.0_f64.sqrt() * pitch_x / 2.0,
            row_offset_pt: pitch_x / 2.0,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_of_width_scales_y_by_width() {
        // Non-square page: the divisor for y is still the width.
        let p = percent_of_width(Point2::new(306.0, 396.0), 612.0).unwrap();
        assert!((p.x - 50.0).abs() < 1e-12);
        assert!((p.y - 396.0 * 100.0 / 612.0).abs() < 1e-12);
        assert!((p.y - 50.0).abs() > 1.0, "y must not be divided by height");
    }

    #[test]
    fn percent_round_trip_is_exact_within_tolerance() {
        let original = Point2::new(115.2, 90.0);
        let pct = percent_of_width(original, 612.0).unwrap();
        let back = from_percent_of_width(pct, 612.0).unwrap();
        assert!((back.x - original.x).abs() / original.x < 1e-9);
        assert!((back.y - original.y).abs() / original.y < 1e-9);
    }

    #[test]
    fn percent_of_width_rejects_bad_page_width() {
        assert!(matches!(
            percent_of_width(Point2::new(1.0, 1.0), 0.0),
            Err(DomainError::NonPositivePageWidth(_))
        ));
        assert!(percent_of_width(Point2::new(1.0, 1.0), -3.0).is_err());
    }

    #[test]
    fn unit_conversions_match_definitions() {
        assert!((points_to_inches(72.0) - 1.0).abs() < 1e-12);
        assert!((points_to_mm(72.0) - 25.4).abs() < 1e-12);
        assert!((inches_to_points(2.0) - 144.0).abs() < 1e-12);
        assert!((mm_to_points(25.4) - 72.0).abs() < 1e-12);
    }

    #[test]
    fn close_lattice_shrinks_row_pitch() {
        let simple = circle_lattice(CircleLayout::Simple, 40.0, 4.0).unwrap();
        let close = circle_lattice(CircleLayout::Close, 40.0, 4.0).unwrap();
        assert!((simple.pitch_x_pt - 44.0).abs() < 1e-12);
        assert!((simple.pitch_y_pt - 44.0).abs() < 1e-12);
        assert!((close.pitch_x_pt - 44.0).abs() < 1e-12);
        assert!((close.pitch_y_pt - 44.0 * 3.0_f64.sqrt() / 2.0).abs() < 1e-12);
        assert!((close.row_offset_pt - 22.0).abs() < 1e-12);
    }

    #[test]
    fn row_major_sort_orders_rows_before_columns() {
        let mut pts = vec![
            Point2::new(10.0, 20.0),
            Point2::new(5.0, 10.0),
            Point2::new(1.0, 20.0),
            Point2::new(30.0, 10.0),
        ];
        ensure_row_major(&mut pts);
        assert_eq!(pts[0], Point2::new(5.0, 10.0));
        assert_eq!(pts[1], Point2::new(30.0, 10.0));
        assert_eq!(pts[2], Point2::new(1.0, 20.0));
        assert_eq!(pts[3], Point2::new(10.0, 20.0));
    }
}
