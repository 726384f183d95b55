//! Grid inference: noisy shape observations -> canonical template.
//!
//! Rows are clustered on y, columns on x within each row, spacing and label
//! size are aggregated with medians, and the exported centers are
//! regenerated as a perfectly regular grid from the top-left anchor and the
//! median pitches. Raw detections never leave this module: regeneration is
//! what gives downstream consumers sub-point accuracy and bit-identical
//! output for identical input.

pub mod cluster;

use std::collections::BTreeMap;

use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::{Axis, DomainError, GridInferenceError};
use crate::stats::median;
use crate::types::{
    AnchorPoints, ExtractedTemplate, GridKind, GridMetrics, LabelGeometry, PageMetrics,
    ShapeKind, ShapeObservation,
};
use cluster::{cluster_axis, AxisCluster};

/// Tolerances for grid inference.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct InferParams {
    /// Minimum number of rows required for a valid grid.
    pub min_rows: usize,
    /// Minimum number of columns required for a valid grid.
    pub min_cols: usize,
    /// Maximum relative deviation of any clustered gap from the median
    /// pitch before the input is rejected as non-grid.
    pub spacing_tol: f64,
    /// Absolute floor (points) separating jitter from real pitch gaps.
    pub gap_floor_pt: f64,
    /// Size-relative floor: fraction of the median label extent.
    pub gap_floor_size_frac: f64,
}

impl Default for InferParams {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_cols: 2,
            spacing_tol: 0.25,
            gap_floor_pt: 0.5,
            gap_floor_size_frac: 0.25,
        }
    }
}

/// Infer a canonical template from shape observations with default
/// tolerances.
pub fn infer_template(
    observations: &[ShapeObservation],
    page_width_pt: f64,
    page_height_pt: f64,
) -> Result<ExtractedTemplate, GridInferenceError> {
    infer_template_with(
        observations,
        page_width_pt,
        page_height_pt,
        &InferParams::default(),
    )
}

/// Infer a canonical template from shape observations.
pub fn infer_template_with(
    observations: &[ShapeObservation],
    page_width_pt: f64,
    page_height_pt: f64,
    params: &InferParams,
) -> Result<ExtractedTemplate, GridInferenceError> {
    if observations.is_empty() {
        return Err(GridInferenceError::NoObservations);
    }
    let page = PageMetrics::new(page_width_pt, page_height_pt)?;

    let kind = observations[0].kind;
    if observations.iter().any(|o| o.kind != kind) {
        return Err(GridInferenceError::MixedShapeKinds);
    }
    for obs in observations {
        validate_observation(obs)?;
    }

    let widths: Vec<f64> = observations.iter().map(|o| o.width_pt).collect();
    let heights: Vec<f64> = observations.iter().map(|o| o.height_pt).collect();
    let width_med = median(&widths).expect("non-empty widths");
    let height_med = median(&heights).expect("non-empty heights");

    // Row clustering on y.
    let gap_floor_y = (params.gap_floor_size_frac * height_med).max(params.gap_floor_pt);
    let ys: Vec<(usize, f64)> = observations
        .iter()
        .enumerate()
        .map(|(i, o)| (i, o.center.y))
        .collect();
    let rows = cluster_axis(&ys, gap_floor_y);
    if rows.len() < params.min_rows {
        return Err(GridInferenceError::TooFewRows {
            rows: rows.len(),
            min: params.min_rows,
        });
    }

    // Column clustering on x, per row.
    let gap_floor_x = (params.gap_floor_size_frac * width_med).max(params.gap_floor_pt);
    let row_columns: Vec<Vec<AxisCluster>> = rows
        .iter()
        .map(|row| {
            let xs: Vec<(usize, f64)> = row
                .members
                .iter()
                .map(|&i| (i, observations[i].center.x))
                .collect();
            cluster_axis(&xs, gap_floor_x)
        })
        .collect();

    let cols = modal_column_count(&row_columns);
    if cols < params.min_cols {
        return Err(GridInferenceError::TooFewColumns {
            cols,
            min: params.min_cols,
        });
    }
    debug!(
        "infer: {} row(s), modal column count {}",
        rows.len(),
        cols
    );

    // Median pitches from consecutive gaps.
    let mut dx_gaps = Vec::new();
    for columns in &row_columns {
        for pair in columns.windows(2) {
            dx_gaps.push(pair[1].rep - pair[0].rep);
        }
    }
    let dx = median(&dx_gaps).expect("at least one row holds two columns");

    let row_reps: Vec<f64> = rows.iter().map(|r| r.rep).collect();
    let dy_gaps: Vec<f64> = row_reps.windows(2).map(|p| p[1] - p[0]).collect();
    let dy = median(&dy_gaps).expect("at least two rows");

    check_spacing(&dx_gaps, dx, Axis::Horizontal, params.spacing_tol)?;
    check_spacing(&dy_gaps, dy, Axis::Vertical, params.spacing_tol)?;

    // Column origin: rows missing their leftmost label vote for the origin
    // through pitch snapping, so one occluded corner cannot shift the grid.
    let first_cols: Vec<f64> = row_columns.iter().map(|c| c[0].rep).collect();
    let x_ref = median(&first_cols).expect("non-empty rows");
    let origin_votes: Vec<f64> = first_cols
        .iter()
        .map(|&xf| xf - ((xf - x_ref) / dx).round() * dx)
        .collect();
    let x0 = median(&origin_votes).expect("non-empty votes");
    let y0 = row_reps[0];

    // Label geometry.
    let label = match kind {
        ShapeKind::Rectangle => {
            let radii: Vec<f64> = observations
                .iter()
                .filter_map(|o| o.corner_radius_pt)
                .collect();
            LabelGeometry::rectangle(width_med, height_med, median(&radii))
        }
        ShapeKind::Circle => LabelGeometry::circle(width_med),
    };

    // A clustered row sitting two pitches below its predecessor is a fully
    // occluded row; snapping reps to pitch indices re-inserts it.
    let n_rows = row_reps
        .iter()
        .map(|&y| ((y - y0) / dy).round().max(0.0) as usize)
        .max()
        .unwrap_or(0)
        + 1;

    // Idealized regular grid; raw detections are discarded here.
    let mut centers = Vec::with_capacity(n_rows * cols);
    for r in 0..n_rows {
        let y = y0 + r as f64 * dy;
        for c in 0..cols {
            centers.push(Point2::new(x0 + c as f64 * dx, y));
        }
    }

    let anchors = AnchorPoints {
        top_left_pt: Point2::new(x0, y0),
        bottom_left_pt: Point2::new(x0, y0 + (n_rows - 1) as f64 * dy),
    };

    let grid = GridMetrics {
        kind: GridKind::Rectangular,
        rows: n_rows,
        cols,
        dx_pt: dx,
        dy_pt: dy,
        row_offsets_pt: Vec::new(),
        columns_per_row: None,
    };

    let template = ExtractedTemplate::new(page, grid, label, anchors, centers, BTreeMap::new())
        .map_err(GridInferenceError::Domain)?;
    Ok(template)
}

fn validate_observation(obs: &ShapeObservation) -> Result<(), GridInferenceError> {
    if !(obs.width_pt.is_finite() && obs.width_pt > 0.0) {
        return Err(DomainError::NonPositive {
            name: "observation width",
            value: obs.width_pt,
        }
        .into());
    }
    if !(obs.height_pt.is_finite() && obs.height_pt > 0.0) {
        return Err(DomainError::NonPositive {
            name: "observation height",
            value: obs.height_pt,
        }
        .into());
    }
    if !(obs.center.x.is_finite() && obs.center.y.is_finite()) {
        return Err(DomainError::NonFinite {
            name: "observation center",
            value: if obs.center.x.is_finite() {
                obs.center.y
            } else {
                obs.center.x
            },
        }
        .into());
    }
    Ok(())
}

/// Most frequent per-row column count; ties resolve to the larger count.
fn modal_column_count(row_columns: &[Vec<AxisCluster>]) -> usize {
    let mut frequency: BTreeMap<usize, usize> = BTreeMap::new();
    for columns in row_columns {
        *frequency.entry(columns.len()).or_insert(0) += 1;
    }
    let mut best = 0usize;
    let mut best_freq = 0usize;
    for (&count, &freq) in &frequency {
        if freq >= best_freq {
            best = count;
            best_freq = freq;
        }
    }
    best
}

/// Reject non-grid spacing.
///
/// Each clustered gap must sit close to an integer multiple of the median
/// pitch; a doubled gap (one occluded label) is legal, a gap at 1.5 pitches
/// is not. `observed` in the error is the worst relative residual.
fn check_spacing(
    gaps: &[f64],
    pitch: f64,
    axis: Axis,
    tolerance: f64,
) -> Result<(), GridInferenceError> {
    if pitch <= 0.0 {
        return Err(GridInferenceError::IrregularSpacing {
            axis,
            observed: f64::INFINITY,
            tolerance,
            pitch,
        });
    }
    let observed = gaps
        .iter()
        .map(|g| {
            let multiple = (g / pitch).round().max(1.0);
            (g - multiple * pitch).abs() / pitch
        })
        .fold(0.0f64, f64::max);
    if observed > tolerance {
        return Err(GridInferenceError::IrregularSpacing {
            axis,
            observed,
            tolerance,
            pitch,
        });
    }
    Ok(())
}
