//! Circle lattice synthesis: a canonical template from layout parameters.
//!
//! No observations, no clustering; rows are laid out top to bottom at the
//! lattice pitch, each row re-derives its column count against the right
//! margin (close-packed odd rows start half a pitch in and may legitimately
//! hold one fewer column). The non-overlap and in-bounds guarantees are
//! verified on the finished center list, not assumed.

use std::collections::BTreeMap;

use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::{Axis, DomainError, LayoutError};
use crate::geometry::{circle_lattice, CircleLattice, CircleLayout};
use crate::types::{
    AnchorPoints, ExtractedTemplate, GridKind, GridMetrics, LabelGeometry, PageMetrics,
};

const EPSILON: f64 = 1e-9;

/// Page margins in points, clockwise from the top.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        for (value, name) in [
            (self.top, "margin top"),
            (self.right, "margin right"),
            (self.bottom, "margin bottom"),
            (self.left, "margin left"),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::Negative { name, value });
            }
        }
        Ok(())
    }
}

/// Synthesize a circle-lattice template.
///
/// `gap_pt` is the clearance between neighboring circle rims; `max_cols`
/// and `max_rows` cap the generated counts when provided.
#[allow(clippy::too_many_arguments)]
pub fn synthesize_circles(
    layout: CircleLayout,
    page_width_pt: f64,
    page_height_pt: f64,
    diameter_pt: f64,
    margins: Margins,
    gap_pt: f64,
    max_cols: Option<usize>,
    max_rows: Option<usize>,
) -> Result<ExtractedTemplate, LayoutError> {
    let lattice = circle_lattice(layout, diameter_pt, gap_pt).map_err(LayoutError::Domain)?;
    let page = PageMetrics::new(page_width_pt, page_height_pt).map_err(LayoutError::Domain)?;
    margins.validate()?;
    for (limit, name) in [(max_cols, "max_cols"), (max_rows, "max_rows")] {
        if let Some(0) = limit {
            return Err(DomainError::ZeroLimit { name, value: 0 }.into());
        }
    }

    usable_extent(page.width_pt, margins.left, margins.right, diameter_pt, Axis::Horizontal)?;
    usable_extent(page.height_pt, margins.top, margins.bottom, diameter_pt, Axis::Vertical)?;

    let radius = diameter_pt / 2.0;
    let start_x_base = margins.left + radius;
    let max_x = page.width_pt - margins.right - radius;
    let start_y = margins.top + radius;
    let max_y = page.height_pt - margins.bottom - radius;

    let mut centers: Vec<Point2<f64>> = Vec::new();
    let mut row_offsets: Vec<f64> = Vec::new();
    let mut columns_per_row: Vec<usize> = Vec::new();

    let mut attempted_row = 0usize;
    let mut added_rows = 0usize;
    loop {
        let y = start_y + attempted_row as f64 * lattice.pitch_y_pt;
        if y > max_y + EPSILON {
            break;
        }

        let offset = if layout == CircleLayout::Close && attempted_row % 2 == 1 {
            lattice.row_offset_pt
        } else {
            0.0
        };

        let x_start = start_x_base + offset;
        let available = max_x - x_start;
        if available < -EPSILON {
            attempted_row += 1;
            continue;
        }

        let mut row_cols = ((available + EPSILON) / lattice.pitch_x_pt).floor() as usize + 1;
        if let Some(cap) = max_cols {
            row_cols = row_cols.min(cap);
        }
        if row_cols == 0 {
            attempted_row += 1;
            continue;
        }

        row_offsets.push(offset);
        columns_per_row.push(row_cols);
        for column in 0..row_cols {
            centers.push(Point2::new(
                x_start + column as f64 * lattice.pitch_x_pt,
                y,
            ));
        }

        added_rows += 1;
        attempted_row += 1;
        if let Some(cap) = max_rows {
            if added_rows >= cap {
                break;
            }
        }
    }

    if centers.is_empty() {
        return Err(LayoutError::EmptyLattice);
    }
    debug!(
        "lattice: {} row(s), columns per row {:?}",
        columns_per_row.len(),
        columns_per_row
    );

    let template = build_template(
        layout,
        page,
        diameter_pt,
        gap_pt,
        &lattice,
        centers,
        row_offsets,
        columns_per_row,
    )?;
    verify_constraints(&template, margins, diameter_pt, gap_pt)?;
    Ok(template)
}

fn usable_extent(
    page_extent: f64,
    margin_a: f64,
    margin_b: f64,
    diameter_pt: f64,
    axis: Axis,
) -> Result<f64, LayoutError> {
    let usable = page_extent - margin_a - margin_b;
    if usable < diameter_pt - EPSILON {
        return Err(LayoutError::NoRoom {
            axis,
            usable,
            diameter: diameter_pt,
        });
    }
    Ok(usable)
}

#[allow(clippy::too_many_arguments)]
fn build_template(
    layout: CircleLayout,
    page: PageMetrics,
    diameter_pt: f64,
    gap_pt: f64,
    lattice: &CircleLattice,
    centers: Vec<Point2<f64>>,
    row_offsets: Vec<f64>,
    columns_per_row: Vec<usize>,
) -> Result<ExtractedTemplate, LayoutError> {
    let rows = columns_per_row.len();
    let cols = *columns_per_row.iter().max().unwrap_or(&0);
    let uniform = columns_per_row.iter().all(|&c| c == cols);

    let grid = GridMetrics {
        kind: match layout {
            CircleLayout::Simple => GridKind::CircleSimple,
            CircleLayout::Close => GridKind::CircleClose,
        },
        rows,
        cols,
        dx_pt: lattice.pitch_x_pt,
        dy_pt: lattice.pitch_y_pt,
        row_offsets_pt: row_offsets,
        columns_per_row: (!uniform).then_some(columns_per_row.clone()),
    };

    let leading: usize = columns_per_row[..rows - 1].iter().sum();
    let anchors = AnchorPoints {
        top_left_pt: centers[0],
        bottom_left_pt: centers[leading],
    };

    let mut metadata = BTreeMap::new();
    metadata.insert(
        "layout".to_string(),
        match layout {
            CircleLayout::Simple => "simple".to_string(),
            CircleLayout::Close => "close".to_string(),
        },
    );
    metadata.insert("gap_pt".to_string(), format!("{gap_pt:.6}"));

    ExtractedTemplate::new(
        page,
        grid,
        LabelGeometry::circle(diameter_pt),
        anchors,
        centers,
        metadata,
    )
    .map_err(LayoutError::Domain)
}

/// Check the construction guarantees on the finished template.
fn verify_constraints(
    template: &ExtractedTemplate,
    margins: Margins,
    diameter_pt: f64,
    gap_pt: f64,
) -> Result<(), LayoutError> {
    let radius = diameter_pt / 2.0;
    let min_x = margins.left + radius - EPSILON;
    let max_x = template.page.width_pt - margins.right - radius + EPSILON;
    let min_y = margins.top + radius - EPSILON;
    let max_y = template.page.height_pt - margins.bottom - radius + EPSILON;

    for c in template.iter_centers() {
        if !(min_x <= c.x && c.x <= max_x && min_y <= c.y && c.y <= max_y) {
            return Err(LayoutError::CenterOutOfBounds {
                x: c.x,
                y: c.y,
                min_x,
                max_x,
                min_y,
                max_y,
            });
        }
    }

    let required = diameter_pt + gap_pt - EPSILON;
    let centers = &template.centers_pt;
    for (i, a) in centers.iter().enumerate() {
        for b in &centers[i + 1..] {
            let distance = (b - a).norm();
            if distance < required {
                return Err(LayoutError::OverlappingCenters { distance, required });
            }
        }
    }
    Ok(())
}
