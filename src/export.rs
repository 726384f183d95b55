//! Template projection and serialization.
//!
//! Downstream pipelines consume templates in one of four coordinate
//! spaces. Projection is a pure read-time transform; the canonical points
//! representation on the template itself is never rewritten.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::geometry::{
    self, from_percent_of_width, percent_of_width, points_to_inches, points_to_mm,
};
use crate::types::{
    AnchorPoints, ExtractedTemplate, GridKind, GridMetrics, LabelGeometry, PageMetrics, ShapeKind,
};

/// Output coordinate space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CoordSpace {
    /// Both axes scaled by 100 / page width.
    #[default]
    PercentWidth,
    Points,
    Inches,
    Mm,
}

/// Project one point into the requested space.
pub fn project_point(
    point: Point2<f64>,
    space: CoordSpace,
    page_width_pt: f64,
) -> Result<Point2<f64>, DomainError> {
    Ok(match space {
        CoordSpace::PercentWidth => percent_of_width(point, page_width_pt)?,
        CoordSpace::Points => point,
        CoordSpace::Inches => Point2::new(points_to_inches(point.x), points_to_inches(point.y)),
        CoordSpace::Mm => Point2::new(points_to_mm(point.x), points_to_mm(point.y)),
    })
}

/// Project all template centers, preserving row-major order.
pub fn project_centers(
    template: &ExtractedTemplate,
    space: CoordSpace,
) -> Result<Vec<Point2<f64>>, DomainError> {
    template
        .iter_centers()
        .map(|&c| project_point(c, space, template.page.width_pt))
        .collect()
}

/// JSON payload mirroring the template, with centers in the requested
/// space and anchors carried in both points and percent-of-width.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplatePayload {
    pub page: PagePayload,
    pub grid: GridPayload,
    pub label: LabelPayload,
    pub anchors: AnchorsPayload,
    pub centers: Vec<[f64; 2]>,
    pub centers_coord_space: CoordSpace,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PagePayload {
    pub width_pt: f64,
    pub height_pt: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridPayload {
    pub kind: GridKind,
    pub rows: usize,
    pub columns: usize,
    pub delta_x_pt: f64,
    pub delta_y_pt: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub row_offsets_pt: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns_per_row: Option<Vec<usize>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LabelPayload {
    pub shape: ShapeKind,
    pub width_pt: f64,
    pub height_pt: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius_pt: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnchorsPayload {
    pub points: AnchorPair,
    pub percent_width: AnchorPair,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnchorPair {
    pub top_left: [f64; 2],
    pub bottom_left: [f64; 2],
}

fn to_pair(p: Point2<f64>) -> [f64; 2] {
    [p.x, p.y]
}

/// Build the serializable payload for a template.
pub fn template_payload(
    template: &ExtractedTemplate,
    space: CoordSpace,
) -> Result<TemplatePayload, DomainError> {
    let centers = project_centers(template, space)?
        .into_iter()
        .map(to_pair)
        .collect();

    let width = template.page.width_pt;
    let anchors = AnchorsPayload {
        points: AnchorPair {
            top_left: to_pair(template.anchors.top_left_pt),
            bottom_left: to_pair(template.anchors.bottom_left_pt),
        },
        percent_width: AnchorPair {
            top_left: to_pair(percent_of_width(template.anchors.top_left_pt, width)?),
            bottom_left: to_pair(percent_of_width(template.anchors.bottom_left_pt, width)?),
        },
    };

    Ok(TemplatePayload {
        page: PagePayload {
            width_pt: template.page.width_pt,
            height_pt: template.page.height_pt,
        },
        grid: GridPayload {
            kind: template.grid.kind,
            rows: template.grid.rows,
            columns: template.grid.cols,
            delta_x_pt: template.grid.dx_pt,
            delta_y_pt: template.grid.dy_pt,
            row_offsets_pt: template.grid.row_offsets_pt.clone(),
            columns_per_row: template.grid.columns_per_row.clone(),
        },
        label: LabelPayload {
            shape: template.label.shape,
            width_pt: template.label.width_pt,
            height_pt: template.label.height_pt,
            corner_radius_pt: template.label.corner_radius_pt,
        },
        anchors,
        centers,
        centers_coord_space: space,
        metadata: template.metadata.clone(),
    })
}

/// Rebuild a template from an exported payload, converting centers back
/// into points.
pub fn template_from_payload(payload: &TemplatePayload) -> Result<ExtractedTemplate, DomainError> {
    let page = PageMetrics::new(payload.page.width_pt, payload.page.height_pt)?;
    let centers: Vec<Point2<f64>> = payload
        .centers
        .iter()
        .map(|&[x, y]| {
            let p = Point2::new(x, y);
            Ok(match payload.centers_coord_space {
                CoordSpace::Points => p,
                CoordSpace::PercentWidth => from_percent_of_width(p, page.width_pt)?,
                CoordSpace::Inches => Point2::new(
                    geometry::inches_to_points(p.x),
                    geometry::inches_to_points(p.y),
                ),
                CoordSpace::Mm => {
                    Point2::new(geometry::mm_to_points(p.x), geometry::mm_to_points(p.y))
                }
            })
        })
        .collect::<Result<_, DomainError>>()?;

    let grid = GridMetrics {
        kind: payload.grid.kind,
        rows: payload.grid.rows,
        cols: payload.grid.columns,
        dx_pt: payload.grid.delta_x_pt,
        dy_pt: payload.grid.delta_y_pt,
        row_offsets_pt: payload.grid.row_offsets_pt.clone(),
        columns_per_row: payload.grid.columns_per_row.clone(),
    };
    let label = LabelGeometry {
        shape: payload.label.shape,
        width_pt: payload.label.width_pt,
        height_pt: payload.label.height_pt,
        corner_radius_pt: payload.label.corner_radius_pt,
    };
    let anchors = AnchorPoints {
        top_left_pt: Point2::new(payload.anchors.points.top_left[0], payload.anchors.points.top_left[1]),
        bottom_left_pt: Point2::new(
            payload.anchors.points.bottom_left[0],
            payload.anchors.points.bottom_left[1],
        ),
    };

    ExtractedTemplate::new(page, grid, label, anchors, centers, payload.metadata.clone())
}

/// Serialize the template to pretty JSON at `path`.
pub fn export_json(
    template: &ExtractedTemplate,
    path: &Path,
    space: CoordSpace,
) -> Result<PathBuf, String> {
    let payload =
        template_payload(template, space).map_err(|e| format!("Failed to project template: {e}"))?;
    let json = serde_json::to_string_pretty(&payload)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    ensure_parent_dir(path)?;
    fs::write(path, json).map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    Ok(path.to_path_buf())
}

/// Write template centers as CSV rows `x,y,coord_space`.
pub fn export_csv(
    template: &ExtractedTemplate,
    path: &Path,
    space: CoordSpace,
) -> Result<PathBuf, String> {
    let centers =
        project_centers(template, space).map_err(|e| format!("Failed to project template: {e}"))?;
    ensure_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    writer
        .write_record(["x", "y", "coord_space"])
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    let space_tag = match space {
        CoordSpace::PercentWidth => "percent_width",
        CoordSpace::Points => "points",
        CoordSpace::Inches => "inches",
        CoordSpace::Mm => "mm",
    };
    for c in centers {
        writer
            .write_record([format!("{:.6}", c.x), format!("{:.6}", c.y), space_tag.to_string()])
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    }
    writer
        .flush()
        .map_err(|e| format!("Failed to flush {}: {e}", path.display()))?;
    Ok(path.to_path_buf())
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
