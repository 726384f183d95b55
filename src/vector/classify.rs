//! Path classification: rectangles (optionally rounded) and circles.

use nalgebra::Point2;

use super::{PathSegment, VectorParams, VectorPath};
use crate::stats::median;
use crate::types::ShapeObservation;

const EPS: f64 = 1e-6;
const CUBIC_SAMPLES: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Classify one path. `None` means the path is neither a plausible
/// rectangle nor a circle and should be ignored.
pub fn classify_path(path: &VectorPath, params: &VectorParams) -> Option<ShapeObservation> {
    // Explicit rectangle ops carry sharp corners by construction.
    if let Some(PathSegment::Rect { min, max }) = path
        .segments
        .iter()
        .find(|s| matches!(s, PathSegment::Rect { .. }))
    {
        return rect_observation(*min, *max, Some(0.0), params);
    }

    if path.segments.is_empty() || !is_closed(path) {
        return None;
    }

    let samples = sample_points(&path.segments);
    let (min, max) = bounding_box(&samples)?;
    let width = max.x - min.x;
    let height = max.y - min.y;
    if width < params.min_extent_pt || height < params.min_extent_pt {
        return None;
    }

    let lines: Vec<(Point2<f64>, Point2<f64>)> = path
        .segments
        .iter()
        .filter_map(|s| match s {
            PathSegment::Line { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    let has_cubics = path
        .segments
        .iter()
        .any(|s| matches!(s, PathSegment::Cubic { .. }));

    if lines.is_empty() && has_cubics {
        return classify_circle(&path.segments, min, max, params);
    }

    classify_rectangle(&lines, has_cubics, min, max, params)
}

fn is_closed(path: &VectorPath) -> bool {
    if path.closed {
        return true;
    }
    let first = match path.segments.first() {
        Some(PathSegment::Line { from, .. }) | Some(PathSegment::Cubic { from, .. }) => *from,
        _ => return false,
    };
    let last = match path.segments.last() {
        Some(PathSegment::Line { to, .. }) | Some(PathSegment::Cubic { to, .. }) => *to,
        _ => return false,
    };
    (last - first).norm() <= EPS
}

fn cubic_point(
    from: Point2<f64>,
    ctrl1: Point2<f64>,
    ctrl2: Point2<f64>,
    to: Point2<f64>,
    t: f64,
) -> Point2<f64> {
    let u = 1.0 - t;
    let c0 = u * u * u;
    let c1 = 3.0 * u * u * t;
    let c2 = 3.0 * u * t * t;
    let c3 = t * t * t;
    Point2::new(
        c0 * from.x + c1 * ctrl1.x + c2 * ctrl2.x + c3 * to.x,
        c0 * from.y + c1 * ctrl1.y + c2 * ctrl2.y + c3 * to.y,
    )
}

fn sample_points(segments: &[PathSegment]) -> Vec<Point2<f64>> {
    let mut pts = Vec::new();
    for seg in segments {
        match seg {
            PathSegment::Line { from, to } => {
                pts.push(*from);
                pts.push(*to);
            }
            PathSegment::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => {
                for &t in &CUBIC_SAMPLES {
                    pts.push(cubic_point(*from, *ctrl1, *ctrl2, *to, t));
                }
            }
            PathSegment::Rect { min, max } => {
                pts.push(*min);
                pts.push(*max);
            }
        }
    }
    pts
}

fn bounding_box(points: &[Point2<f64>]) -> Option<(Point2<f64>, Point2<f64>)> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some((min, max))
}

fn rect_observation(
    min: Point2<f64>,
    max: Point2<f64>,
    corner_radius: Option<f64>,
    params: &VectorParams,
) -> Option<ShapeObservation> {
    let width = max.x - min.x;
    let height = max.y - min.y;
    if width < params.min_extent_pt || height < params.min_extent_pt {
        return None;
    }
    let center = Point2::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
    Some(ShapeObservation::rectangle(
        center,
        width,
        height,
        corner_radius,
    ))
}

/// Circle fit: sampled path points must be near-equidistant from their
/// centroid and the bounding box near-square.
fn classify_circle(
    segments: &[PathSegment],
    min: Point2<f64>,
    max: Point2<f64>,
    params: &VectorParams,
) -> Option<ShapeObservation> {
    let width = max.x - min.x;
    let height = max.y - min.y;
    if (width - height).abs() > params.circle_fit_tol * width.max(height) {
        return None;
    }

    let samples = sample_points(segments);
    let n = samples.len() as f64;
    let centroid = Point2::new(
        samples.iter().map(|p| p.x).sum::<f64>() / n,
        samples.iter().map(|p| p.y).sum::<f64>() / n,
    );
    let radii: Vec<f64> = samples.iter().map(|p| (p - centroid).norm()).collect();
    let mean_r = radii.iter().sum::<f64>() / n;
    if mean_r <= EPS {
        return None;
    }
    let max_dev = radii
        .iter()
        .map(|r| (r - mean_r).abs() / mean_r)
        .fold(0.0f64, f64::max);
    if max_dev > params.circle_fit_tol {
        return None;
    }

    let center = Point2::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
    let diameter = 0.5 * (width + height);
    Some(ShapeObservation::circle(center, diameter))
}

/// Rectangle check: every straight run axis-aligned, all four bounding-box
/// sides covered by straight runs.
fn classify_rectangle(
    lines: &[(Point2<f64>, Point2<f64>)],
    has_cubics: bool,
    min: Point2<f64>,
    max: Point2<f64>,
    params: &VectorParams,
) -> Option<ShapeObservation> {
    if lines.is_empty() {
        return None;
    }
    let width = max.x - min.x;
    let height = max.y - min.y;
    let angle_tol = params.axis_angle_tol_deg.to_radians();

    // Covered length per side: left, right, top, bottom.
    let mut cover = [0.0f64; 4];
    let edge_tol = (0.02 * width.max(height)).max(EPS);

    for (a, b) in lines {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len <= EPS {
            continue;
        }
        let angle = dy.abs().atan2(dx.abs());
        let horizontal = angle <= angle_tol;
        let vertical = angle >= std::f64::consts::FRAC_PI_2 - angle_tol;
        if !horizontal && !vertical {
            return None;
        }
        if vertical {
            let x = (a.x + b.x) / 2.0;
            if (x - min.x).abs() <= edge_tol {
                cover[0] += len;
            } else if (max.x - x).abs() <= edge_tol {
                cover[1] += len;
            }
        } else {
            let y = (a.y + b.y) / 2.0;
            if (y - min.y).abs() <= edge_tol {
                cover[2] += len;
            } else if (max.y - y).abs() <= edge_tol {
                cover[3] += len;
            }
        }
    }

    let min_cover_v = params.side_cover_min * height;
    let min_cover_h = params.side_cover_min * width;
    if cover[0] < min_cover_v || cover[1] < min_cover_v {
        return None;
    }
    if cover[2] < min_cover_h || cover[3] < min_cover_h {
        return None;
    }

    let corner_radius = if has_cubics {
        estimate_corner_radius(lines, min, max)
    } else {
        Some(0.0)
    };

    rect_observation(min, max, corner_radius, params)
}

/// Best-effort corner radius for rounded rectangles.
///
/// Straight runs of a rounded rectangle stop one radius short of each
/// corner; the offsets of their endpoints from the bounding-box sides vote
/// for the radius, one median per axis. Returns `None` when the curve
/// geometry leaves no usable votes rather than guessing.
fn estimate_corner_radius(
    lines: &[(Point2<f64>, Point2<f64>)],
    min: Point2<f64>,
    max: Point2<f64>,
) -> Option<f64> {
    let width = max.x - min.x;
    let height = max.y - min.y;
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    let limit_x = width / 2.0 + EPS;
    let limit_y = height / 2.0 + EPS;

    let mut x_candidates = Vec::new();
    let mut y_candidates = Vec::new();
    for (a, b) in lines {
        for p in [a, b] {
            let dx_left = p.x - min.x;
            let dx_right = max.x - p.x;
            let dy_top = p.y - min.y;
            let dy_bottom = max.y - p.y;
            if dx_left > EPS && dx_left < limit_x {
                x_candidates.push(dx_left);
            }
            if dx_right > EPS && dx_right < limit_x {
                x_candidates.push(dx_right);
            }
            if dy_top > EPS && dy_top < limit_y {
                y_candidates.push(dy_top);
            }
            if dy_bottom > EPS && dy_bottom < limit_y {
                y_candidates.push(dy_bottom);
            }
        }
    }

    match (median(&x_candidates), median(&y_candidates)) {
        (Some(mx), Some(my)) => Some((mx + my) / 2.0),
        (Some(mx), None) => Some(mx),
        (None, Some(my)) => Some(my),
        (None, None) => None,
    }
}
