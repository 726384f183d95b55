use nalgebra::{Point2, Vector2};

use super::*;
use crate::types::ShapeKind;

fn p(x: f64, y: f64) -> Point2<f64> {
    Point2::new(x, y)
}

fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> PathSegment {
    PathSegment::Line {
        from: p(x0, y0),
        to: p(x1, y1),
    }
}

/// Cubic Bezier circle-arc constant.
const KAPPA: f64 = 0.552_284_749_830_793_4;

fn quarter_arc(from: Point2<f64>, to: Point2<f64>, center: Point2<f64>) -> PathSegment {
    let r = (from - center).norm();
    let d1 = (from - center) / r;
    let d2 = (to - center) / r;
    // Tangents are perpendicular to the radii; the cross-product sign picks
    // the travel direction around the arc.
    let s = signum_cross(d1, d2);
    let t1 = Point2::new(
        from.x - d1.y * KAPPA * r * s,
        from.y + d1.x * KAPPA * r * s,
    );
    let t2 = Point2::new(to.x + d2.y * KAPPA * r * s, to.y - d2.x * KAPPA * r * s);
    PathSegment::Cubic {
        from,
        ctrl1: t1,
        ctrl2: t2,
        to,
    }
}

fn signum_cross(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    (a.x * b.y - a.y * b.x).signum()
}

fn circle_path(cx: f64, cy: f64, r: f64) -> VectorPath {
    let c = p(cx, cy);
    let east = p(cx + r, cy);
    let south = p(cx, cy + r);
    let west = p(cx - r, cy);
    let north = p(cx, cy - r);
    VectorPath {
        segments: vec![
            quarter_arc(east, south, c),
            quarter_arc(south, west, c),
            quarter_arc(west, north, c),
            quarter_arc(north, east, c),
        ],
        closed: true,
    }
}

fn rounded_rect_path(x0: f64, y0: f64, x1: f64, y1: f64, r: f64) -> VectorPath {
    VectorPath {
        segments: vec![
            line(x0 + r, y0, x1 - r, y0),
            quarter_arc(p(x1 - r, y0), p(x1, y0 + r), p(x1 - r, y0 + r)),
            line(x1, y0 + r, x1, y1 - r),
            quarter_arc(p(x1, y1 - r), p(x1 - r, y1), p(x1 - r, y1 - r)),
            line(x1 - r, y1, x0 + r, y1),
            quarter_arc(p(x0 + r, y1), p(x0, y1 - r), p(x0 + r, y1 - r)),
            line(x0, y1 - r, x0, y0 + r),
            quarter_arc(p(x0, y0 + r), p(x0 + r, y0), p(x0 + r, y0 + r)),
        ],
        closed: true,
    }
}

#[test]
fn sharp_rectangle_from_lines() {
    let path = VectorPath {
        segments: vec![
            line(10.0, 10.0, 110.0, 10.0),
            line(110.0, 10.0, 110.0, 60.0),
            line(110.0, 60.0, 10.0, 60.0),
            line(10.0, 60.0, 10.0, 10.0),
        ],
        closed: true,
    };
    let obs = classify_path(&path, &VectorParams::default()).expect("rectangle");
    assert_eq!(obs.kind, ShapeKind::Rectangle);
    assert!((obs.center.x - 60.0).abs() < 1e-9);
    assert!((obs.center.y - 35.0).abs() < 1e-9);
    assert!((obs.width_pt - 100.0).abs() < 1e-9);
    assert!((obs.height_pt - 50.0).abs() < 1e-9);
    assert_eq!(obs.corner_radius_pt, Some(0.0));
}

#[test]
fn explicit_rect_op_is_sharp() {
    let path = VectorPath {
        segments: vec![PathSegment::Rect {
            min: p(36.0, 72.0),
            max: p(180.0, 144.0),
        }],
        closed: false,
    };
    let obs = classify_path(&path, &VectorParams::default()).expect("rect op");
    assert_eq!(obs.kind, ShapeKind::Rectangle);
    assert!((obs.width_pt - 144.0).abs() < 1e-9);
    assert!((obs.height_pt - 72.0).abs() < 1e-9);
    assert_eq!(obs.corner_radius_pt, Some(0.0));
}

#[test]
fn rounded_rectangle_recovers_radius() {
    let path = rounded_rect_path(10.0, 10.0, 110.0, 60.0, 8.0);
    let obs = classify_path(&path, &VectorParams::default()).expect("rounded rectangle");
    assert_eq!(obs.kind, ShapeKind::Rectangle);
    let radius = obs.corner_radius_pt.expect("radius estimate");
    assert!(
        (radius - 8.0).abs() < 0.5,
        "expected ~8pt corner radius, got {radius}"
    );
}

#[test]
fn four_arc_circle_classifies_as_circle() {
    let path = circle_path(50.0, 50.0, 25.0);
    let obs = classify_path(&path, &VectorParams::default()).expect("circle");
    assert_eq!(obs.kind, ShapeKind::Circle);
    assert!((obs.center.x - 50.0).abs() < 1e-6);
    assert!((obs.center.y - 50.0).abs() < 1e-6);
    assert!((obs.width_pt - 50.0).abs() < 0.1);
}

#[test]
fn diagonal_quad_is_discarded() {
    let path = VectorPath {
        segments: vec![
            line(50.0, 10.0, 90.0, 50.0),
            line(90.0, 50.0, 50.0, 90.0),
            line(50.0, 90.0, 10.0, 50.0),
            line(10.0, 50.0, 50.0, 10.0),
        ],
        closed: true,
    };
    assert!(classify_path(&path, &VectorParams::default()).is_none());
}

#[test]
fn open_polyline_is_discarded() {
    let path = VectorPath {
        segments: vec![line(10.0, 10.0, 110.0, 10.0), line(110.0, 10.0, 110.0, 60.0)],
        closed: false,
    };
    assert!(classify_path(&path, &VectorParams::default()).is_none());
}

#[test]
fn tiny_shapes_are_noise() {
    let path = VectorPath {
        segments: vec![
            line(10.0, 10.0, 12.0, 10.0),
            line(12.0, 10.0, 12.0, 12.0),
            line(12.0, 12.0, 10.0, 12.0),
            line(10.0, 12.0, 10.0, 10.0),
        ],
        closed: true,
    };
    assert!(classify_path(&path, &VectorParams::default()).is_none());
}

#[test]
fn parse_shapes_keeps_draw_order_and_page_bounds() {
    let page = PageMetrics {
        width_pt: 612.0,
        height_pt: 792.0,
    };
    let inside = rounded_rect_path(100.0, 100.0, 200.0, 150.0, 5.0);
    let outside = rounded_rect_path(900.0, 100.0, 1000.0, 150.0, 5.0);
    let second = rounded_rect_path(100.0, 300.0, 200.0, 350.0, 5.0);
    let shapes = parse_shapes(
        &[inside, outside, second],
        page,
        &VectorParams::default(),
    );
    assert_eq!(shapes.len(), 2);
    assert!(shapes[0].center.y < shapes[1].center.y);
}
