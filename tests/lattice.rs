use grid_templator::error::{Axis, LayoutError};
use grid_templator::geometry::CircleLayout;
use grid_templator::types::{GridKind, ShapeKind};
use grid_templator::{synthesize_circles, Margins};

const PAGE_W: f64 = 612.0;
const PAGE_H: f64 = 792.0;

#[test]
fn simple_lattice_fills_the_page() {
    let template = synthesize_circles(
        CircleLayout::Simple,
        PAGE_W,
        PAGE_H,
        90.0,
        Margins::uniform(36.0),
        6.0,
        None,
        None,
    )
    .unwrap();

    assert_eq!(template.grid.kind, GridKind::CircleSimple);
    assert_eq!(template.label.shape, ShapeKind::Circle);
    assert_eq!(template.grid.rows, 7);
    assert_eq!(template.grid.cols, 5);
    assert_eq!(template.centers_count(), 35);
    assert!((template.grid.dx_pt - 96.0).abs() < 1e-9);
    assert!((template.grid.dy_pt - 96.0).abs() < 1e-9);
    assert!(template.grid.columns_per_row.is_none());
}

#[test]
fn circles_never_overlap_and_respect_margins() {
    for layout in [CircleLayout::Simple, CircleLayout::Close] {
        let diameter = 90.0;
        let gap = 6.0;
        let margins = Margins::uniform(36.0);
        let template = synthesize_circles(
            layout, PAGE_W, PAGE_H, diameter, margins, gap, None, None,
        )
        .unwrap();

        let radius = diameter / 2.0;
        for c in template.iter_centers() {
            assert!(c.x >= margins.left + radius - 1e-9);
            assert!(c.x <= PAGE_W - margins.right - radius + 1e-9);
            assert!(c.y >= margins.top + radius - 1e-9);
            assert!(c.y <= PAGE_H - margins.bottom - radius + 1e-9);
        }

        let centers = &template.centers_pt;
        for (i, a) in centers.iter().enumerate() {
            for b in &centers[i + 1..] {
                let d = (b - a).norm();
                assert!(
                    d >= diameter + gap - 1e-6,
                    "{layout:?}: centers {a:?} and {b:?} are {d:.3}pt apart"
                );
            }
        }
    }
}

#[test]
fn close_packing_shrinks_row_pitch_by_sqrt3_over_2() {
    let simple = synthesize_circles(
        CircleLayout::Simple,
        PAGE_W,
        PAGE_H,
        90.0,
        Margins::uniform(36.0),
        6.0,
        None,
        None,
    )
    .unwrap();
    let close = synthesize_circles(
        CircleLayout::Close,
        PAGE_W,
        PAGE_H,
        90.0,
        Margins::uniform(36.0),
        6.0,
        None,
        None,
    )
    .unwrap();

    let expected = simple.grid.dy_pt * 3.0_f64.sqrt() / 2.0;
    assert!((close.grid.dy_pt - expected).abs() < 1e-9);
    assert_eq!(close.grid.kind, GridKind::CircleClose);
    // The tighter pitch buys at least one extra row on a letter page.
    assert!(close.grid.rows > simple.grid.rows);
}

#[test]
fn close_packing_offsets_alternate_rows() {
    let template = synthesize_circles(
        CircleLayout::Close,
        PAGE_W,
        PAGE_H,
        90.0,
        Margins::uniform(36.0),
        6.0,
        None,
        None,
    )
    .unwrap();

    let offsets = &template.grid.row_offsets_pt;
    assert_eq!(offsets.len(), template.grid.rows);
    for (r, &offset) in offsets.iter().enumerate() {
        let expected = if r % 2 == 1 {
            template.grid.dx_pt / 2.0
        } else {
            0.0
        };
        assert!((offset - expected).abs() < 1e-9);
    }
}

#[test]
fn offset_rows_may_hold_one_fewer_column() {
    // 590pt page: even rows fit 5 circles, half-pitch-shifted odd rows 4.
    let template = synthesize_circles(
        CircleLayout::Close,
        590.0,
        PAGE_H,
        90.0,
        Margins::uniform(36.0),
        6.0,
        None,
        None,
    )
    .unwrap();

    let counts = template
        .grid
        .columns_per_row
        .as_ref()
        .expect("ragged lattice records per-row counts");
    assert_eq!(counts.len(), template.grid.rows);
    for (r, &count) in counts.iter().enumerate() {
        let expected = if r % 2 == 1 { 4 } else { 5 };
        assert_eq!(count, expected, "row {r}");
    }
    assert_eq!(template.grid.cols, 5);
    assert_eq!(template.centers_count(), counts.iter().sum::<usize>());

    // Anchors still point at the first and last row's first column.
    let first_of_last = template.centers_count() - counts[counts.len() - 1];
    assert_eq!(
        template.anchors.bottom_left_pt,
        template.centers_pt[first_of_last]
    );
}

#[test]
fn caps_limit_rows_and_columns() {
    let template = synthesize_circles(
        CircleLayout::Simple,
        PAGE_W,
        PAGE_H,
        90.0,
        Margins::uniform(36.0),
        6.0,
        Some(3),
        Some(2),
    )
    .unwrap();
    assert_eq!(template.grid.rows, 2);
    assert_eq!(template.grid.cols, 3);
    assert_eq!(template.centers_count(), 6);
}

#[test]
fn no_room_for_diameter_is_a_layout_error() {
    let err = synthesize_circles(
        CircleLayout::Simple,
        PAGE_W,
        PAGE_H,
        200.0,
        Margins {
            top: 36.0,
            right: 250.0,
            bottom: 36.0,
            left: 250.0,
        },
        0.0,
        None,
        None,
    )
    .unwrap_err();
    match err {
        LayoutError::NoRoom {
            axis,
            usable,
            diameter,
        } => {
            assert_eq!(axis, Axis::Horizontal);
            assert!(usable < diameter);
        }
        other => panic!("expected NoRoom, got {other:?}"),
    }
}

#[test]
fn zero_max_cols_is_rejected() {
    let err = synthesize_circles(
        CircleLayout::Simple,
        PAGE_W,
        PAGE_H,
        90.0,
        Margins::uniform(36.0),
        0.0,
        Some(0),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, LayoutError::Domain(_)));
}

#[test]
fn metadata_records_layout_and_gap() {
    let template = synthesize_circles(
        CircleLayout::Close,
        PAGE_W,
        PAGE_H,
        90.0,
        Margins::uniform(36.0),
        6.0,
        None,
        None,
    )
    .unwrap();
    assert_eq!(template.metadata.get("layout").map(String::as_str), Some("close"));
    assert_eq!(
        template.metadata.get("gap_pt").map(String::as_str),
        Some("6.000000")
    );
}
