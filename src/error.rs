//! Error taxonomy shared by the extraction and synthesis entry points.
//!
//! Three families, all synchronous and local to the failing call:
//! - [`DomainError`] – invalid numeric input (non-positive page width, …).
//! - [`GridInferenceError`] – observations do not resolve to a consistent
//!   rectangular grid.
//! - [`LayoutError`] – circle layout parameters leave no room for a lattice.
//!
//! Variants carry the observed value alongside the violated threshold so
//! callers can surface actionable diagnostics.

use thiserror::Error;

/// Page axis named in spacing and layout failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Horizontal => f.write_str("horizontal"),
            Axis::Vertical => f.write_str("vertical"),
        }
    }
}

/// Invalid numeric input detected before any processing.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("page width must be positive, received {0}")]
    NonPositivePageWidth(f64),

    #[error("{name} must be positive, received {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} must be non-negative, received {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("{name} must be finite, received {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("{name} must be at least 1 when provided, received {value}")]
    ZeroLimit { name: &'static str, value: usize },

    #[error("template holds {actual} centers but the grid describes {expected}")]
    CenterCountMismatch { expected: usize, actual: usize },

    #[error("anchor {name} disagrees with the corresponding grid center")]
    AnchorMismatch { name: &'static str },
}

/// Observations did not resolve into a consistent rectangular grid.
#[derive(Debug, Error)]
pub enum GridInferenceError {
    #[error("no observations were provided")]
    NoObservations,

    #[error("observations mix rectangle and circle shapes")]
    MixedShapeKinds,

    #[error("only {rows} row(s) formed, at least {min} required")]
    TooFewRows { rows: usize, min: usize },

    #[error("only {cols} column(s) formed, at least {min} required")]
    TooFewColumns { cols: usize, min: usize },

    #[error(
        "{axis} spacing deviation {observed:.3} exceeds tolerance {tolerance:.3} \
         (median pitch {pitch:.3}pt)"
    )]
    IrregularSpacing {
        axis: Axis,
        observed: f64,
        tolerance: f64,
        pitch: f64,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Requested circle layout parameters leave no room for a valid lattice.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error(
        "{axis} margins leave {usable:.3}pt of usable span, \
         smaller than the requested diameter {diameter:.3}pt"
    )]
    NoRoom {
        axis: Axis,
        usable: f64,
        diameter: f64,
    },

    #[error("no circle centers fit the requested configuration")]
    EmptyLattice,

    #[error(
        "generated center ({x:.3}, {y:.3}) lies outside the allowed bounds \
         [{min_x:.3}, {max_x:.3}] x [{min_y:.3}, {max_y:.3}]"
    )]
    CenterOutOfBounds {
        x: f64,
        y: f64,
        min_x: f64,
        max_x: f64,
        min_y: f64,
        max_y: f64,
    },

    #[error("generated centers overlap: distance {distance:.3}pt, required >= {required:.3}pt")]
    OverlappingCenters { distance: f64, required: f64 },

    #[error(transparent)]
    Domain(#[from] DomainError),
}
