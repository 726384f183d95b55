//! Raster shape detector: edge map -> closing -> components -> filtering.
//!
//! Consumes one rendered page at a known DPI and yields shape observations
//! in point coordinates. Every stage is a deterministic transform; there is
//! no randomized step, so identical pixels and DPI give identical output.
//!
//! An empty return value means no component survived filtering. That is a
//! terminal extraction failure for the page; the caller decides what to
//! surface, there is no further fallback below the raster pass.

use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use super::components::{connected_components, row_span_area, ComponentBox};
use super::grad::{image_gradients, Grad, GradientKernel};
use super::morphology::{close, dilate, Mask};
use super::page::{PageRaster, Plane};
use crate::stats::{mean_std, median, percentile};
use crate::types::{ShapeKind, ShapeObservation};

/// Thresholds for the raster pipeline.
///
/// Defaults are tuned for 150-300 DPI renders of label sheets; the
/// percentile/adaptive threshold combination tracks the original
/// extraction heuristics.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterParams {
    pub kernel: GradientKernel,
    /// Percentile of gradient magnitude used for the edge threshold; the
    /// effective threshold is `max(percentile, mean + std)`.
    pub edge_percentile: f64,
    /// Dilate/erode passes used to bridge anti-aliasing gaps.
    pub closing_iterations: usize,
    /// Extra dilation passes after closing, thickening outlines before
    /// component extraction.
    pub extra_dilation: usize,
    /// Components with fewer pixels are discarded as specks.
    pub min_component_pixels: usize,
    /// Boxes thinner than this (in points) are rejected.
    pub min_label_pt: f64,
    /// Boxes spanning more than this fraction of a page dimension are
    /// treated as page-border artifacts.
    pub max_page_fraction: f64,
    /// Row-span fill ratio below which a near-square box is a circle
    /// (a disc fills ~pi/4 of its bounding box).
    pub circle_fill_ratio: f64,
    /// Allowed |aspect - 1| for the circle classification.
    pub circle_aspect_tol: f64,
    /// Keep boxes within this band around the median width/height.
    pub median_band: (f64, f64),
}

impl Default for RasterParams {
    fn default() -> Self {
        Self {
            kernel: GradientKernel::Sobel,
            edge_percentile: 92.0,
            closing_iterations: 2,
            extra_dilation: 1,
            min_component_pixels: 16,
            min_label_pt: 4.0,
            max_page_fraction: 0.9,
            circle_fill_ratio: 0.9,
            circle_aspect_tol: 0.25,
            median_band: (0.6, 1.4),
        }
    }
}

#[derive(Clone)]
struct Candidate {
    center: Point2<f64>,
    width_pt: f64,
    height_pt: f64,
    kind: ShapeKind,
}

/// Run the full raster pipeline over one rendered page.
pub fn detect_shapes(page: &PageRaster, params: &RasterParams) -> Vec<ShapeObservation> {
    let grad = image_gradients(page.luma(), params.kernel);
    let edges = threshold_edges(&grad.mag, params.edge_percentile);

    let closed = close(&edges, params.closing_iterations);
    let mut worked = closed;
    for _ in 0..params.extra_dilation {
        worked = dilate(&worked);
    }

    let boxes = connected_components(&worked, params.min_component_pixels);
    debug!(
        "raster: {} component(s) above {} px",
        boxes.len(),
        params.min_component_pixels
    );

    let refined: Vec<ComponentBox> = boxes.iter().map(|b| refine_box(b, &grad)).collect();
    let candidates = boxes_to_candidates(&refined, &worked, page, params);
    debug!("raster: {} candidate(s) after plausibility filter", candidates.len());

    let kept = median_size_filter(candidates, params.median_band);

    kept.into_iter()
        .map(|c| match c.kind {
            ShapeKind::Circle => {
                let diameter = 0.5 * (c.width_pt + c.height_pt);
                ShapeObservation::circle(c.center, diameter)
            }
            ShapeKind::Rectangle => {
                ShapeObservation::rectangle(c.center, c.width_pt, c.height_pt, None)
            }
        })
        .collect()
}

/// Binarize the gradient magnitude.
///
/// The threshold is the larger of a high percentile and `mean + std`; a
/// non-positive threshold (featureless page) yields an empty mask.
fn threshold_edges(mag: &Plane, pct: f64) -> Mask {
    let mut mask = Mask::new(mag.w, mag.h);
    if mag.data.is_empty() {
        return mask;
    }
    let values: Vec<f64> = mag.data.iter().map(|&v| v as f64).collect();
    let high = percentile(&values, pct).unwrap_or(0.0);
    let (mean, std) = mean_std(&values);
    let threshold = high.max(mean + std);
    if threshold <= 0.0 {
        return mask;
    }
    for (dst, &v) in mask.data.iter_mut().zip(mag.data.iter()) {
        *dst = (v as f64 >= threshold) as u8;
    }
    mask
}

fn argmax(values: &[f32]) -> usize {
    let mut best = 0usize;
    let mut best_v = f32::MIN;
    for (i, &v) in values.iter().enumerate() {
        if v > best_v {
            best_v = v;
            best = i;
        }
    }
    best
}

/// Snap box edges to the strongest |gx| / |gy| profile peaks per half.
///
/// The closing/dilation passes inflate component boxes by a few pixels;
/// the true label border sits on the gradient ridge.
fn refine_box(bbox: &ComponentBox, grad: &Grad) -> ComponentBox {
    let w = bbox.width_px();
    let h = bbox.height_px();
    if w < 2 || h < 2 {
        return *bbox;
    }

    let mut col_profile = vec![0.0f32; w];
    let mut row_profile = vec![0.0f32; h];
    for y in bbox.min_y..=bbox.max_y {
        for x in bbox.min_x..=bbox.max_x {
            let ax = grad.gx.get(x, y).abs();
            let ay = grad.gy.get(x, y).abs();
            let cx = x - bbox.min_x;
            let cy = y - bbox.min_y;
            if ax > col_profile[cx] {
                col_profile[cx] = ax;
            }
            if ay > row_profile[cy] {
                row_profile[cy] = ay;
            }
        }
    }

    if col_profile.iter().all(|&v| v <= 0.0) || row_profile.iter().all(|&v| v <= 0.0) {
        return *bbox;
    }

    let mid_col = w / 2;
    let left = argmax(&col_profile[..(mid_col + 1).min(w)]);
    let right = mid_col + argmax(&col_profile[mid_col..]);

    let mid_row = h / 2;
    let top = argmax(&row_profile[..(mid_row + 1).min(h)]);
    let bottom = mid_row + argmax(&row_profile[mid_row..]);

    ComponentBox {
        min_x: bbox.min_x + left,
        max_x: bbox.min_x + right,
        min_y: bbox.min_y + top,
        max_y: bbox.min_y + bottom,
        pixels: bbox.pixels,
    }
}

fn boxes_to_candidates(
    boxes: &[ComponentBox],
    mask: &Mask,
    page: &PageRaster,
    params: &RasterParams,
) -> Vec<Candidate> {
    let scale = page.scale_pt();
    let page_w_pt = page.page_width_pt();
    let page_h_pt = page.page_height_pt();

    let mut out = Vec::with_capacity(boxes.len());
    for bbox in boxes {
        let w_px = bbox.width_px();
        let h_px = bbox.height_px();
        if w_px <= 1 || h_px <= 1 {
            continue;
        }

        let width_pt = w_px as f64 * scale;
        let height_pt = h_px as f64 * scale;
        if width_pt < params.min_label_pt || height_pt < params.min_label_pt {
            continue;
        }
        if width_pt > params.max_page_fraction * page_w_pt
            || height_pt > params.max_page_fraction * page_h_pt
        {
            continue;
        }

        let center = Point2::new(
            (bbox.min_x + bbox.max_x + 1) as f64 / 2.0 * scale,
            (bbox.min_y + bbox.max_y + 1) as f64 / 2.0 * scale,
        );

        let fill = row_span_area(mask, bbox) as f64 / (w_px * h_px) as f64;
        let aspect = width_pt / height_pt;
        let kind = if fill < params.circle_fill_ratio
            && (aspect - 1.0).abs() <= params.circle_aspect_tol
        {
            ShapeKind::Circle
        } else {
            ShapeKind::Rectangle
        };

        out.push(Candidate {
            center,
            width_pt,
            height_pt,
            kind,
        });
    }
    out
}

/// Keep candidates whose size sits inside the band around the median; fall
/// back to the unfiltered set when the band would reject everything.
fn median_size_filter(candidates: Vec<Candidate>, band: (f64, f64)) -> Vec<Candidate> {
    if candidates.is_empty() {
        return candidates;
    }
    let widths: Vec<f64> = candidates.iter().map(|c| c.width_pt).collect();
    let heights: Vec<f64> = candidates.iter().map(|c| c.height_pt).collect();
    let (w_med, h_med) = match (median(&widths), median(&heights)) {
        (Some(w), Some(h)) => (w, h),
        _ => return candidates,
    };

    let (lo, hi) = band;
    let kept: Vec<Candidate> = candidates
        .iter()
        .filter(|c| {
            c.width_pt >= w_med * lo
                && c.width_pt <= w_med * hi
                && c.height_pt >= h_med * lo
                && c.height_pt <= h_med * hi
        })
        .cloned()
        .collect();

    if kept.is_empty() {
        candidates
    } else {
        kept
    }
}
