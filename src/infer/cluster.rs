//! Greedy 1D clustering along one page axis.
//!
//! Observations are sorted along the axis, a provisional pitch is taken as
//! the median of the significant consecutive gaps, and values are grouped
//! into a cluster while they stay within half a pitch of the running
//! cluster mean. The cluster representative is the median of its members.

use crate::stats::median;

/// One cluster of observation indices along an axis.
#[derive(Clone, Debug)]
pub struct AxisCluster {
    /// Median of the member coordinates.
    pub rep: f64,
    /// Indices into the caller's observation list.
    pub members: Vec<usize>,
}

/// Estimate the pitch of a sorted coordinate sequence: median of the gaps
/// that exceed `gap_floor`. `None` when every gap is sub-floor (a single
/// cluster).
pub fn estimate_pitch(sorted: &[f64], gap_floor: f64) -> Option<f64> {
    let mut gaps = Vec::with_capacity(sorted.len().saturating_sub(1));
    for pair in sorted.windows(2) {
        let d = pair[1] - pair[0];
        if d.is_finite() && d > gap_floor {
            gaps.push(d);
        }
    }
    median(&gaps)
}

/// Cluster `(index, coordinate)` pairs along one axis.
///
/// `gap_floor` separates in-cluster jitter from real pitch gaps; it is
/// derived from the observed label size by the caller. Returned clusters
/// are ordered by ascending representative.
pub fn cluster_axis(values: &[(usize, f64)], gap_floor: f64) -> Vec<AxisCluster> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<(usize, f64)> = values.to_vec();
    sorted.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let coords: Vec<f64> = sorted.iter().map(|&(_, v)| v).collect();
    let pitch = estimate_pitch(&coords, gap_floor);
    let tol = pitch.map_or(gap_floor, |p| (0.5 * p).max(gap_floor));

    let mut clusters: Vec<AxisCluster> = Vec::new();
    let mut current: Vec<(usize, f64)> = Vec::new();
    let mut mean = 0.0f64;

    for &(idx, v) in &sorted {
        if current.is_empty() || (v - mean).abs() <= tol {
            current.push((idx, v));
            mean = current.iter().map(|&(_, c)| c).sum::<f64>() / current.len() as f64;
        } else {
            clusters.push(finish(&current));
            current = vec![(idx, v)];
            mean = v;
        }
    }
    if !current.is_empty() {
        clusters.push(finish(&current));
    }

    clusters
}

fn finish(members: &[(usize, f64)]) -> AxisCluster {
    let coords: Vec<f64> = members.iter().map(|&(_, v)| v).collect();
    AxisCluster {
        rep: median(&coords).unwrap_or(0.0),
        members: members.iter().map(|&(i, _)| i).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_two_rows_despite_jitter() {
        let values: Vec<(usize, f64)> = vec![
            (0, 90.0),
            (1, 90.2),
            (2, 89.9),
            (3, 171.0),
            (4, 170.8),
            (5, 171.3),
        ];
        let clusters = cluster_axis(&values, 0.5);
        assert_eq!(clusters.len(), 2);
        assert!((clusters[0].rep - 90.0).abs() < 0.3);
        assert!((clusters[1].rep - 171.0).abs() < 0.3);
        assert_eq!(clusters[0].members.len(), 3);
    }

    #[test]
    fn coincident_values_form_one_cluster() {
        let values: Vec<(usize, f64)> = (0..5).map(|i| (i, 42.0)).collect();
        let clusters = cluster_axis(&values, 0.5);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members.len(), 5);
    }

    #[test]
    fn pitch_ignores_intra_cluster_gaps() {
        let sorted = [10.0, 10.1, 10.2, 91.0, 91.1, 172.0, 172.2];
        let pitch = estimate_pitch(&sorted, 0.5).unwrap();
        assert!((pitch - 80.85).abs() < 0.2, "pitch={pitch}");
    }
}
