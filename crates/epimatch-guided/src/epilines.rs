//! Grouping of image-1 features whose epipolar lines nearly coincide.
//!
//! Lines are compared through their unit normal angle `theta` and their
//! signed offset `rho` from the center of the search box. For two lines the
//! largest separation anywhere inside a box of half-diagonal `R` is bounded
//! by `2 sin(|dtheta| / 2) * R + |drho|`; features join a group only while
//! that bound stays within the grouping tolerance.

use std::f64::consts::PI;

use epimatch_core::{Mat3, Pt2, Real, Vec3};
use log::trace;

use crate::{epipolar_line, normalize_line, BoundingBox};

/// Features of image 1 sharing one (approximate) epipolar line in image 2.
#[derive(Debug, Clone, PartialEq)]
pub struct EpilineGroup {
    /// Feature whose exact line represents the group.
    pub representative: usize,
    /// Representative line with unit normal (`a^2 + b^2 = 1`).
    pub line: Vec3,
    /// Representative line clipped to the search box; `None` until
    /// intersected, or if the line misses the box.
    pub endpoints: Option<[Pt2; 2]>,
    /// Member feature indices of image 1, ascending.
    pub features: Vec<usize>,
}

/// Normal form of a line used for sorting and comparison.
#[derive(Debug, Clone, Copy)]
struct LineKey {
    theta: Real,
    rho: Real,
}

impl LineKey {
    fn new(line: &Vec3, center: &Pt2) -> Self {
        Self {
            theta: line.y.atan2(line.x),
            rho: line.x * center.x + line.y * center.y + line.z,
        }
    }

    /// Upper bound on the separation of the two lines inside the box.
    fn separation(&self, other: &LineKey, half_diagonal: Real) -> Real {
        let dtheta = (self.theta - other.theta).abs();
        2.0 * (0.5 * dtheta).sin() * half_diagonal + (self.rho - other.rho).abs()
    }
}

/// Flip a unit-normal line so its normal points into the half-plane
/// `a > 0` (or `a == 0, b > 0`), making `theta` lie in `(-pi/2, pi/2]`.
fn canonical_line(line: Vec3) -> Vec3 {
    if line.x < 0.0 || (line.x == 0.0 && line.y < 0.0) {
        -line
    } else {
        line
    }
}

/// Compute the epipolar line of every listed image-1 feature and cluster
/// lines whose separation inside `bbox` is at most `tolerance` pixels.
///
/// Features sitting on the epipole have no line and are left out. Groups are
/// returned in ascending order of their lowest member index.
pub fn group_epipolar_lines(
    f: &Mat3,
    keypoints1: &[Pt2],
    unmatched1: &[usize],
    bbox: &BoundingBox,
    tolerance: Real,
) -> Vec<EpilineGroup> {
    let center = bbox.center();
    let half_diagonal = bbox.half_diagonal();

    let mut entries: Vec<(usize, Vec3, LineKey)> = unmatched1
        .iter()
        .filter_map(|&idx| {
            let Some(line) = normalize_line(&epipolar_line(f, &keypoints1[idx])) else {
                trace!("feature {idx} lies on the epipole; no epipolar line");
                return None;
            };
            let line = canonical_line(line);
            Some((idx, line, LineKey::new(&line, &center)))
        })
        .collect();
    entries.sort_by(|a, b| {
        a.2.theta
            .total_cmp(&b.2.theta)
            .then(a.2.rho.total_cmp(&b.2.rho))
            .then(a.0.cmp(&b.0))
    });

    // Groups are created in ascending theta, so those too far behind in
    // angle can never accept a later line.
    let theta_window = if half_diagonal > 0.0 {
        2.0 * (tolerance / (2.0 * half_diagonal)).min(1.0).asin()
    } else {
        PI
    };

    let mut groups: Vec<(LineKey, EpilineGroup)> = Vec::new();
    let mut window_start = 0;
    for (idx, line, key) in entries {
        while window_start < groups.len() && groups[window_start].0.theta < key.theta - theta_window
        {
            window_start += 1;
        }
        let joined = groups[window_start..]
            .iter_mut()
            .find(|(rep, _)| rep.separation(&key, half_diagonal) <= tolerance);
        match joined {
            Some((_, group)) => group.features.push(idx),
            None => groups.push((
                key,
                EpilineGroup {
                    representative: idx,
                    line,
                    endpoints: None,
                    features: vec![idx],
                },
            )),
        }
    }

    let mut groups: Vec<EpilineGroup> = groups
        .into_iter()
        .map(|(_, mut group)| {
            group.features.sort_unstable();
            group
        })
        .collect();
    groups.sort_by_key(|g| g.features[0]);
    groups
}
