//! Clipping of epipolar lines against the keypoint bounding box.

use epimatch_core::{Pt2, Real, Vec3};

use crate::BoundingBox;

const EDGE_EPS: Real = 1e-9;

/// Clip the line `ax + by + c = 0` to `bbox`.
///
/// Returns the two extreme boundary points of the line inside the box, or
/// `None` when the line misses the box. A line grazing a single corner
/// yields a zero-length segment.
pub fn intersect_line_with_box(line: &Vec3, bbox: &BoundingBox) -> Option<[Pt2; 2]> {
    let (a, b, c) = (line.x, line.y, line.z);
    let scale = a.hypot(b);
    if !scale.is_finite() || scale <= Real::EPSILON {
        return None;
    }
    let eps = EDGE_EPS * (1.0 + bbox.half_diagonal());

    let mut hits: Vec<Pt2> = Vec::with_capacity(4);
    // Vertical edges: solve for y.
    if b.abs() > Real::EPSILON * scale {
        for x in [bbox.min.x, bbox.max.x] {
            let y = -(a * x + c) / b;
            if y >= bbox.min.y - eps && y <= bbox.max.y + eps {
                hits.push(Pt2::new(x, y.clamp(bbox.min.y, bbox.max.y)));
            }
        }
    }
    // Horizontal edges: solve for x.
    if a.abs() > Real::EPSILON * scale {
        for y in [bbox.min.y, bbox.max.y] {
            let x = -(b * y + c) / a;
            if x >= bbox.min.x - eps && x <= bbox.max.x + eps {
                hits.push(Pt2::new(x.clamp(bbox.min.x, bbox.max.x), y));
            }
        }
    }

    // Corners are reported by two edges; keep the farthest-apart pair.
    let mut best: Option<([Pt2; 2], Real)> = None;
    for (i, p) in hits.iter().enumerate() {
        for q in &hits[i..] {
            let d = (q - p).norm_squared();
            if best.as_ref().map_or(true, |(_, bd)| d > *bd) {
                best = Some(([*p, *q], d));
            }
        }
    }
    best.map(|(segment, _)| segment)
}
