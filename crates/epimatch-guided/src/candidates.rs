//! Retrieval of image-2 features near a clipped epipolar segment.

use std::collections::HashSet;

use epimatch_core::{Pt2, Real, Vec3};

use crate::{point_line_distance, GridIndex};

/// Walk `segment` through `index` and collect the image-2 features lying
/// within `radius` pixels of `line`.
///
/// The segment is sampled every quarter cell; each sample pulls the closest
/// cell (and its neighbors when `with_neighbors` is set). Results are
/// deduplicated, exclude `matched2`, and are returned in ascending order.
pub fn find_features_near_epiline(
    line: &Vec3,
    segment: &[Pt2; 2],
    index: &GridIndex,
    keypoints2: &[Pt2],
    matched2: &HashSet<usize>,
    radius: Real,
    with_neighbors: bool,
) -> Vec<usize> {
    let step = 0.25 * index.cell_size();
    let delta = segment[1] - segment[0];
    let num_steps = (delta.norm() / step).ceil().max(1.0) as usize;

    let mut candidates = Vec::new();
    for k in 0..=num_steps {
        let t = k as Real / num_steps as Real;
        let p = segment[0] + delta * t;
        index.collect_features_near(&p, with_neighbors, &mut candidates);
    }

    candidates.sort_unstable();
    candidates.dedup();
    candidates.retain(|idx| {
        !matched2.contains(idx) && point_line_distance(line, &keypoints2[*idx]) <= radius
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{intersect_line_with_box, BoundingBox};

    fn build(keypoints: &[Pt2], half_cell: Real) -> (BoundingBox, GridIndex) {
        let bbox = BoundingBox::from_points(keypoints.iter()).unwrap();
        let mut index = GridIndex::staggered(&bbox, half_cell);
        for (i, p) in keypoints.iter().enumerate() {
            index.add_feature(i, p);
        }
        (bbox, index)
    }

    #[test]
    fn collects_features_along_the_line() {
        // Line y = 50 across a field of features.
        let keypoints = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(10.0, 50.5),
            Pt2::new(80.0, 49.0),
            Pt2::new(150.0, 52.0),
            Pt2::new(199.0, 50.0),
            Pt2::new(120.0, 90.0),
            Pt2::new(200.0, 100.0),
        ];
        let (bbox, index) = build(&keypoints, 2.5);
        let line = Vec3::new(0.0, 1.0, -50.0);
        let segment = intersect_line_with_box(&line, &bbox).unwrap();

        let found = find_features_near_epiline(
            &line,
            &segment,
            &index,
            &keypoints,
            &HashSet::new(),
            2.5,
            true,
        );
        assert_eq!(found, vec![1, 2, 3, 4]);
    }

    #[test]
    fn matched_features_are_excluded() {
        let keypoints = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(40.0, 20.0),
            Pt2::new(60.0, 20.5),
            Pt2::new(100.0, 40.0),
        ];
        let (bbox, index) = build(&keypoints, 2.5);
        let line = Vec3::new(0.0, 1.0, -20.0);
        let segment = intersect_line_with_box(&line, &bbox).unwrap();
        let matched: HashSet<usize> = [2].into_iter().collect();

        let found =
            find_features_near_epiline(&line, &segment, &index, &keypoints, &matched, 2.5, true);
        assert_eq!(found, vec![1]);
    }

    #[test]
    fn closest_cell_mode_finds_features_on_the_line() {
        let keypoints: Vec<Pt2> = (0..20)
            .map(|i| Pt2::new(7.0 * i as Real, 0.5 * i as Real))
            .collect();
        let (bbox, index) = build(&keypoints, 2.5);
        // y = x / 14 passes through every keypoint.
        let line = Vec3::new(1.0, -14.0, 0.0);
        let segment = intersect_line_with_box(&line, &bbox).unwrap();

        let found = find_features_near_epiline(
            &line,
            &segment,
            &index,
            &keypoints,
            &HashSet::new(),
            2.5,
            false,
        );
        assert_eq!(found, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn zero_length_segment_probes_once() {
        let keypoints = vec![Pt2::new(5.0, 5.0), Pt2::new(6.0, 5.5)];
        let (_, index) = build(&keypoints, 2.0);
        let line = Vec3::new(0.0, 1.0, -5.0);
        let p = Pt2::new(5.5, 5.0);
        let found = find_features_near_epiline(
            &line,
            &[p, p],
            &index,
            &keypoints,
            &HashSet::new(),
            2.0,
            true,
        );
        assert_eq!(found, vec![0, 1]);
    }
}
