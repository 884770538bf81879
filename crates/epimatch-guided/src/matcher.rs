//! Guided matching along epipolar lines.
//!
//! Pipeline of one call:
//! 1. collect the features already consumed by the seed matches,
//! 2. build the bounding box and staggered grids over the unmatched image-2
//!    keypoints, and the fundamental matrix from the cameras,
//! 3. group unmatched image-1 features by epipolar line,
//! 4. per group (optionally in parallel): clip the line to the box, gather
//!    nearby candidates, rank them by descriptor distance,
//! 5. serially, in group order, accept matches passing the ratio test and
//!    the exact line-distance check; a feature is never used twice.

use std::collections::HashSet;

use epimatch_core::{Descriptor, IndexedFeatureMatch, KeypointsAndDescriptors, Mat3, PosedCamera};
use log::{debug, trace};
use rayon::prelude::*;

use crate::{
    epipolar_line, find_features_near_epiline, find_k_nearest_neighbors,
    fundamental_from_cameras, group_epipolar_lines, intersect_line_with_box, point_line_distance,
    BoundingBox, EpilineGroup, GridIndex, GuidedMatcherOptions, GuidedMatchingError,
    NearestNeighbors,
};

/// Counters describing one guided matching pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuidedMatchingSummary {
    /// Image-1 features not covered by the seed matches.
    pub unmatched1: usize,
    /// Image-2 features not covered by the seed matches.
    pub unmatched2: usize,
    /// Epipolar line groups formed.
    pub groups: usize,
    /// Groups whose line missed the search box.
    pub dropped_groups: usize,
    /// Matches appended by this pass.
    pub accepted: usize,
}

/// Feature indices already used by a match, one set per image.
#[derive(Debug, Clone, Default)]
struct MatchedFeatures {
    image1: HashSet<usize>,
    image2: HashSet<usize>,
}

impl MatchedFeatures {
    fn from_matches(matches: &[IndexedFeatureMatch]) -> Self {
        Self {
            image1: matches.iter().map(|m| m.feature1_ind).collect(),
            image2: matches.iter().map(|m| m.feature2_ind).collect(),
        }
    }

    fn is_free(&self, feature1: usize, feature2: usize) -> bool {
        !self.image1.contains(&feature1) && !self.image2.contains(&feature2)
    }

    fn insert(&mut self, feature1: usize, feature2: usize) {
        self.image1.insert(feature1);
        self.image2.insert(feature2);
    }
}

/// Read-only search structures of one call.
struct SearchContext {
    f: Mat3,
    search_box: BoundingBox,
    grid: GridIndex,
    unmatched1: Vec<usize>,
    unmatched2: usize,
}

/// Candidates and their ranking for one group, index-aligned with the
/// group's features.
struct GroupProposal {
    neighbors: Vec<NearestNeighbors>,
}

/// Finds additional matches between two posed views, given seed matches.
///
/// Only features without a seed match take part. New matches are appended
/// to the caller's list; existing entries are never removed or reordered.
pub struct GuidedEpipolarMatcher<'a, C, D> {
    options: GuidedMatcherOptions,
    camera1: &'a C,
    camera2: &'a C,
    features1: &'a KeypointsAndDescriptors<D>,
    features2: &'a KeypointsAndDescriptors<D>,
}

impl<'a, C, D> GuidedEpipolarMatcher<'a, C, D>
where
    C: PosedCamera + Sync,
    D: Descriptor + Sync,
{
    pub fn new(
        options: GuidedMatcherOptions,
        camera1: &'a C,
        camera2: &'a C,
        features1: &'a KeypointsAndDescriptors<D>,
        features2: &'a KeypointsAndDescriptors<D>,
    ) -> Self {
        Self {
            options,
            camera1,
            camera2,
            features1,
            features2,
        }
    }

    pub fn options(&self) -> &GuidedMatcherOptions {
        &self.options
    }

    /// Run one guided pass, appending accepted matches to `matches`.
    ///
    /// Returns `false` when the pass could not run (degenerate geometry or
    /// invalid input); `matches` is then left untouched. Finding zero new
    /// matches is still a success.
    pub fn get_matches(&self, matches: &mut Vec<IndexedFeatureMatch>) -> bool {
        match self.try_get_matches(matches) {
            Ok(_) => true,
            Err(err) => {
                debug!("guided matching skipped: {err}");
                false
            }
        }
    }

    /// Like [`GuidedEpipolarMatcher::get_matches`], reporting why a pass was
    /// refused and what a successful pass did.
    pub fn try_get_matches(
        &self,
        matches: &mut Vec<IndexedFeatureMatch>,
    ) -> Result<GuidedMatchingSummary, GuidedMatchingError> {
        let mut matched = self.validate_seeds(matches)?;
        let Some(ctx) = self.initialize(&matched)? else {
            debug!("guided matching: no unmatched features, nothing to do");
            return Ok(GuidedMatchingSummary {
                unmatched1: self.features1.len() - matched.image1.len(),
                unmatched2: self.features2.len() - matched.image2.len(),
                ..Default::default()
            });
        };

        let mut groups = group_epipolar_lines(
            &ctx.f,
            &self.features1.keypoints,
            &ctx.unmatched1,
            &ctx.search_box,
            self.options.epiline_group_tolerance_pixels,
        );

        let proposals: Vec<GroupProposal> = if self.options.parallel {
            groups
                .par_iter_mut()
                .map(|group| self.propose(&ctx, &matched, group))
                .collect()
        } else {
            groups
                .iter_mut()
                .map(|group| self.propose(&ctx, &matched, group))
                .collect()
        };

        let mut summary = GuidedMatchingSummary {
            unmatched1: ctx.unmatched1.len(),
            unmatched2: ctx.unmatched2,
            groups: groups.len(),
            ..Default::default()
        };
        for (group, proposal) in groups.iter().zip(proposals) {
            if group.endpoints.is_none() {
                summary.dropped_groups += 1;
                continue;
            }
            summary.accepted += self.accept(&ctx, group, &proposal, &mut matched, matches);
        }

        debug!(
            "guided matching: {} + {} unmatched features, {} groups ({} dropped), {} new matches",
            summary.unmatched1,
            summary.unmatched2,
            summary.groups,
            summary.dropped_groups,
            summary.accepted
        );
        Ok(summary)
    }

    /// Check options and inputs, and collect the features used by `seeds`.
    fn validate_seeds(
        &self,
        seeds: &[IndexedFeatureMatch],
    ) -> Result<MatchedFeatures, GuidedMatchingError> {
        self.options.validate()?;
        for (image, features) in [(1, self.features1), (2, self.features2)] {
            if !features.is_consistent() {
                return Err(GuidedMatchingError::FeatureCountMismatch {
                    image,
                    keypoints: features.keypoints.len(),
                    descriptors: features.descriptors.len(),
                });
            }
        }
        if let Some(bad) = seeds.iter().find(|m| {
            m.feature1_ind >= self.features1.len() || m.feature2_ind >= self.features2.len()
        }) {
            return Err(GuidedMatchingError::SeedMatchOutOfRange {
                feature1_ind: bad.feature1_ind,
                feature2_ind: bad.feature2_ind,
            });
        }
        Ok(MatchedFeatures::from_matches(seeds))
    }

    /// Build the fundamental matrix, the search box and the grid index.
    ///
    /// Returns `Ok(None)` when either image has no unmatched feature.
    fn initialize(
        &self,
        matched: &MatchedFeatures,
    ) -> Result<Option<SearchContext>, GuidedMatchingError> {
        let f = fundamental_from_cameras(self.camera1, self.camera2)?;

        let unmatched1: Vec<usize> = (0..self.features1.len())
            .filter(|i| !matched.image1.contains(i))
            .collect();
        let unmatched2: Vec<usize> = (0..self.features2.len())
            .filter(|i| !matched.image2.contains(i))
            .collect();
        if unmatched1.is_empty() || unmatched2.is_empty() {
            return Ok(None);
        }

        let keypoints2 = &self.features2.keypoints;
        let Some(bbox) = BoundingBox::from_points(unmatched2.iter().map(|&i| &keypoints2[i]))
        else {
            return Ok(None);
        };
        // Lines passing just outside the outermost features must still clip.
        let radius = self.options.search_radius();
        let search_box = bbox.expanded(radius);

        let mut grid = GridIndex::staggered(&search_box, radius);
        for &i in &unmatched2 {
            grid.add_feature(i, &keypoints2[i]);
        }
        trace!(
            "grid index: cell size {:.2}, {} occupied cells over {} grids",
            grid.cell_size(),
            grid.grids().iter().map(|g| g.num_cells()).sum::<usize>(),
            grid.grids().len()
        );

        Ok(Some(SearchContext {
            f,
            search_box,
            grid,
            unmatched1,
            unmatched2: unmatched2.len(),
        }))
    }

    /// Clip the group's line, gather candidates and rank them. Reads shared
    /// state only, so groups can be processed concurrently.
    fn propose(
        &self,
        ctx: &SearchContext,
        matched: &MatchedFeatures,
        group: &mut EpilineGroup,
    ) -> GroupProposal {
        group.endpoints = intersect_line_with_box(&group.line, &ctx.search_box);
        let Some(segment) = group.endpoints else {
            debug!(
                "epiline group of feature {} misses the search box; dropped",
                group.representative
            );
            return GroupProposal {
                neighbors: Vec::new(),
            };
        };

        let candidates = find_features_near_epiline(
            &group.line,
            &segment,
            &ctx.grid,
            &self.features2.keypoints,
            &matched.image2,
            self.options.search_radius(),
            self.options.search_neighbor_cells,
        );
        trace!(
            "epiline group of feature {}: {} queries, {} candidates",
            group.representative,
            group.features.len(),
            candidates.len()
        );

        GroupProposal {
            neighbors: find_k_nearest_neighbors(
                &group.features,
                &candidates,
                &self.features1.descriptors,
                &self.features2.descriptors,
            ),
        }
    }

    /// Apply the ratio test and the exact line-distance check to one group,
    /// appending survivors. Returns the number of accepted matches.
    fn accept(
        &self,
        ctx: &SearchContext,
        group: &EpilineGroup,
        proposal: &GroupProposal,
        matched: &mut MatchedFeatures,
        matches: &mut Vec<IndexedFeatureMatch>,
    ) -> usize {
        let max_dist = self.options.guided_matching_max_distance_pixels;
        let mut accepted = 0;
        for (&query, nn) in group.features.iter().zip(&proposal.neighbors) {
            if !nn.passes_ratio_test(self.options.lowes_ratio) {
                continue;
            }
            let Some(best) = nn.best else {
                continue;
            };
            // First accepted wins: an earlier group may have claimed the candidate.
            if !matched.is_free(query, best.index) {
                continue;
            }
            let line = epipolar_line(&ctx.f, &self.features1.keypoints[query]);
            if point_line_distance(&line, &self.features2.keypoints[best.index]) > max_dist {
                continue;
            }
            matches.push(IndexedFeatureMatch::new(query, best.index, best.distance));
            matched.insert(query, best.index);
            accepted += 1;
        }
        accepted
    }
}
