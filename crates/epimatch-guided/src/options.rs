//! Configuration for guided epipolar matching.

use serde::{Deserialize, Serialize};

use crate::GuidedMatchingError;

/// Options for [`crate::GuidedEpipolarMatcher`].
///
/// # Example
///
/// ```
/// use epimatch_guided::GuidedMatcherOptions;
///
/// let opts = GuidedMatcherOptions {
///     lowes_ratio: 0.7,
///     ..Default::default()
/// };
/// assert!(opts.validate().is_ok());
/// assert_eq!(opts.guided_matching_max_distance_pixels, 2.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidedMatcherOptions {
    /// Features closer than this to the epipolar line are considered for
    /// matching, and accepted matches must satisfy it against the exact line.
    pub guided_matching_max_distance_pixels: f64,
    /// Keep a match only if the best descriptor distance is at most
    /// `lowes_ratio` times the second best.
    pub lowes_ratio: f64,
    /// Largest deviation, inside the feature bounding box, between a
    /// feature's own epipolar line and the line of the group it joins.
    pub epiline_group_tolerance_pixels: f64,
    /// Probe the 3x3 block of cells around the closest cell center instead
    /// of the closest cell only.
    pub search_neighbor_cells: bool,
    /// Retrieve and rank candidates for groups on the rayon thread pool.
    pub parallel: bool,
}

impl Default for GuidedMatcherOptions {
    fn default() -> Self {
        Self {
            guided_matching_max_distance_pixels: 2.0,
            lowes_ratio: 0.8,
            epiline_group_tolerance_pixels: 0.5,
            search_neighbor_cells: true,
            parallel: true,
        }
    }
}

impl GuidedMatcherOptions {
    /// Half-width of the strip searched around a group's line: the distance
    /// threshold plus the grouping tolerance.
    pub fn search_radius(&self) -> f64 {
        self.guided_matching_max_distance_pixels + self.epiline_group_tolerance_pixels
    }

    /// Check that thresholds are finite and consistent.
    pub fn validate(&self) -> Result<(), GuidedMatchingError> {
        let max_dist = self.guided_matching_max_distance_pixels;
        if !max_dist.is_finite() || max_dist <= 0.0 {
            return Err(GuidedMatchingError::InvalidOptions(format!(
                "guided_matching_max_distance_pixels must be positive, got {max_dist}"
            )));
        }
        if !self.lowes_ratio.is_finite() || self.lowes_ratio <= 0.0 || self.lowes_ratio > 1.0 {
            return Err(GuidedMatchingError::InvalidOptions(format!(
                "lowes_ratio must be in (0, 1], got {}",
                self.lowes_ratio
            )));
        }
        let tol = self.epiline_group_tolerance_pixels;
        if !tol.is_finite() || tol < 0.0 || tol > max_dist {
            return Err(GuidedMatchingError::InvalidOptions(format!(
                "epiline_group_tolerance_pixels must be in [0, {max_dist}], got {tol}"
            )));
        }
        Ok(())
    }
}
