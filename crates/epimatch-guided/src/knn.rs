//! Top-2 descriptor ranking of candidate features.

use epimatch_core::{Descriptor, Real};

/// One ranked candidate: an image-2 feature and its descriptor distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f32,
}

/// The two closest candidates of a query feature, `best.distance <=
/// second.distance`. Slots stay empty when fewer candidates exist.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NearestNeighbors {
    pub best: Option<Neighbor>,
    pub second: Option<Neighbor>,
}

impl NearestNeighbors {
    /// Offer a candidate; keeps the two smallest distances seen so far.
    ///
    /// Earlier candidates win ties. NaN distances are ignored.
    pub fn offer(&mut self, candidate: Neighbor) {
        if candidate.distance.is_nan() {
            return;
        }
        match self.best {
            Some(best) if candidate.distance >= best.distance => {
                if self
                    .second
                    .map_or(true, |second| candidate.distance < second.distance)
                {
                    self.second = Some(candidate);
                }
            }
            _ => {
                self.second = self.best;
                self.best = Some(candidate);
            }
        }
    }

    /// Lowe's ratio test: `d1 <= ratio * d2`. Fails without a second neighbor.
    ///
    /// Two candidates both at distance exactly zero pass (`0 <= ratio * 0`),
    /// which happens with identical binary descriptors.
    pub fn passes_ratio_test(&self, lowes_ratio: Real) -> bool {
        match (self.best, self.second) {
            (Some(best), Some(second)) => {
                Real::from(best.distance) <= lowes_ratio * Real::from(second.distance)
            }
            _ => false,
        }
    }
}

/// For every query feature of image 1, find its two nearest candidates of
/// image 2 by descriptor distance.
///
/// The output is index-aligned with `query_features`.
pub fn find_k_nearest_neighbors<D: Descriptor>(
    query_features: &[usize],
    candidate_features: &[usize],
    descriptors1: &[D],
    descriptors2: &[D],
) -> Vec<NearestNeighbors> {
    query_features
        .iter()
        .map(|&query| {
            let query_desc = &descriptors1[query];
            let mut nn = NearestNeighbors::default();
            for &candidate in candidate_features {
                nn.offer(Neighbor {
                    index: candidate,
                    distance: query_desc.distance(&descriptors2[candidate]),
                });
            }
            nn
        })
        .collect()
}
