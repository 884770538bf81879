use serde::{Deserialize, Serialize};

use crate::Pt2;

/// A feature descriptor supporting a symmetric, non-negative distance.
pub trait Descriptor {
    fn distance(&self, other: &Self) -> f32;
}

/// Real-valued descriptor (SIFT-like) compared with the L2 norm.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FloatDescriptor(pub Vec<f32>);

impl Descriptor for FloatDescriptor {
    fn distance(&self, other: &Self) -> f32 {
        debug_assert_eq!(self.0.len(), other.0.len());
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt()
    }
}

/// 256-bit binary descriptor (ORB/BRIEF-like) compared with the Hamming distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryDescriptor(pub [u8; 32]);

impl Descriptor for BinaryDescriptor {
    fn distance(&self, other: &Self) -> f32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum::<u32>() as f32
    }
}

/// Keypoints of one image with their index-aligned descriptors.
///
/// The index into both arrays is the feature identity used by matches.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct KeypointsAndDescriptors<D> {
    /// Pixel positions.
    pub keypoints: Vec<Pt2>,
    /// Descriptors, `descriptors[i]` belongs to `keypoints[i]`.
    pub descriptors: Vec<D>,
}

impl<D> KeypointsAndDescriptors<D> {
    pub fn new(keypoints: Vec<Pt2>, descriptors: Vec<D>) -> Self {
        Self {
            keypoints,
            descriptors,
        }
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// True if every keypoint has exactly one descriptor.
    pub fn is_consistent(&self) -> bool {
        self.keypoints.len() == self.descriptors.len()
    }
}

/// A correspondence between feature `feature1_ind` of image 1 and feature
/// `feature2_ind` of image 2, scored by descriptor distance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexedFeatureMatch {
    pub feature1_ind: usize,
    pub feature2_ind: usize,
    pub distance: f32,
}

impl IndexedFeatureMatch {
    pub fn new(feature1_ind: usize, feature2_ind: usize, distance: f32) -> Self {
        Self {
            feature1_ind,
            feature2_ind,
            distance,
        }
    }
}
