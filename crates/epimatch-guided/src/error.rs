use thiserror::Error;

/// Reasons a guided matching pass refuses to run.
///
/// None of these abort a broader pipeline: callers treat them as "no
/// additional matches".
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GuidedMatchingError {
    /// The two camera centers coincide, so no epipolar constraint exists.
    #[error("camera centers coincide (baseline {baseline:.3e}); epipolar geometry is undefined")]
    ZeroBaseline { baseline: f64 },
    /// A calibration matrix could not be inverted.
    #[error("intrinsics matrix of camera {camera} is singular")]
    SingularIntrinsics { camera: usize },
    /// The fundamental matrix came out numerically zero.
    #[error("fundamental matrix is ill-conditioned (norm {norm:.3e})")]
    IllConditioned { norm: f64 },
    /// Matcher options failed validation.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    /// Keypoint and descriptor arrays of one image differ in length.
    #[error("image {image}: {keypoints} keypoints but {descriptors} descriptors")]
    FeatureCountMismatch {
        image: usize,
        keypoints: usize,
        descriptors: usize,
    },
    /// A seed match references a feature index outside its image.
    #[error("seed match ({feature1_ind}, {feature2_ind}) is out of range")]
    SeedMatchOutOfRange {
        feature1_ind: usize,
        feature2_ind: usize,
    },
}
