//! Guided feature matching between two posed, calibrated views.
//!
//! Given seed correspondences, features left unmatched in image 1 are
//! projected as epipolar lines into image 2. Unmatched image-2 features near
//! each line are retrieved through a spatial grid and ranked by descriptor
//! distance; matches passing Lowe's ratio test and a line-distance check are
//! appended to the seed list.
//!
//! # Example
//!
//! ```
//! use epimatch_core::{
//!     synthetic::TwoViewScene, FloatDescriptor, FxFyCxCySkew, IndexedFeatureMatch,
//!     KeypointsAndDescriptors, Pt3,
//! };
//! use epimatch_guided::{GuidedEpipolarMatcher, GuidedMatcherOptions};
//!
//! let k = FxFyCxCySkew { fx: 800.0, fy: 800.0, cx: 640.0, cy: 360.0, skew: 0.0 };
//! let baseline = Pt3::new(0.5, 0.0, 0.0);
//! let scene = TwoViewScene::planar_grid(k, 3, 3, 0.4, 5.0, baseline, (0.0, 0.0, 0.0))
//!     .expect("visible");
//! let descriptors: Vec<FloatDescriptor> = (0..9)
//!     .map(|i| FloatDescriptor((0..9).map(|j| if i == j { 10.0 } else { 0.0 }).collect()))
//!     .collect();
//! let features1 = KeypointsAndDescriptors::new(scene.pixels1.clone(), descriptors.clone());
//! let features2 = KeypointsAndDescriptors::new(scene.pixels2.clone(), descriptors);
//!
//! let mut matches = vec![IndexedFeatureMatch::new(0, 0, 0.0)];
//! let matcher = GuidedEpipolarMatcher::new(
//!     GuidedMatcherOptions::default(),
//!     &scene.camera1,
//!     &scene.camera2,
//!     &features1,
//!     &features2,
//! );
//! assert!(matcher.get_matches(&mut matches));
//! assert_eq!(matches[0], IndexedFeatureMatch::new(0, 0, 0.0));
//! ```

mod bbox;
mod candidates;
mod epilines;
mod error;
mod fundamental;
mod grid;
mod intersect;
mod knn;
mod matcher;
mod options;

pub use bbox::BoundingBox;
pub use candidates::find_features_near_epiline;
pub use epilines::{group_epipolar_lines, EpilineGroup};
pub use error::GuidedMatchingError;
pub use fundamental::{
    epipolar_distance, epipolar_line, fundamental_from_cameras, normalize_line,
    point_line_distance,
};
pub use grid::{CellKey, GridIndex, ImageGrid};
pub use intersect::intersect_line_with_box;
pub use knn::{find_k_nearest_neighbors, NearestNeighbors, Neighbor};
pub use matcher::{GuidedEpipolarMatcher, GuidedMatchingSummary};
pub use options::GuidedMatcherOptions;
