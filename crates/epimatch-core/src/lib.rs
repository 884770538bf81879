//! Core math and geometry primitives for `epimatch`.
//!
//! This crate provides the building blocks consumed by the guided matcher:
//!
//! - linear algebra type aliases (`Real`, `Vec2`, `Pt2`, `Mat3`, `Iso3`, ...),
//! - calibrated, posed pinhole cameras exposing the [`PosedCamera`] capability,
//! - keypoint/descriptor containers and the [`IndexedFeatureMatch`] record.
//!
//! # Modules
//!
//! - \[`math`\]: basic type aliases and homogeneous helpers.
//! - \[`camera`\]: intrinsics and posed camera models.
//! - \[`features`\]: descriptors, keypoint sets and indexed matches.
//! - \[`synthetic`\]: deterministic two-view scene helpers (tests/benchmarks).
//!
//! # Example
//!
//! ```
//! use epimatch_core::{FxFyCxCySkew, Iso3, PinholeCamera, PosedCamera, Pt3};
//!
//! let k = FxFyCxCySkew {
//!     fx: 800.0,
//!     fy: 800.0,
//!     cx: 640.0,
//!     cy: 360.0,
//!     skew: 0.0,
//! };
//! let cam = PinholeCamera::new(k, Iso3::identity());
//! let px = cam.project_world_point(&Pt3::new(0.1, 0.2, 2.0));
//! assert!(px.is_some());
//! assert!(cam.center().coords.norm() < 1e-12);
//! ```

/// Camera intrinsics and posed pinhole cameras.
mod camera;
/// Descriptors, keypoint sets and indexed feature matches.
mod features;
/// Linear algebra type aliases and helpers.
mod math;
/// Deterministic synthetic two-view helpers.
///
/// Used by workspace tests; kept public so downstream integration tests and
/// benchmarks can build reproducible scenes.
pub mod synthetic;

pub use camera::*;
pub use features::*;
pub use math::*;
