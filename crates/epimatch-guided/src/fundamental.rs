//! Fundamental matrix from two posed cameras, and epipolar line helpers.
//!
//! `F` maps a homogeneous pixel `x1` of image 1 to the line `l2 = F x1` of
//! image 2, with `x2^T F x1 = 0` for corresponding pixels.

use epimatch_core::{skew_symmetric, to_homogeneous, Mat3, PosedCamera, Pt2, Real, Vec3};

use crate::GuidedMatchingError;

/// Baselines at or below this fraction of the scene scale count as zero.
const RELATIVE_BASELINE_EPS: Real = 1e-9;

/// Compute the fundamental matrix from calibrations and poses.
///
/// Uses `F = K2^{-T} [t]_x R K1^{-1}` where `(R, t)` is the pose of camera 1
/// expressed in camera 2 (`cam2_se3_cam1`). The result is scaled to unit
/// Frobenius norm.
pub fn fundamental_from_cameras<C: PosedCamera>(
    camera1: &C,
    camera2: &C,
) -> Result<Mat3, GuidedMatchingError> {
    let c1 = camera1.center();
    let c2 = camera2.center();
    let baseline = (c2 - c1).norm();
    let scale = 1.0 + c1.coords.norm().max(c2.coords.norm());
    if baseline <= RELATIVE_BASELINE_EPS * scale {
        return Err(GuidedMatchingError::ZeroBaseline { baseline });
    }

    let k1_inv = camera1
        .intrinsics_matrix()
        .try_inverse()
        .ok_or(GuidedMatchingError::SingularIntrinsics { camera: 1 })?;
    let k2_inv = camera2
        .intrinsics_matrix()
        .try_inverse()
        .ok_or(GuidedMatchingError::SingularIntrinsics { camera: 2 })?;

    let cam2_se3_cam1 = camera2.camera_se3_world() * camera1.camera_se3_world().inverse();
    let r = cam2_se3_cam1.rotation.to_rotation_matrix().into_inner();
    let t = cam2_se3_cam1.translation.vector;
    let essential = skew_symmetric(&t) * r;

    let f = k2_inv.transpose() * essential * k1_inv;
    let norm = f.norm();
    if !norm.is_finite() || norm < Real::EPSILON {
        return Err(GuidedMatchingError::IllConditioned { norm });
    }
    Ok(f / norm)
}

/// Epipolar line in image 2 induced by pixel `p1` of image 1.
pub fn epipolar_line(f: &Mat3, p1: &Pt2) -> Vec3 {
    f * to_homogeneous(p1)
}

/// Scale a line `(a, b, c)` so that `a^2 + b^2 = 1`.
///
/// Returns `None` for the line at infinity (the query point is the epipole).
pub fn normalize_line(line: &Vec3) -> Option<Vec3> {
    let n = line.x.hypot(line.y);
    if !n.is_finite() || n <= Real::EPSILON * line.z.abs().max(1.0) {
        return None;
    }
    Some(line / n)
}

/// Perpendicular pixel distance from `p` to the line `ax + by + c = 0`.
///
/// Degenerate lines are infinitely far from every point.
pub fn point_line_distance(line: &Vec3, p: &Pt2) -> Real {
    match normalize_line(line) {
        Some(l) => (l.x * p.x + l.y * p.y + l.z).abs(),
        None => Real::INFINITY,
    }
}

/// Distance in image 2 from `p2` to the epipolar line of `p1`.
pub fn epipolar_distance(f: &Mat3, p1: &Pt2, p2: &Pt2) -> Real {
    point_line_distance(&epipolar_line(f, p1), p2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use epimatch_core::{synthetic::TwoViewScene, FxFyCxCySkew, Iso3, PinholeCamera, Pt3};
    use nalgebra::{Translation3, UnitQuaternion};

    fn k() -> FxFyCxCySkew<Real> {
        FxFyCxCySkew {
            fx: 800.0,
            fy: 790.0,
            cx: 640.0,
            cy: 360.0,
            skew: 0.0,
        }
    }

    #[test]
    fn corresponding_points_lie_on_epipolar_lines() {
        let scene = TwoViewScene::planar_grid(
            k(),
            5,
            4,
            0.25,
            4.0,
            Pt3::new(0.4, 0.05, -0.1),
            (0.01, -0.03, 0.02),
        )
        .expect("visible scene");
        let f = fundamental_from_cameras(&scene.camera1, &scene.camera2).unwrap();
        assert!((f.norm() - 1.0).abs() < 1e-12);
        assert!(f.determinant().abs() < 1e-9);

        for (p1, p2) in scene.pixels1.iter().zip(scene.pixels2.iter()) {
            let d = epipolar_distance(&f, p1, p2);
            assert!(d < 1e-6, "epipolar distance {d}");
        }
    }

    #[test]
    fn coincident_centers_are_degenerate() {
        let cam1 = PinholeCamera::new(k(), Iso3::identity());
        let rot = UnitQuaternion::from_euler_angles(0.0, 0.2, 0.0);
        let cam2 = PinholeCamera::new(k(), Iso3::from_parts(Translation3::identity(), rot));
        let err = fundamental_from_cameras(&cam1, &cam2).unwrap_err();
        assert!(matches!(err, GuidedMatchingError::ZeroBaseline { .. }));
    }

    #[test]
    fn singular_intrinsics_are_rejected() {
        let mut bad = k();
        bad.fx = 0.0;
        let cam1 = PinholeCamera::new(bad, Iso3::identity());
        let cam2 = epimatch_core::synthetic::camera_at(
            k(),
            UnitQuaternion::identity(),
            Pt3::new(1.0, 0.0, 0.0),
        );
        let err = fundamental_from_cameras(&cam1, &cam2).unwrap_err();
        assert_eq!(err, GuidedMatchingError::SingularIntrinsics { camera: 1 });
    }

    #[test]
    fn line_distance_is_perpendicular() {
        // 3x + 4y - 10 = 0 scaled arbitrarily.
        let line = Vec3::new(6.0, 8.0, -20.0);
        let d = point_line_distance(&line, &Pt2::new(0.0, 0.0));
        assert!((d - 2.0).abs() < 1e-12);
        let on = point_line_distance(&line, &Pt2::new(2.0, 1.0));
        assert!(on < 1e-12);
        assert!(normalize_line(&Vec3::new(0.0, 0.0, 1.0)).is_none());
        assert_eq!(
            point_line_distance(&Vec3::new(0.0, 0.0, 1.0), &Pt2::origin()),
            Real::INFINITY
        );
    }
}
