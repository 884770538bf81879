use nalgebra::{Matrix3, Point2, RealField};
use serde::{Deserialize, Serialize};

use crate::{Iso3, Mat3, Pt2, Pt3, Real};

/// Intrinsics that map normalized image-plane coordinates to pixel coordinates.
pub trait IntrinsicsModel<S: RealField + Copy> {
    /// Convert normalized coordinates (z = 1 plane) into pixel coordinates.
    fn normalized_to_pixel(&self, n: &Point2<S>) -> Point2<S>;
}

/// Standard pinhole intrinsics with optional skew.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FxFyCxCySkew<S: RealField + Copy> {
    /// Focal length in pixels along X.
    pub fx: S,
    /// Focal length in pixels along Y.
    pub fy: S,
    /// Principal point X coordinate in pixels.
    pub cx: S,
    /// Principal point Y coordinate in pixels.
    pub cy: S,
    /// Skew term (typically 0).
    pub skew: S,
}

impl<S: RealField + Copy> FxFyCxCySkew<S> {
    /// Return the 3x3 camera intrinsics matrix K.
    pub fn k_matrix(&self) -> Matrix3<S> {
        Matrix3::new(
            self.fx,
            self.skew,
            self.cx,
            S::zero(),
            self.fy,
            self.cy,
            S::zero(),
            S::zero(),
            S::one(),
        )
    }
}

impl<S: RealField + Copy> IntrinsicsModel<S> for FxFyCxCySkew<S> {
    fn normalized_to_pixel(&self, n: &Point2<S>) -> Point2<S> {
        let u = self.fx * n.x + self.skew * n.y + self.cx;
        let v = self.fy * n.y + self.cy;
        Point2::new(u, v)
    }
}

/// Capability of a calibrated, posed camera: enough to derive epipolar
/// geometry against another camera of the same kind.
///
/// `camera_se3_world` maps world points into the camera frame
/// (`p_c = camera_se3_world * p_w`).
pub trait PosedCamera {
    /// Pinhole calibration matrix K (pixels).
    fn intrinsics_matrix(&self) -> Mat3;

    /// World -> camera rigid transform.
    fn camera_se3_world(&self) -> Iso3;

    /// Camera center in world coordinates.
    fn center(&self) -> Pt3 {
        self.camera_se3_world().inverse_transform_point(&Pt3::origin())
    }
}

/// Distortion-free pinhole camera with a world pose.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PinholeCamera {
    /// Intrinsics (K).
    pub k: FxFyCxCySkew<Real>,
    /// World -> camera transform.
    pub camera_se3_world: Iso3,
}

impl PinholeCamera {
    pub fn new(k: FxFyCxCySkew<Real>, camera_se3_world: Iso3) -> Self {
        Self {
            k,
            camera_se3_world,
        }
    }

    /// Project a world point into pixel coordinates.
    ///
    /// Returns `None` if the point is on or behind the image plane.
    pub fn project_world_point(&self, p_w: &Pt3) -> Option<Pt2> {
        let p_c = self.camera_se3_world.transform_point(p_w);
        if p_c.z <= 0.0 {
            return None;
        }
        Some(self.k.normalized_to_pixel(&Pt2::new(p_c.x / p_c.z, p_c.y / p_c.z)))
    }
}

impl PosedCamera for PinholeCamera {
    fn intrinsics_matrix(&self) -> Mat3 {
        self.k.k_matrix()
    }

    fn camera_se3_world(&self) -> Iso3 {
        self.camera_se3_world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec3;
    use nalgebra::{Translation3, UnitQuaternion};

    fn intrinsics() -> FxFyCxCySkew<Real> {
        FxFyCxCySkew {
            fx: 800.0,
            fy: 780.0,
            cx: 640.0,
            cy: 360.0,
            skew: 0.5,
        }
    }

    #[test]
    fn k_matrix_agrees_with_model() {
        let k = intrinsics();
        let n = Pt2::new(0.12, -0.3);
        let h = k.k_matrix() * Vec3::new(n.x, n.y, 1.0);
        let via_matrix = Pt2::new(h.x / h.z, h.y / h.z);
        assert!((via_matrix - k.normalized_to_pixel(&n)).norm() < 1e-10);
    }

    #[test]
    fn center_is_inverse_translation() {
        let rot = UnitQuaternion::from_euler_angles(0.1, -0.2, 0.05);
        let center = Pt3::new(0.4, -0.1, 1.5);
        let camera_se3_world =
            Iso3::from_parts(Translation3::from(-(rot * center.coords)), rot);
        let cam = PinholeCamera::new(intrinsics(), camera_se3_world);
        assert!((cam.center() - center).norm() < 1e-12);
    }

    #[test]
    fn points_behind_camera_are_not_projected() {
        let cam = PinholeCamera::new(intrinsics(), Iso3::identity());
        assert!(cam.project_world_point(&Pt3::new(0.0, 0.0, -1.0)).is_none());
        assert!(cam.project_world_point(&Pt3::new(0.0, 0.0, 1.0)).is_some());
    }

    #[test]
    fn camera_serde_roundtrip() -> anyhow::Result<()> {
        let cam = PinholeCamera::new(intrinsics(), Iso3::identity());
        let json = serde_json::to_string(&cam)?;
        let restored: PinholeCamera = serde_json::from_str(&json)?;
        assert_eq!(restored, cam);
        Ok(())
    }
}
