//! Synthetic two-view helpers.
//!
//! The functions here build planar point grids, place pinhole cameras by
//! their world centers, and project the points into both views. Output order
//! is deterministic so tests can refer to points by index.

use nalgebra::{Translation3, UnitQuaternion};

use crate::{FxFyCxCySkew, Iso3, PinholeCamera, Pt2, Pt3, Real};

/// Generate an `nx * ny` grid of points on the plane `z = depth`, centered
/// on the optical axis.
///
/// Points are ordered row-major (Y major): index `j * nx + i`.
pub fn grid_points_on_plane(nx: usize, ny: usize, spacing: Real, depth: Real) -> Vec<Pt3> {
    let x0 = -0.5 * spacing * nx.saturating_sub(1) as Real;
    let y0 = -0.5 * spacing * ny.saturating_sub(1) as Real;
    let mut points = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            points.push(Pt3::new(
                x0 + i as Real * spacing,
                y0 + j as Real * spacing,
                depth,
            ));
        }
    }
    points
}

/// Build a camera from its world-frame center and its world -> camera rotation.
pub fn camera_at(
    k: FxFyCxCySkew<Real>,
    camera_r_world: UnitQuaternion<Real>,
    center: Pt3,
) -> PinholeCamera {
    let t = -(camera_r_world * center.coords);
    PinholeCamera::new(k, Iso3::from_parts(Translation3::from(t), camera_r_world))
}

/// Project every point, failing if any point is behind the camera.
pub fn project_all(camera: &PinholeCamera, points: &[Pt3]) -> Option<Vec<Pt2>> {
    points
        .iter()
        .map(|p| camera.project_world_point(p))
        .collect()
}

/// Two posed cameras observing the same world points.
#[derive(Clone, Debug)]
pub struct TwoViewScene {
    pub camera1: PinholeCamera,
    pub camera2: PinholeCamera,
    pub world_points: Vec<Pt3>,
    /// Projections into camera 1, index-aligned with `world_points`.
    pub pixels1: Vec<Pt2>,
    /// Projections into camera 2, index-aligned with `world_points`.
    pub pixels2: Vec<Pt2>,
}

impl TwoViewScene {
    /// Project `world_points` into both cameras.
    ///
    /// Returns `None` if any point is not visible from both cameras.
    pub fn new(
        camera1: PinholeCamera,
        camera2: PinholeCamera,
        world_points: Vec<Pt3>,
    ) -> Option<Self> {
        let pixels1 = project_all(&camera1, &world_points)?;
        let pixels2 = project_all(&camera2, &world_points)?;
        Some(Self {
            camera1,
            camera2,
            world_points,
            pixels1,
            pixels2,
        })
    }

    /// A fronto-parallel planar grid seen by a reference camera at the
    /// origin and a second camera displaced by `baseline` with a small
    /// rotation given as roll/pitch/yaw.
    pub fn planar_grid(
        k: FxFyCxCySkew<Real>,
        nx: usize,
        ny: usize,
        spacing: Real,
        depth: Real,
        baseline: Pt3,
        rpy: (Real, Real, Real),
    ) -> Option<Self> {
        let camera1 = PinholeCamera::new(k, Iso3::identity());
        let rot = UnitQuaternion::from_euler_angles(rpy.0, rpy.1, rpy.2);
        let camera2 = camera_at(k, rot, baseline);
        Self::new(
            camera1,
            camera2,
            grid_points_on_plane(nx, ny, spacing, depth),
        )
    }
}
