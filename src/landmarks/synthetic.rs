//! Synthetic landmark snapshots with known eyeball geometry.
//!
//! Each eye is generated in the head frame from an eyeball center, a radius
//! and a gaze direction:
//! - the eyelid contour is an ellipse in the plane perpendicular to the
//!   head's forward axis, one radius in front of the eyeball center,
//! - the iris and pupil rings are circles around the point where the gaze
//!   ray leaves the sphere, perpendicular to the gaze.
//!
//! The head pose then maps everything into camera space. With zero noise the
//! centroid of the rings is exactly the pupil and the plane fit of the
//! contour recovers the eyeball center.

use nalgebra::{Unit, Vector3};

use crate::geometry::HeadPose;
use crate::gaze::EyeSide;
use crate::landmarks::layout::{FACE_LANDMARKS, LandmarkLayout};
use crate::landmarks::snapshot::LandmarkSnapshot;

const SOCKET_POINTS: usize = 12;
const RING_POINTS: usize = 8;
const SOCKET_HALF_WIDTH_MM: f64 = 14.0;
const SOCKET_HALF_HEIGHT_MM: f64 = 5.0;
const IRIS_RADIUS_MM: f64 = 6.0;
const PUPIL_RADIUS_MM: f64 = 2.0;

/// One synthetic eye, in head coordinates.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticEye {
    pub eyeball_center: Vector3<f64>,
    pub radius: f64,
    /// Gaze direction in head coordinates.
    pub gaze: Unit<Vector3<f64>>,
}

impl SyntheticEye {
    pub fn pupil(&self) -> Vector3<f64> {
        self.eyeball_center + self.gaze.as_ref() * self.radius
    }
}

/// A head with two eyes, placed in front of the camera by `head_pose`.
///
/// The head frame is camera-aligned when the pose is identity: X right,
/// Y down, Z away from the camera. Points in front of the eyes therefore have
/// smaller Z than the eyeball centers.
#[derive(Debug, Clone)]
pub struct SyntheticFace {
    pub layout: LandmarkLayout,
    pub head_pose: HeadPose,
    pub left: SyntheticEye,
    pub right: SyntheticEye,
}

impl SyntheticFace {
    /// Eyes 32 mm either side of the head origin, both looking `gaze`
    /// (head coordinates).
    pub fn looking(gaze: Vector3<f64>, radius: f64) -> Self {
        let gaze = Unit::new_normalize(gaze);
        Self {
            layout: LandmarkLayout::clnf_with_eyes(),
            head_pose: HeadPose::identity(),
            left: SyntheticEye {
                eyeball_center: Vector3::new(32.0, 0.0, 0.0),
                radius,
                gaze,
            },
            right: SyntheticEye {
                eyeball_center: Vector3::new(-32.0, 0.0, 0.0),
                radius,
                gaze,
            },
        }
    }

    pub fn with_head_pose(mut self, pose: HeadPose) -> Self {
        self.head_pose = pose;
        self
    }

    pub fn eye(&self, side: EyeSide) -> &SyntheticEye {
        match side {
            EyeSide::Left => &self.left,
            EyeSide::Right => &self.right,
        }
    }

    /// Camera-space eyeball center of an eye.
    pub fn eyeball_center_cam(&self, side: EyeSide) -> Vector3<f64> {
        self.head_pose.transform_point(&self.eye(side).eyeball_center)
    }

    /// Camera-space gaze direction of an eye.
    pub fn gaze_cam(&self, side: EyeSide) -> Unit<Vector3<f64>> {
        Unit::new_normalize(self.head_pose.rotate(&self.eye(side).gaze))
    }

    /// Render the snapshot. `noise` perturbs every landmark; pass a closure
    /// returning zero for exact geometry.
    pub fn snapshot_with_noise<F>(&self, frame_id: u64, mut noise: F) -> LandmarkSnapshot
    where
        F: FnMut() -> Vector3<f64>,
    {
        let mut entries: Vec<(usize, Vector3<f64>)> = Vec::with_capacity(self.layout.num_landmarks);

        // Face landmarks are not used for gaze but fill the layout like a real fit.
        let head_origin = (self.left.eyeball_center + self.right.eyeball_center) / 2.0;
        for i in 0..FACE_LANDMARKS {
            let a = i as f64 / FACE_LANDMARKS as f64 * std::f64::consts::TAU;
            let p = head_origin + Vector3::new(70.0 * a.cos(), 90.0 * a.sin(), -20.0);
            entries.push((i, p));
        }

        for side in [EyeSide::Left, EyeSide::Right] {
            let Some(indices) = self.layout.eye(side) else {
                continue;
            };
            let eye = self.eye(side);
            let (head_u, head_v) = plane_basis(&Vector3::z_axis());

            let socket_center = eye.eyeball_center - Vector3::z() * eye.radius;
            let socket = ring(
                &socket_center,
                &head_u,
                &head_v,
                SOCKET_HALF_WIDTH_MM,
                SOCKET_HALF_HEIGHT_MM,
                SOCKET_POINTS,
            );
            for (&idx, p) in indices.socket.iter().zip(socket) {
                entries.push((idx, p));
            }

            let pupil = eye.pupil();
            let (gaze_u, gaze_v) = plane_basis(&eye.gaze);
            let n_iris = indices.iris.len();
            let n_iris_ring = n_iris.min(RING_POINTS);
            let mut interior =
                ring(&pupil, &gaze_u, &gaze_v, IRIS_RADIUS_MM, IRIS_RADIUS_MM, n_iris_ring);
            interior.extend(ring(
                &pupil,
                &gaze_u,
                &gaze_v,
                PUPIL_RADIUS_MM,
                PUPIL_RADIUS_MM,
                n_iris - n_iris_ring,
            ));
            for (&idx, p) in indices.iris.iter().zip(interior) {
                entries.push((idx, p));
            }
        }

        let pose = self.head_pose;
        LandmarkSnapshot::from_indexed(
            frame_id,
            entries
                .into_iter()
                .map(|(idx, p)| (idx, pose.transform_point(&p) + noise())),
        )
    }

    pub fn snapshot(&self, frame_id: u64) -> LandmarkSnapshot {
        self.snapshot_with_noise(frame_id, || Vector3::zeros())
    }
}

/// Two unit vectors spanning the plane perpendicular to `n`. For `n = +Z`
/// this is (+X, +Y), so ellipse major axes stay horizontal.
fn plane_basis(n: &Unit<Vector3<f64>>) -> (Vector3<f64>, Vector3<f64>) {
    let reference = if n.y.abs() < 0.9 { Vector3::y() } else { Vector3::x() };
    let u = reference.cross(n.as_ref()).normalize();
    let v = n.cross(&u);
    (u, v)
}

fn ring(
    center: &Vector3<f64>,
    u: &Vector3<f64>,
    v: &Vector3<f64>,
    a: f64,
    b: f64,
    n: usize,
) -> Vec<Vector3<f64>> {
    (0..n)
        .map(|i| {
            let t = i as f64 / n as f64 * std::f64::consts::TAU;
            center + u * (a * t.cos()) + v * (b * t.sin())
        })
        .collect()
}
