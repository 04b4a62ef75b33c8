//! HeadPose: 6-DOF rigid transform of the head relative to the camera.
//!
//! Transforms head-frame points into camera space as `p_cam = R * p_head + t`.
//! Translation is in millimeters, matching the landmark snapshots.

use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadPose {
    pub rotation: UnitQuaternion<f64>,
    pub translation: Vector3<f64>,
}

impl HeadPose {
    pub fn identity() -> Self {
        Self {
            rotation: UnitQuaternion::identity(),
            translation: Vector3::zeros(),
        }
    }

    pub fn new(rotation: UnitQuaternion<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Construct from a rotation matrix and translation.
    pub fn from_rt(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        let rot3 = Rotation3::from_matrix_unchecked(rotation);
        Self {
            rotation: UnitQuaternion::from_rotation_matrix(&rot3),
            translation,
        }
    }

    /// Construct from XYZ Euler angles (radians), composed as `R = Rx * Ry * Rz`.
    ///
    /// This is the ordering landmark fitters report head pose in
    /// (`[tx, ty, tz, rx, ry, rz]`).
    pub fn from_euler(translation: Vector3<f64>, rx: f64, ry: f64, rz: f64) -> Self {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), rx)
            * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), ry)
            * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), rz);
        Self {
            rotation,
            translation,
        }
    }

    /// Construct from the six-element `[tx, ty, tz, rx, ry, rz]` vector.
    pub fn from_vec6(v: &[f64; 6]) -> Self {
        Self::from_euler(Vector3::new(v[0], v[1], v[2]), v[3], v[4], v[5])
    }

    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        Self {
            rotation,
            translation: -(rotation * self.translation),
        }
    }

    /// `self * other`: apply `other` first, then `self`.
    pub fn compose(&self, other: &HeadPose) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
            translation: self.rotation * other.translation + self.translation,
        }
    }

    pub fn transform_point(&self, p: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * p + self.translation
    }

    /// Rotate a direction (translation ignored).
    pub fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * v
    }

    /// Rotate a direction by the inverse rotation.
    pub fn unrotate(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.inverse_transform_vector(v)
    }
}

impl Default for HeadPose {
    fn default() -> Self {
        Self::identity()
    }
}
