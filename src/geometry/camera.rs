//! Pinhole camera intrinsics.

use nalgebra::{Matrix3, Point2, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{GazeError, Result};

/// Points closer to the image plane than this (mm) are not projected.
const MIN_PROJECTION_DEPTH: f64 = 1e-9;

/// Focal lengths and principal point in pixels.
///
/// Process-wide and read-only for the engine; a calibration change (lens
/// switch, device rotation) produces a new value rather than mutating this one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
}

impl CameraIntrinsics {
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> Result<Self> {
        let intrinsics = Self { fx, fy, cx, cy };
        intrinsics.validate()?;
        Ok(intrinsics)
    }

    /// Build from the `[fx, fy, cx, cy]` ordering used by calibration files.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        match values {
            [fx, fy, cx, cy] => Self::new(*fx, *fy, *cx, *cy),
            _ => Err(GazeError::InvalidIntrinsics(format!(
                "expected 4 values [fx, fy, cx, cy], got {}",
                values.len()
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.fx.is_finite() && self.fx > 0.0 && self.fy.is_finite() && self.fy > 0.0) {
            return Err(GazeError::InvalidIntrinsics(format!(
                "focal lengths must be finite and positive (fx={}, fy={})",
                self.fx, self.fy
            )));
        }
        if !(self.cx.is_finite() && self.cy.is_finite()) {
            return Err(GazeError::InvalidIntrinsics(format!(
                "principal point must be finite (cx={}, cy={})",
                self.cx, self.cy
            )));
        }
        Ok(())
    }

    /// 3x3 camera matrix K.
    #[rustfmt::skip]
    pub fn k_matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.fx, 0.0,     self.cx,
            0.0,     self.fy, self.cy,
            0.0,     0.0,     1.0,
        )
    }

    /// Project a camera-space point to pixels. `None` for points at or behind
    /// the image plane.
    pub fn project(&self, p: &Vector3<f64>) -> Option<Point2<f64>> {
        if p.z <= MIN_PROJECTION_DEPTH {
            return None;
        }
        Some(Point2::new(
            self.fx * p.x / p.z + self.cx,
            self.fy * p.y / p.z + self.cy,
        ))
    }

    /// Back-project a pixel at the given depth (Z, mm) into camera space.
    pub fn unproject(&self, pixel: &Point2<f64>, depth: f64) -> Vector3<f64> {
        Vector3::new(
            (pixel.x - self.cx) / self.fx * depth,
            (pixel.y - self.cy) / self.fy * depth,
            depth,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn intrinsics() -> CameraIntrinsics {
        CameraIntrinsics::new(600.0, 610.0, 320.0, 240.0).unwrap()
    }

    #[test]
    fn test_principal_point_projection() {
        let k = intrinsics();
        let px = k.project(&Vector3::new(0.0, 0.0, 500.0)).unwrap();
        assert_relative_eq!(px.x, 320.0, epsilon = 1e-12);
        assert_relative_eq!(px.y, 240.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unproject_inverts_project() {
        let k = intrinsics();
        let p = Vector3::new(-31.0, 12.5, 480.0);
        let px = k.project(&p).unwrap();
        let back = k.unproject(&px, p.z);
        assert_relative_eq!(back, p, epsilon = 1e-9);
    }

    #[test]
    fn test_point_behind_camera_not_projected() {
        assert!(intrinsics().project(&Vector3::new(1.0, 1.0, -5.0)).is_none());
        assert!(intrinsics().project(&Vector3::new(1.0, 1.0, 0.0)).is_none());
    }

    #[test]
    fn test_k_matrix_matches_projection() {
        let k = intrinsics();
        let p = Vector3::new(10.0, -4.0, 300.0);
        let h = k.k_matrix() * p;
        let px = k.project(&p).unwrap();
        assert_relative_eq!(h.x / h.z, px.x, epsilon = 1e-9);
        assert_relative_eq!(h.y / h.z, px.y, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_bad_intrinsics() {
        assert!(CameraIntrinsics::new(0.0, 600.0, 320.0, 240.0).is_err());
        assert!(CameraIntrinsics::new(600.0, f64::NAN, 320.0, 240.0).is_err());
        assert!(CameraIntrinsics::new(600.0, 600.0, f64::INFINITY, 240.0).is_err());
        assert!(CameraIntrinsics::from_slice(&[600.0, 600.0, 320.0]).is_err());
        assert!(CameraIntrinsics::from_slice(&[600.0, 600.0, 320.0, 240.0]).is_ok());
    }
}
