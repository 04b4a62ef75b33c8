//! GazeAngleConverter: camera-relative (yaw, pitch) of gaze vectors.
//!
//! See [`crate::geometry::frames`] for the sign convention. A gaze straight
//! into the camera (-Z) is (0, 0); positive yaw looks toward image right
//! (+X), positive pitch looks up (-Y).

use nalgebra::{Unit, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{GazeError, Result};

/// Gaze angle in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GazeAngle {
    pub yaw: f64,
    pub pitch: f64,
}

impl GazeAngle {
    pub fn new(yaw: f64, pitch: f64) -> Self {
        Self { yaw, pitch }
    }

    pub fn to_degrees(&self) -> (f64, f64) {
        (self.yaw.to_degrees(), self.pitch.to_degrees())
    }
}

/// Angle of a single gaze vector.
///
/// yaw is the signed angle of the vector's X-Z projection from -Z, pitch the
/// signed angle of its Y-Z projection from -Z (with Y flipped so up is
/// positive). A vanishing projection gives 0 for that component, so a gaze
/// perpendicular to the optical axis never reads as ±π.
pub fn gaze_angle_of(gaze: &Unit<Vector3<f64>>) -> GazeAngle {
    // Adding +0.0 turns -0.0 into +0.0; atan2(±0, -0) would be ±π.
    let toward = -gaze.z + 0.0;
    GazeAngle {
        yaw: (gaze.x + 0.0).atan2(toward),
        pitch: (-gaze.y + 0.0).atan2(toward),
    }
}

/// Combined gaze angle of two eyes.
///
/// Each tracked eye is converted on its own and the angles are averaged
/// component-wise. An untracked eye (`None`) is left out; a single tracked
/// eye yields its own angle unchanged.
pub fn get_gaze_angle(
    left: Option<&Unit<Vector3<f64>>>,
    right: Option<&Unit<Vector3<f64>>>,
) -> Result<GazeAngle> {
    match (left.map(gaze_angle_of), right.map(gaze_angle_of)) {
        (Some(l), Some(r)) => Ok(GazeAngle {
            yaw: (l.yaw + r.yaw) / 2.0,
            pitch: (l.pitch + r.pitch) / 2.0,
        }),
        (Some(angle), None) | (None, Some(angle)) => Ok(angle),
        (None, None) => Err(GazeError::NoGazeAvailable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    use crate::geometry::frames::{mirror_x, toward_camera};

    fn unit(x: f64, y: f64, z: f64) -> Unit<Vector3<f64>> {
        Unit::new_normalize(Vector3::new(x, y, z))
    }

    #[test]
    fn test_looking_at_camera_is_zero() {
        let angle = gaze_angle_of(&toward_camera());
        assert_relative_eq!(angle.yaw, 0.0, epsilon = 1e-12);
        assert_relative_eq!(angle.pitch, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sign_convention() {
        let right = gaze_angle_of(&unit(1.0, 0.0, -1.0));
        assert_relative_eq!(right.yaw, FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(right.pitch, 0.0, epsilon = 1e-12);

        // Camera Y points down, so a negative Y component looks up.
        let up = gaze_angle_of(&unit(0.0, -1.0, -1.0));
        assert_relative_eq!(up.yaw, 0.0, epsilon = 1e-12);
        assert_relative_eq!(up.pitch, FRAC_PI_4, epsilon = 1e-12);
    }

    #[test]
    fn test_known_scenario_single_eye_looking_right() {
        let angle = get_gaze_angle(Some(&unit(1.0, 0.0, 0.0)), None).unwrap();
        assert!(angle.yaw > 0.0);
        assert_relative_eq!(angle.pitch, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mirror_negates_yaw_and_keeps_pitch() {
        let left = unit(0.3, -0.2, -1.0);
        let right = unit(0.05, 0.1, -1.0);
        let angle = get_gaze_angle(Some(&left), Some(&right)).unwrap();

        let ml = Unit::new_normalize(mirror_x(&left));
        let mr = Unit::new_normalize(mirror_x(&right));
        let mirrored = get_gaze_angle(Some(&ml), Some(&mr)).unwrap();

        assert_relative_eq!(mirrored.yaw, -angle.yaw, epsilon = 1e-12);
        assert_relative_eq!(mirrored.pitch, angle.pitch, epsilon = 1e-12);
    }

    #[test]
    fn test_mirror_symmetry_off_the_reference_plane() {
        let cases = [
            (unit(0.0, 0.4, -1.0), unit(0.0, -0.1, -1.0)),
            (unit(0.5, -0.3, 0.0), unit(1.0, 0.0, 0.0)),
        ];
        for (left, right) in cases {
            let angle = get_gaze_angle(Some(&left), Some(&right)).unwrap();
            let ml = Unit::new_normalize(mirror_x(&left));
            let mr = Unit::new_normalize(mirror_x(&right));
            let mirrored = get_gaze_angle(Some(&ml), Some(&mr)).unwrap();
            assert_relative_eq!(mirrored.yaw, -angle.yaw, epsilon = 1e-12);
            assert_relative_eq!(mirrored.pitch, angle.pitch, epsilon = 1e-12);
            assert!(angle.pitch.abs() < FRAC_PI_2 + 1e-12);
        }
    }

    #[test]
    fn test_perpendicular_gaze_has_zero_pitch() {
        for g in [unit(1.0, 0.0, 0.0), unit(-1.0, 0.0, 0.0), unit(1.0, -0.0, -0.0)] {
            let angle = gaze_angle_of(&g);
            assert_relative_eq!(angle.yaw.abs(), FRAC_PI_2, epsilon = 1e-12);
            assert_eq!(angle.pitch, 0.0);
        }
        let up = gaze_angle_of(&unit(0.0, -1.0, 0.0));
        assert_eq!(up.yaw, 0.0);
        assert_relative_eq!(up.pitch, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_single_tracked_eye_is_exact() {
        let g = unit(-0.4, 0.25, -0.8);
        let own = gaze_angle_of(&g);
        assert_eq!(get_gaze_angle(Some(&g), None).unwrap(), own);
        assert_eq!(get_gaze_angle(None, Some(&g)).unwrap(), own);
    }

    #[test]
    fn test_no_tracked_eye_fails() {
        assert_eq!(get_gaze_angle(None, None), Err(GazeError::NoGazeAvailable));
    }

    #[test]
    fn test_averages_angles_not_vectors() {
        let a = unit(1.0, -1.0, -0.5);
        let b = unit(0.0, 0.0, -1.0);
        let combined = get_gaze_angle(Some(&a), Some(&b)).unwrap();
        let expected = (gaze_angle_of(&a).yaw + gaze_angle_of(&b).yaw) / 2.0;
        assert_relative_eq!(combined.yaw, expected, epsilon = 1e-12);

        let mean_vector = Unit::new_normalize(a.into_inner() + b.into_inner());
        assert!((gaze_angle_of(&mean_vector).yaw - combined.yaw).abs() > 1e-3);
    }
}
