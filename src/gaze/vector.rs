//! GazeVectorEstimator: gaze direction under a spherical-eyeball model.

use nalgebra::{Unit, Vector3};

use crate::error::{GazeError, Result};
use crate::geometry::HeadPose;

/// Pupil and eyeball center closer than this (mm) give no direction.
pub const MIN_GAZE_BASELINE_MM: f64 = 1e-6;

/// Unit direction from the eyeball's rotational center through the pupil.
///
/// Fails with `DegenerateGeometry` instead of returning NaN when the two
/// points (nearly) coincide.
pub fn estimate_gaze(
    eyeball_center: &Vector3<f64>,
    pupil: &Vector3<f64>,
) -> Result<Unit<Vector3<f64>>> {
    let ray = pupil - eyeball_center;
    if !ray.iter().all(|c| c.is_finite()) {
        return Err(GazeError::DegenerateGeometry);
    }
    Unit::try_new(ray, MIN_GAZE_BASELINE_MM).ok_or(GazeError::DegenerateGeometry)
}

/// Gaze and eyeball center expressed in the head-stabilized frame.
///
/// Both are rotated by the inverse of the head rotation, so a head turn with
/// the eyes fixed in the head leaves the result unchanged. Translation is not
/// applied: the eyeball center keeps its distance from the camera.
pub fn estimate_eye_gaze(
    eyeball_center: &Vector3<f64>,
    pupil: &Vector3<f64>,
    head_pose: &HeadPose,
) -> Result<(Unit<Vector3<f64>>, Vector3<f64>)> {
    let gaze = estimate_gaze(eyeball_center, pupil)?;
    let stabilized = Unit::new_normalize(head_pose.unrotate(gaze.as_ref()));
    Ok((stabilized, head_pose.unrotate(eyeball_center)))
}
