//! Coordinate frame conventions for gaze estimation.
//!
//! Everything the engine consumes and produces lives in one frame: the
//! camera frame, in millimeters.
//!
//! # Camera Frame (RDF - OpenCV/Computer Vision convention)
//! ```text
//!        +Y (down)
//!         |
//!         |
//!         +------ +X (right)
//!        /
//!       /
//!      +Z (forward, optical axis)
//! ```
//! - X: Right (image columns increase)
//! - Y: Down (image rows increase)
//! - Z: Forward (optical axis, into the scene)
//!
//! A face in front of the camera has positive Z. An eye looking straight into
//! the lens therefore gazes along **-Z**, which is the reference direction
//! for gaze angles.
//!
//! # Gaze Angle Convention
//! ```text
//! yaw   = atan2( x, -z)    positive: gaze toward +X (image right)
//! pitch = atan2(-y, -z)    positive: gaze toward -Y (up)
//! ```
//! Both are zero for a gaze along -Z. Mirroring a gaze vector across the
//! camera's Y-Z plane (x -> -x) negates yaw and leaves pitch unchanged.
//!
//! # Head-Stabilized Frame
//! With a head pose `T_cam_head` (rotation R), a camera-space direction `d`
//! is expressed in the head-stabilized frame as `R^-1 * d`. Vectors
//! rotated this way do not change when the head turns while the eyes stay
//! fixed in the head.

use nalgebra::{Unit, Vector3};

/// The camera's optical axis (+Z).
pub fn optical_axis() -> Unit<Vector3<f64>> {
    Vector3::z_axis()
}

/// Direction of a gaze looking straight into the camera (-Z).
pub fn toward_camera() -> Unit<Vector3<f64>> {
    -Vector3::z_axis()
}

/// Mirror a camera-space vector across the Y-Z plane (negate X).
pub fn mirror_x(v: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(-v.x, v.y, v.z)
}
