//! Gaze estimation: eyeball model, pupil location, gaze vector and angle.

pub mod angle;
pub mod engine;
pub mod eyeball;
pub mod pupil;
pub mod result;
pub mod vector;

pub use angle::{GazeAngle, gaze_angle_of, get_gaze_angle};
pub use engine::GazeEngine;
pub use eyeball::{DEFAULT_EYEBALL_RADIUS_MM, EyeSide, EyeballModel};
pub use pupil::{EyeGeometry, locate_pupil_3d};
pub use result::{EyeGaze, EyeState, GazeResult, StabilizedGaze};
pub use vector::{MIN_GAZE_BASELINE_MM, estimate_eye_gaze, estimate_gaze};
