//! Eye-gaze estimation from 3D facial landmarks.
//!
//! Given one frame of landmarks from a face tracker (a 68-point face model
//! plus a 28-point model per eye), the engine models each eye as a sphere,
//! locates the pupil and eyeball center, and produces a unit gaze vector per
//! eye and a combined (yaw, pitch) angle relative to the camera.
//!
//! ```text
//! LandmarkSnapshot ─▶ locate_pupil_3d ─▶ estimate_gaze ─▶ get_gaze_angle ─▶ GazeResult
//!                      (per eye)          (per eye)        (both eyes)
//! ```
//!
//! Frames are independent. [`system::GazeWorkers`] runs the engine on a
//! thread pool for recorded or live sequences.

pub mod config;
pub mod error;
pub mod gaze;
pub mod geometry;
pub mod io;
pub mod landmarks;
pub mod system;

pub use config::{EngineConfig, LocatorSettings};
pub use error::GazeError;
pub use gaze::{EyeGaze, EyeSide, EyeState, GazeAngle, GazeEngine, GazeResult};
pub use geometry::{CameraIntrinsics, HeadPose};
pub use landmarks::{LandmarkLayout, LandmarkSnapshot};
