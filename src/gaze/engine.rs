//! GazeEngine: per-frame gaze estimation from a landmark snapshot.
//!
//! The engine holds only read-only configuration (intrinsics, eyeball
//! models, thresholds). Every call is a pure function of its arguments, so a
//! single engine can be shared across worker threads and frames.

use nalgebra::Point2;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::gaze::eyeball::{EyeSide, EyeballModel};
use crate::gaze::pupil::locate_pupil_3d;
use crate::gaze::result::{EyeGaze, EyeState, GazeResult, StabilizedGaze};
use crate::gaze::vector::{estimate_eye_gaze, estimate_gaze};
use crate::geometry::{CameraIntrinsics, HeadPose};
use crate::landmarks::LandmarkSnapshot;

#[derive(Debug, Clone)]
pub struct GazeEngine {
    intrinsics: CameraIntrinsics,
    config: EngineConfig,
    left: EyeballModel,
    right: EyeballModel,
}

impl GazeEngine {
    /// Build both eyeball models from the configured layout.
    ///
    /// Fails if the intrinsics or config are invalid, or if the layout lacks
    /// landmarks for either eye.
    pub fn new(intrinsics: CameraIntrinsics, config: EngineConfig) -> Result<Self> {
        intrinsics.validate()?;
        config.validate()?;
        let left = EyeballModel::new(EyeSide::Left, config.eyeball_radius_mm, &config.layout)?;
        let right = EyeballModel::new(EyeSide::Right, config.eyeball_radius_mm, &config.layout)?;
        Ok(Self {
            intrinsics,
            config,
            left,
            right,
        })
    }

    /// Same engine for a new camera calibration.
    pub fn with_intrinsics(&self, intrinsics: CameraIntrinsics) -> Result<Self> {
        intrinsics.validate()?;
        Ok(Self {
            intrinsics,
            ..self.clone()
        })
    }

    pub fn intrinsics(&self) -> &CameraIntrinsics {
        &self.intrinsics
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn eyeball_model(&self, side: EyeSide) -> &EyeballModel {
        match side {
            EyeSide::Left => &self.left,
            EyeSide::Right => &self.right,
        }
    }

    /// Estimate both eyes and the combined angle for one frame.
    ///
    /// Eye failures do not abort the frame: they become
    /// [`EyeState::NotTracked`], and the angle uses whichever eyes remain.
    pub fn estimate(&self, snapshot: &LandmarkSnapshot, head_pose: Option<&HeadPose>) -> GazeResult {
        let [left, right] = EyeSide::BOTH.map(|side| {
            let state = EyeState::from(self.estimate_eye(side, snapshot, head_pose));
            if let Some(reason) = state.reason() {
                debug!(frame = snapshot.frame_id(), %side, %reason, "eye not tracked");
            }
            state
        });
        GazeResult::from_eyes(snapshot.frame_id(), left, right)
    }

    /// Estimate one eye.
    ///
    /// The gaze is always camera-space. The head-stabilized copy is added
    /// only when a head pose is given and `head_stabilized` is enabled in the
    /// config.
    pub fn estimate_eye(
        &self,
        side: EyeSide,
        snapshot: &LandmarkSnapshot,
        head_pose: Option<&HeadPose>,
    ) -> Result<EyeGaze> {
        let model = self.eyeball_model(side);
        let geometry = locate_pupil_3d(snapshot, model, &self.config.locator)?;
        let gaze = estimate_gaze(&geometry.eyeball_center, &geometry.pupil)?;

        let stabilized = match head_pose.filter(|_| self.config.head_stabilized) {
            Some(pose) => {
                let (gaze, eyeball_center) =
                    estimate_eye_gaze(&geometry.eyeball_center, &geometry.pupil, pose)?;
                Some(StabilizedGaze {
                    gaze,
                    eyeball_center,
                })
            }
            None => None,
        };

        Ok(EyeGaze {
            gaze,
            eyeball_center: geometry.eyeball_center,
            pupil: geometry.pupil,
            stabilized,
        })
    }

    /// Pixel endpoints of a gaze ray for overlay drawing: the eyeball center
    /// and the point `length_mm` along the camera-space gaze.
    ///
    /// `None` when either endpoint is behind the camera.
    pub fn gaze_ray_pixels(&self, eye: &EyeGaze, length_mm: f64) -> Option<(Point2<f64>, Point2<f64>)> {
        let start = self.intrinsics.project(&eye.eyeball_center)?;
        let end = self
            .intrinsics
            .project(&(eye.eyeball_center + eye.gaze.as_ref() * length_mm))?;
        Some((start, end))
    }
}
