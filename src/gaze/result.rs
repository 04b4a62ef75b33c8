//! Per-frame gaze results.
//!
//! These types describe what the engine found in a single frame:
//! - per eye: tracked (gaze, eyeball center, pupil) or not tracked, with why
//! - the combined camera-relative gaze angle, or why none is available
//!
//! Gaze and eyeball center are always in camera space. When a head pose was
//! applied, the head-stabilized copies ride along in [`StabilizedGaze`].
//!
//! Nothing here outlives the frame it was computed for.

use nalgebra::{Unit, Vector3};

use crate::error::{GazeError, Result};
use crate::gaze::angle::{GazeAngle, get_gaze_angle};
use crate::gaze::eyeball::EyeSide;

/// Gaze of one tracked eye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeGaze {
    /// Unit gaze direction in camera space.
    pub gaze: Unit<Vector3<f64>>,
    /// Eyeball center in camera space.
    pub eyeball_center: Vector3<f64>,
    /// Pupil position in camera space.
    pub pupil: Vector3<f64>,
    /// Gaze and eyeball center with the head rotation removed, when a head
    /// pose was applied.
    pub stabilized: Option<StabilizedGaze>,
}

/// Gaze of one eye in the head-stabilized frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilizedGaze {
    pub gaze: Unit<Vector3<f64>>,
    pub eyeball_center: Vector3<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EyeState {
    Tracked(EyeGaze),
    NotTracked { reason: GazeError },
}

impl EyeState {
    pub fn is_tracked(&self) -> bool {
        matches!(self, EyeState::Tracked(_))
    }

    pub fn gaze(&self) -> Option<&EyeGaze> {
        match self {
            EyeState::Tracked(g) => Some(g),
            EyeState::NotTracked { .. } => None,
        }
    }

    pub fn gaze_vector(&self) -> Option<&Unit<Vector3<f64>>> {
        self.gaze().map(|g| &g.gaze)
    }

    pub fn stabilized_gaze_vector(&self) -> Option<&Unit<Vector3<f64>>> {
        self.gaze().and_then(|g| g.stabilized.as_ref()).map(|s| &s.gaze)
    }

    pub fn reason(&self) -> Option<&GazeError> {
        match self {
            EyeState::Tracked(_) => None,
            EyeState::NotTracked { reason } => Some(reason),
        }
    }
}

impl From<Result<EyeGaze>> for EyeState {
    fn from(r: Result<EyeGaze>) -> Self {
        match r {
            Ok(g) => EyeState::Tracked(g),
            Err(reason) => EyeState::NotTracked { reason },
        }
    }
}

/// Everything computed for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GazeResult {
    pub frame_id: u64,
    pub left: EyeState,
    pub right: EyeState,
    /// Combined camera-relative angle, or `NoGazeAvailable` when neither eye
    /// is tracked.
    pub angle: Result<GazeAngle>,
}

impl GazeResult {
    /// Assemble a result from both eye states, computing the combined angle.
    pub fn from_eyes(frame_id: u64, left: EyeState, right: EyeState) -> Self {
        let angle = get_gaze_angle(left.gaze_vector(), right.gaze_vector());
        Self {
            frame_id,
            left,
            right,
            angle,
        }
    }

    pub fn eye(&self, side: EyeSide) -> &EyeState {
        match side {
            EyeSide::Left => &self.left,
            EyeSide::Right => &self.right,
        }
    }

    /// Combined angle of the head-stabilized gazes. `NoGazeAvailable` when no
    /// tracked eye carries one.
    pub fn stabilized_angle(&self) -> Result<GazeAngle> {
        get_gaze_angle(
            self.left.stabilized_gaze_vector(),
            self.right.stabilized_gaze_vector(),
        )
    }

    pub fn num_tracked(&self) -> usize {
        [&self.left, &self.right]
            .iter()
            .filter(|e| e.is_tracked())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracked(x: f64) -> EyeState {
        EyeState::Tracked(EyeGaze {
            gaze: Unit::new_normalize(Vector3::new(x, 0.0, -1.0)),
            eyeball_center: Vector3::new(0.0, 0.0, 500.0),
            pupil: Vector3::new(0.0, 0.0, 488.0),
            stabilized: None,
        })
    }

    fn lost() -> EyeState {
        EyeState::NotTracked {
            reason: GazeError::DegenerateGeometry,
        }
    }

    #[test]
    fn test_untracked_eyes_yield_no_angle() {
        let result = GazeResult::from_eyes(4, lost(), lost());
        assert_eq!(result.angle, Err(GazeError::NoGazeAvailable));
        assert_eq!(result.num_tracked(), 0);
        assert_eq!(result.left.reason(), Some(&GazeError::DegenerateGeometry));
    }

    #[test]
    fn test_one_eye_tracked() {
        let result = GazeResult::from_eyes(4, lost(), tracked(0.5));
        assert_eq!(result.num_tracked(), 1);
        assert!(result.angle.as_ref().unwrap().yaw > 0.0);
        assert!(result.eye(EyeSide::Right).is_tracked());
        assert!(!result.eye(EyeSide::Left).is_tracked());
    }

    #[test]
    fn test_stabilized_angle_needs_stabilized_gaze() {
        let result = GazeResult::from_eyes(1, tracked(0.5), tracked(0.0));
        assert!(result.angle.is_ok());
        assert_eq!(result.stabilized_angle(), Err(GazeError::NoGazeAvailable));

        let mut left = tracked(0.5);
        if let EyeState::Tracked(g) = &mut left {
            g.stabilized = Some(StabilizedGaze {
                gaze: Unit::new_normalize(Vector3::new(0.0, 0.0, -1.0)),
                eyeball_center: g.eyeball_center,
            });
        }
        let result = GazeResult::from_eyes(1, left, tracked(0.0));
        let stabilized = result.stabilized_angle().unwrap();
        assert_eq!(stabilized.yaw, 0.0);
        assert!(result.angle.as_ref().unwrap().yaw > 0.0);
    }

    #[test]
    fn test_from_result() {
        let state: EyeState = Err(GazeError::NoGazeAvailable).into();
        assert!(!state.is_tracked());
        assert!(state.gaze_vector().is_none());
    }
}
