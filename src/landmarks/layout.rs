//! Landmark index layouts of the external tracking model.
//!
//! The default layout is the 68-point CLNF face model followed by two
//! 28-point hierarchical eye models:
//!
//! ```text
//! 0..68     face contour, brows, nose, eyes, mouth
//! 68..96    left eye model
//! 96..124   right eye model
//!
//! within an eye model:
//! 0..8      iris ring
//! 8..20     eyelid contour (eye socket)
//! 20..28    pupil ring
//! ```

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::gaze::EyeSide;

pub const FACE_LANDMARKS: usize = 68;
pub const EYE_MODEL_LANDMARKS: usize = 28;
pub const LEFT_EYE_OFFSET: usize = FACE_LANDMARKS;
pub const RIGHT_EYE_OFFSET: usize = FACE_LANDMARKS + EYE_MODEL_LANDMARKS;

const IRIS_RING: Range<usize> = 0..8;
const EYELID: Range<usize> = 8..20;
const PUPIL_RING: Range<usize> = 20..28;

/// Landmark indices belonging to one eye.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EyeLandmarkIndices {
    /// Eyelid contour around the visible eye opening.
    pub socket: Vec<usize>,
    /// Interior points (iris and pupil rings) whose centroid is the pupil.
    pub iris: Vec<usize>,
}

impl EyeLandmarkIndices {
    /// Indices of a 28-point hierarchical eye model starting at `offset`.
    pub fn hierarchical(offset: usize) -> Self {
        let shift = |r: Range<usize>| r.map(move |i| i + offset);
        Self {
            socket: shift(EYELID).collect(),
            iris: shift(IRIS_RING).chain(shift(PUPIL_RING)).collect(),
        }
    }

    pub fn max_index(&self) -> Option<usize> {
        self.socket.iter().chain(self.iris.iter()).copied().max()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandmarkLayout {
    pub name: String,
    /// Number of landmarks the tracker produces per frame.
    pub num_landmarks: usize,
    pub left_eye: Option<EyeLandmarkIndices>,
    pub right_eye: Option<EyeLandmarkIndices>,
}

impl LandmarkLayout {
    /// CLNF face model with both hierarchical eye models attached.
    pub fn clnf_with_eyes() -> Self {
        Self {
            name: "clnf-68+eyes-28".to_string(),
            num_landmarks: FACE_LANDMARKS + 2 * EYE_MODEL_LANDMARKS,
            left_eye: Some(EyeLandmarkIndices::hierarchical(LEFT_EYE_OFFSET)),
            right_eye: Some(EyeLandmarkIndices::hierarchical(RIGHT_EYE_OFFSET)),
        }
    }

    /// Bare 68-point face model: no iris landmarks, so neither eye can be
    /// modeled.
    pub fn face_only() -> Self {
        Self {
            name: "clnf-68".to_string(),
            num_landmarks: FACE_LANDMARKS,
            left_eye: None,
            right_eye: None,
        }
    }

    pub fn eye(&self, side: EyeSide) -> Option<&EyeLandmarkIndices> {
        match side {
            EyeSide::Left => self.left_eye.as_ref(),
            EyeSide::Right => self.right_eye.as_ref(),
        }
    }
}

impl Default for LandmarkLayout {
    fn default() -> Self {
        Self::clnf_with_eyes()
    }
}
