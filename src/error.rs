//! Error kinds reported by the gaze engine.
//!
//! All of them are frame-local: the engine stores them as per-eye or
//! per-frame markers inside [`GazeResult`](crate::gaze::GazeResult) and keeps
//! running. Only the constructors (engine, intrinsics, eyeball models) return
//! them to the caller directly.

use thiserror::Error;

use crate::gaze::EyeSide;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GazeError {
    #[error("invalid landmark set for {side} eye: {reason}")]
    InvalidLandmarkSet { side: EyeSide, reason: String },

    #[error("degenerate geometry: pupil coincides with eyeball center")]
    DegenerateGeometry,

    #[error("no gaze available: both eyes are not tracked")]
    NoGazeAvailable,

    #[error("invalid camera intrinsics: {0}")]
    InvalidIntrinsics(String),

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}

impl GazeError {
    pub(crate) fn landmarks(side: EyeSide, reason: impl Into<String>) -> Self {
        Self::InvalidLandmarkSet {
            side,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GazeError>;
