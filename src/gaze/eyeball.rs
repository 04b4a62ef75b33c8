//! Geometric model of one eye: which landmarks belong to it and how large
//! the eyeball is.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GazeError, Result};
use crate::landmarks::{EyeLandmarkIndices, LandmarkLayout};

/// Population-average eyeball radius (mm).
pub const DEFAULT_EYEBALL_RADIUS_MM: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EyeSide {
    Left,
    Right,
}

impl EyeSide {
    pub const BOTH: [EyeSide; 2] = [EyeSide::Left, EyeSide::Right];
}

impl fmt::Display for EyeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EyeSide::Left => f.write_str("left"),
            EyeSide::Right => f.write_str("right"),
        }
    }
}

/// Fixed-radius spherical eyeball bound to the landmark indices of one eye.
#[derive(Debug, Clone, PartialEq)]
pub struct EyeballModel {
    side: EyeSide,
    radius: f64,
    indices: EyeLandmarkIndices,
}

impl EyeballModel {
    /// Fails if the layout has no indices for `side`, if either the socket
    /// or the iris subset is empty, or if `radius` is not a positive finite
    /// length.
    pub fn new(side: EyeSide, radius: f64, layout: &LandmarkLayout) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(GazeError::landmarks(
                side,
                format!("eyeball radius must be positive, got {radius}"),
            ));
        }
        let indices = layout.eye(side).ok_or_else(|| {
            GazeError::landmarks(side, format!("layout `{}` has no eye landmarks", layout.name))
        })?;
        if indices.socket.is_empty() {
            return Err(GazeError::landmarks(side, "no eye-socket landmark indices"));
        }
        if indices.iris.is_empty() {
            return Err(GazeError::landmarks(side, "no iris landmark indices"));
        }
        let max = indices.max_index().unwrap_or(0);
        if max >= layout.num_landmarks {
            return Err(GazeError::landmarks(
                side,
                format!(
                    "landmark index {max} outside layout of {} points",
                    layout.num_landmarks
                ),
            ));
        }
        Ok(Self {
            side,
            radius,
            indices: indices.clone(),
        })
    }

    pub fn side(&self) -> EyeSide {
        self.side
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn socket_indices(&self) -> &[usize] {
        &self.indices.socket
    }

    pub fn iris_indices(&self) -> &[usize] {
        &self.indices.iris
    }
}
