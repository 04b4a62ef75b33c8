//! Landmark snapshots and the index layout of the tracking model.

pub mod layout;
pub mod snapshot;
pub mod synthetic;

pub use layout::{EyeLandmarkIndices, LandmarkLayout};
pub use snapshot::{LandmarkSnapshot, MAX_LANDMARKS};
pub use synthetic::{SyntheticEye, SyntheticFace};
