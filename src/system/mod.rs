//! Multi-threaded frame processing.
//!
//! `GazeWorkers` runs a pool of worker threads that each own a `GazeEngine`
//! and pull frames from a bounded job channel. The camera calibration is
//! shared through `SharedCalibration` and read once per job.

mod calibration;
pub mod messages;
mod workers;

pub use calibration::SharedCalibration;
pub use messages::FrameJob;
pub use workers::GazeWorkers;
