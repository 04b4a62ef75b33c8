//! Messages sent to worker threads.

use crate::geometry::HeadPose;
use crate::landmarks::LandmarkSnapshot;

/// One frame to estimate.
#[derive(Debug, Clone)]
pub struct FrameJob {
    /// Landmarks of the frame; its frame id tags the result.
    pub snapshot: LandmarkSnapshot,

    /// Head pose from the face tracker, if one was estimated for this frame.
    pub head_pose: Option<HeadPose>,
}

impl FrameJob {
    pub fn new(snapshot: LandmarkSnapshot, head_pose: Option<HeadPose>) -> Self {
        Self {
            snapshot,
            head_pose,
        }
    }

    pub fn frame_id(&self) -> u64 {
        self.snapshot.frame_id()
    }
}
