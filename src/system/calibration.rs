//! Camera calibration shared between the frame source and the workers.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::error::Result;
use crate::geometry::CameraIntrinsics;

/// Process-wide camera intrinsics.
///
/// Written only when the calibration changes; workers copy it out once per
/// job, so a frame is always estimated with a single consistent calibration.
#[derive(Debug)]
pub struct SharedCalibration {
    intrinsics: RwLock<CameraIntrinsics>,
}

impl SharedCalibration {
    pub fn new(intrinsics: CameraIntrinsics) -> Result<Arc<Self>> {
        intrinsics.validate()?;
        Ok(Arc::new(Self {
            intrinsics: RwLock::new(intrinsics),
        }))
    }

    pub fn get(&self) -> CameraIntrinsics {
        *self.intrinsics.read()
    }

    /// Replace the calibration. Frames already being estimated keep the old
    /// one; later jobs pick up the new one.
    pub fn set(&self, intrinsics: CameraIntrinsics) -> Result<()> {
        intrinsics.validate()?;
        *self.intrinsics.write() = intrinsics;
        info!(
            fx = intrinsics.fx,
            fy = intrinsics.fy,
            cx = intrinsics.cx,
            cy = intrinsics.cy,
            "camera calibration updated"
        );
        Ok(())
    }
}
