//! Geometry utilities: camera intrinsics, head pose, frame conventions, fitting.

pub mod camera;
pub mod fitting;
pub mod frames;
pub mod pose;

pub use camera::CameraIntrinsics;
pub use fitting::{PlaneFit, centroid, fit_plane, intersect_ray_sphere, principal_spread};
pub use pose::HeadPose;
