//! Per-frame landmark snapshot.

use nalgebra::{Point2, Vector3};

use crate::geometry::CameraIntrinsics;

/// Upper bound on landmark indices a snapshot stores. Far above any tracking
/// model in use; indices at or past it are dropped.
pub const MAX_LANDMARKS: usize = 4096;

/// Immutable set of 3D landmarks for one frame, in camera space (mm),
/// indexed by landmark index.
///
/// Landmarks the tracker did not report, and non-finite coordinates, read
/// back as absent.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSnapshot {
    frame_id: u64,
    points: Vec<Option<Vector3<f64>>>,
}

impl LandmarkSnapshot {
    pub fn new(frame_id: u64, points: Vec<Vector3<f64>>) -> Self {
        Self {
            frame_id,
            points: points.into_iter().map(finite).collect(),
        }
    }

    /// Build from `(index, point)` pairs; indices not listed are absent.
    ///
    /// Entries with an index of [`MAX_LANDMARKS`] or more are ignored.
    pub fn from_indexed<I>(frame_id: u64, entries: I) -> Self
    where
        I: IntoIterator<Item = (usize, Vector3<f64>)>,
    {
        let mut points: Vec<Option<Vector3<f64>>> = Vec::new();
        for (idx, p) in entries {
            if idx >= MAX_LANDMARKS {
                continue;
            }
            if idx >= points.len() {
                points.resize(idx + 1, None);
            }
            points[idx] = finite(p);
        }
        Self { frame_id, points }
    }

    /// Back-project 2D pixel landmarks with per-landmark depth (Z, mm).
    ///
    /// Extra pixels without a matching depth are dropped.
    pub fn from_pixels(
        frame_id: u64,
        pixels: &[Point2<f64>],
        depths: &[f64],
        intrinsics: &CameraIntrinsics,
    ) -> Self {
        let points = pixels
            .iter()
            .zip(depths)
            .map(|(px, &z)| intrinsics.unproject(px, z))
            .collect();
        Self::new(frame_id, points)
    }

    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    /// Number of landmark slots (present or not).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<Vector3<f64>> {
        self.points.get(idx).copied().flatten()
    }

    /// Present points among `indices`, in order.
    pub fn gather(&self, indices: &[usize]) -> Vec<Vector3<f64>> {
        indices.iter().filter_map(|&i| self.get(i)).collect()
    }
}

fn finite(p: Vector3<f64>) -> Option<Vector3<f64>> {
    p.iter().all(|c| c.is_finite()).then_some(p)
}
