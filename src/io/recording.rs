//! Replay of recorded landmark sequences from CSV and YAML files.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, StringRecord};
use nalgebra::Vector3;
use serde::Deserialize;
use tracing::{info, warn};

use crate::geometry::{CameraIntrinsics, HeadPose};
use crate::landmarks::{LandmarkSnapshot, MAX_LANDMARKS};
use crate::system::FrameJob;

pub const LANDMARKS_FILE: &str = "landmarks.csv";
pub const HEAD_POSE_FILE: &str = "head_pose.csv";
pub const CAMERA_FILE: &str = "camera.yaml";

/// A recorded landmark sequence: one snapshot per frame, an optional head
/// pose per frame, and the camera calibration.
#[derive(Debug, Clone)]
pub struct Recording {
    root: PathBuf,
    pub intrinsics: CameraIntrinsics,
    /// Sorted by frame id.
    pub snapshots: Vec<LandmarkSnapshot>,
    pub head_poses: BTreeMap<u64, HeadPose>,
}

impl Recording {
    pub fn load<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let intrinsics = load_camera_yaml(&root.join(CAMERA_FILE))?;
        let snapshots = load_landmarks(&root.join(LANDMARKS_FILE))?;

        // Head poses are optional: without them the gaze stays in camera space.
        let pose_path = root.join(HEAD_POSE_FILE);
        let head_poses = if pose_path.exists() {
            load_head_poses(&pose_path)?
        } else {
            BTreeMap::new()
        };

        let missing = snapshots
            .iter()
            .filter(|s| !head_poses.is_empty() && !head_poses.contains_key(&s.frame_id()))
            .count();
        if missing > 0 {
            warn!("{} of {} frames have no head pose", missing, snapshots.len());
        }
        info!(
            root = %root.display(),
            frames = snapshots.len(),
            head_poses = head_poses.len(),
            "loaded recording"
        );

        Ok(Self {
            root,
            intrinsics,
            snapshots,
            head_poses,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn head_pose(&self, frame_id: u64) -> Option<&HeadPose> {
        self.head_poses.get(&frame_id)
    }

    /// Worker jobs in frame order.
    pub fn jobs(&self) -> impl Iterator<Item = FrameJob> + '_ {
        self.snapshots.iter().map(|snapshot| {
            let pose = self.head_pose(snapshot.frame_id()).copied();
            FrameJob::new(snapshot.clone(), pose)
        })
    }
}

#[derive(Debug, Deserialize)]
struct CameraYaml {
    /// [fx, fy, cx, cy]
    intrinsics: Vec<f64>,
}

fn load_camera_yaml(path: &Path) -> Result<CameraIntrinsics> {
    let camera: CameraYaml = serde_yaml::from_reader(
        File::open(path).with_context(|| format!("Failed to open {:?}", path))?,
    )
    .with_context(|| format!("Failed to parse {:?}", path))?;
    CameraIntrinsics::from_slice(&camera.intrinsics)
        .with_context(|| format!("Invalid intrinsics in {:?}", path))
}

fn open_csv(path: &Path) -> Result<csv::Reader<File>> {
    ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))
}

fn parse_field<T>(rec: &StringRecord, col: usize, path: &Path) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let line = rec.position().map(|p| p.line()).unwrap_or(0);
    rec[col]
        .parse()
        .with_context(|| format!("{}:{}: bad value {:?} in column {}", path.display(), line, &rec[col], col))
}

/// `frame_id,index,x,y,z` rows, grouped into one snapshot per frame.
fn load_landmarks(path: &Path) -> Result<Vec<LandmarkSnapshot>> {
    let mut rdr = open_csv(path)?;

    let mut frames: BTreeMap<u64, Vec<(usize, Vector3<f64>)>> = BTreeMap::new();
    let mut skipped = 0usize;
    for rec in rdr.records() {
        let rec = rec?;
        if rec.len() < 5 {
            skipped += 1;
            continue;
        }
        let frame_id: u64 = parse_field(&rec, 0, path)?;
        let index: usize = parse_field(&rec, 1, path)?;
        if index >= MAX_LANDMARKS {
            let line = rec.position().map(|p| p.line()).unwrap_or(0);
            bail!(
                "{}:{}: landmark index {} out of range (max {})",
                path.display(),
                line,
                index,
                MAX_LANDMARKS - 1
            );
        }
        let point = Vector3::new(
            parse_field(&rec, 2, path)?,
            parse_field(&rec, 3, path)?,
            parse_field(&rec, 4, path)?,
        );
        frames.entry(frame_id).or_default().push((index, point));
    }
    if skipped > 0 {
        warn!("Skipped {} short rows in {}", skipped, path.display());
    }
    if frames.is_empty() {
        bail!("No landmarks in {}", path.display());
    }

    Ok(frames
        .into_iter()
        .map(|(frame_id, points)| LandmarkSnapshot::from_indexed(frame_id, points))
        .collect())
}

/// `frame_id,tx,ty,tz,rx,ry,rz` rows (mm, radians).
fn load_head_poses(path: &Path) -> Result<BTreeMap<u64, HeadPose>> {
    let mut rdr = open_csv(path)?;

    let mut poses = BTreeMap::new();
    for rec in rdr.records() {
        let rec = rec?;
        if rec.len() < 7 {
            warn!("Skipping short head pose row in {}", path.display());
            continue;
        }
        let frame_id: u64 = parse_field(&rec, 0, path)?;
        let mut v = [0.0; 6];
        for (k, slot) in v.iter_mut().enumerate() {
            *slot = parse_field(&rec, k + 1, path)?;
        }
        if poses.insert(frame_id, HeadPose::from_vec6(&v)).is_some() {
            warn!("Duplicate head pose for frame {}, keeping the last", frame_id);
        }
    }
    Ok(poses)
}
