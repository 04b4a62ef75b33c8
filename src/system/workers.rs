//! Worker pool: N threads estimating frames in parallel.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow, bail};
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use tracing::{debug, info, warn};

use crate::gaze::{GazeEngine, GazeResult};

use super::calibration::SharedCalibration;
use super::messages::FrameJob;

/// Jobs queued per worker before `submit` blocks.
const JOBS_PER_WORKER: usize = 4;

/// Pool of gaze worker threads.
///
/// Results arrive in completion order, not submission order; each carries
/// the frame id of its snapshot.
pub struct GazeWorkers {
    calibration: Arc<SharedCalibration>,

    /// Dropped on shutdown so the workers' receive loops end.
    job_sender: Option<Sender<FrameJob>>,

    result_receiver: Receiver<GazeResult>,

    handles: Vec<JoinHandle<()>>,
}

impl GazeWorkers {
    /// Spawn `num_workers` threads, each with its own copy of `engine`.
    pub fn new(
        engine: GazeEngine,
        calibration: Arc<SharedCalibration>,
        num_workers: usize,
    ) -> Result<Self> {
        if num_workers == 0 {
            bail!("GazeWorkers needs at least one worker");
        }

        let (job_sender, job_receiver) = bounded::<FrameJob>(num_workers * JOBS_PER_WORKER);
        // Unbounded so a slow consumer never blocks workers into a deadlock
        // with a producer blocked on the job queue.
        let (result_sender, result_receiver) = unbounded::<GazeResult>();

        let mut handles = Vec::with_capacity(num_workers);
        for worker_id in 0..num_workers {
            let handle = Self::spawn_worker(
                worker_id,
                engine.clone(),
                calibration.clone(),
                job_receiver.clone(),
                result_sender.clone(),
            )?;
            handles.push(handle);
        }
        info!(num_workers, "gaze workers started");

        Ok(Self {
            calibration,
            job_sender: Some(job_sender),
            result_receiver,
            handles,
        })
    }

    fn spawn_worker(
        worker_id: usize,
        mut engine: GazeEngine,
        calibration: Arc<SharedCalibration>,
        jobs: Receiver<FrameJob>,
        results: Sender<GazeResult>,
    ) -> Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("gaze-worker-{worker_id}"))
            .spawn(move || {
                for job in jobs.iter() {
                    sync_calibration(&mut engine, &calibration, worker_id);
                    let result = engine.estimate(&job.snapshot, job.head_pose.as_ref());
                    debug!(
                        worker_id,
                        frame = result.frame_id,
                        tracked = result.num_tracked(),
                        "frame estimated"
                    );
                    if results.send(result).is_err() {
                        // Pool dropped while jobs were still queued.
                        break;
                    }
                }
                debug!(worker_id, "gaze worker exiting");
            })
            .with_context(|| format!("Failed to spawn gaze worker {}", worker_id))
    }

    /// Queue a frame, blocking while the job queue is full.
    pub fn submit(&self, job: FrameJob) -> Result<()> {
        let sender = self
            .job_sender
            .as_ref()
            .ok_or_else(|| anyhow!("GazeWorkers already shut down"))?;
        sender
            .send(job)
            .map_err(|e| anyhow!("gaze workers stopped, frame {} dropped", e.0.frame_id()))
    }

    /// Channel of finished frames.
    pub fn results(&self) -> &Receiver<GazeResult> {
        &self.result_receiver
    }

    /// Block until the next result is available.
    ///
    /// `None` once the pool is shut down and every result has been drained.
    pub fn recv_result(&self) -> Option<GazeResult> {
        self.result_receiver.recv().ok()
    }

    pub fn calibration(&self) -> &Arc<SharedCalibration> {
        &self.calibration
    }

    pub fn num_workers(&self) -> usize {
        self.handles.len()
    }

    /// Stop accepting jobs and wait for the workers to finish the queued ones.
    ///
    /// Results of those jobs stay readable from [`Self::results`].
    pub fn shutdown(&mut self) {
        self.job_sender.take();
        let num_workers = self.handles.len();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("gaze worker panicked");
            }
        }
        if num_workers > 0 {
            info!(num_workers, "gaze workers stopped");
        }
    }
}

/// Swap `engine` onto the current shared intrinsics if they changed.
///
/// Returns true when the engine was rebuilt.
fn sync_calibration(
    engine: &mut GazeEngine,
    calibration: &SharedCalibration,
    worker_id: usize,
) -> bool {
    let intrinsics = calibration.get();
    if *engine.intrinsics() == intrinsics {
        return false;
    }
    match engine.with_intrinsics(intrinsics) {
        Ok(updated) => {
            *engine = updated;
            debug!(worker_id, "calibration updated");
            true
        }
        Err(e) => {
            warn!(worker_id, "keeping previous calibration: {}", e);
            false
        }
    }
}

impl Drop for GazeWorkers {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use nalgebra::Vector3;

    use crate::config::EngineConfig;
    use crate::geometry::{CameraIntrinsics, HeadPose};
    use crate::landmarks::SyntheticFace;

    fn intrinsics() -> CameraIntrinsics {
        CameraIntrinsics::new(600.0, 600.0, 320.0, 240.0).unwrap()
    }

    fn pool(num_workers: usize) -> GazeWorkers {
        let calibration = SharedCalibration::new(intrinsics()).unwrap();
        let engine = GazeEngine::new(intrinsics(), EngineConfig::default()).unwrap();
        GazeWorkers::new(engine, calibration, num_workers).unwrap()
    }

    #[test]
    fn test_one_result_per_submitted_frame() {
        let mut workers = pool(3);
        let pose = HeadPose::from_euler(Vector3::new(0.0, 0.0, 600.0), 0.0, 0.0, 0.0);
        let face = SyntheticFace::looking(Vector3::new(0.1, 0.0, -1.0), 12.0).with_head_pose(pose);

        for frame_id in 0..40 {
            workers
                .submit(FrameJob::new(face.snapshot(frame_id), Some(pose)))
                .unwrap();
        }
        workers.shutdown();

        let results: Vec<GazeResult> = workers.results().try_iter().collect();
        assert_eq!(results.len(), 40);
        let ids: BTreeSet<u64> = results.iter().map(|r| r.frame_id).collect();
        assert_eq!(ids, (0..40).collect());
        assert!(results.iter().all(|r| r.num_tracked() == 2));
    }

    #[test]
    fn test_submit_after_shutdown_fails() {
        let mut workers = pool(1);
        workers.shutdown();
        let face = SyntheticFace::looking(Vector3::new(0.0, 0.0, -1.0), 12.0);
        assert!(workers.submit(FrameJob::new(face.snapshot(0), None)).is_err());
        assert!(workers.recv_result().is_none());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let calibration = SharedCalibration::new(intrinsics()).unwrap();
        let engine = GazeEngine::new(intrinsics(), EngineConfig::default()).unwrap();
        assert!(GazeWorkers::new(engine, calibration, 0).is_err());
    }

    #[test]
    fn test_workers_pick_up_new_calibration() {
        let workers = pool(2);
        let updated = CameraIntrinsics::new(900.0, 900.0, 640.0, 360.0).unwrap();
        workers.calibration().set(updated).unwrap();
        assert_eq!(workers.calibration().get(), updated);

        let face = SyntheticFace::looking(Vector3::new(0.0, 0.0, -1.0), 12.0).with_head_pose(
            HeadPose::from_euler(Vector3::new(0.0, 0.0, 500.0), 0.0, 0.0, 0.0),
        );
        workers.submit(FrameJob::new(face.snapshot(7), None)).unwrap();
        let result = workers.recv_result().unwrap();
        assert_eq!(result.frame_id, 7);
        assert_eq!(workers.num_workers(), 2);
    }

    #[test]
    fn test_sync_calibration_swaps_engine_intrinsics() {
        let calibration = SharedCalibration::new(intrinsics()).unwrap();
        let mut engine = GazeEngine::new(intrinsics(), EngineConfig::default()).unwrap();
        assert!(!sync_calibration(&mut engine, &calibration, 0));
        assert_eq!(*engine.intrinsics(), intrinsics());

        let updated = CameraIntrinsics::new(900.0, 900.0, 640.0, 360.0).unwrap();
        calibration.set(updated).unwrap();
        assert!(sync_calibration(&mut engine, &calibration, 0));
        assert_eq!(*engine.intrinsics(), updated);

        // Already current.
        assert!(!sync_calibration(&mut engine, &calibration, 0));
        assert_eq!(*engine.intrinsics(), updated);
    }
}
