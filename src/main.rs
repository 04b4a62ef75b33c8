use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use nalgebra::Vector3;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use gaze_engine::config::EngineConfig;
use gaze_engine::gaze::{EyeSide, EyeState, GazeEngine, GazeResult};
use gaze_engine::geometry::{CameraIntrinsics, HeadPose};
use gaze_engine::io::recording::Recording;
use gaze_engine::landmarks::SyntheticFace;
use gaze_engine::system::{FrameJob, GazeWorkers, SharedCalibration};

const USAGE: &str = "usage: gaze-replay (<recording_dir> | --synthetic) [--config <engine.yaml>] [--workers <n>]";

/// Frames generated by `--synthetic`.
const SYNTHETIC_FRAMES: u64 = 60;

#[derive(Debug)]
struct Args {
    recording: Option<PathBuf>,
    synthetic: bool,
    config: Option<PathBuf>,
    workers: usize,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        recording: None,
        synthetic: false,
        config: None,
        workers: std::thread::available_parallelism().map_or(2, |n| n.get()),
    };

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--synthetic" => args.synthetic = true,
            "--config" => {
                args.config = Some(it.next().context("--config needs a path")?.into());
            }
            "--workers" => {
                let n = it.next().context("--workers needs a count")?;
                args.workers = n.parse().with_context(|| format!("bad worker count {:?}", n))?;
            }
            "-h" | "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            other if !other.starts_with("--") && args.recording.is_none() => {
                args.recording = Some(other.into());
            }
            other => bail!("unexpected argument {:?}\n{}", other, USAGE),
        }
    }

    if args.synthetic == args.recording.is_some() {
        bail!("pass exactly one of <recording_dir> or --synthetic\n{}", USAGE);
    }
    Ok(args)
}

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(d) = "gaze_engine=info".parse() {
        filter = filter.add_directive(d);
    }
    fmt().with_env_filter(filter).init();
}

/// Head turning left to right while the eyes sweep the other way.
fn synthetic_jobs() -> Vec<FrameJob> {
    (0..SYNTHETIC_FRAMES)
        .map(|frame_id| {
            let t = frame_id as f64 / (SYNTHETIC_FRAMES - 1) as f64 * 2.0 - 1.0;
            let pose = HeadPose::from_euler(Vector3::new(0.0, 0.0, 600.0), 0.1 * t, 0.4 * t, 0.0);
            let face = SyntheticFace::looking(Vector3::new(-0.3 * t, 0.1, -1.0), 12.0)
                .with_head_pose(pose);
            FrameJob::new(face.snapshot(frame_id), Some(pose))
        })
        .collect()
}

fn describe(result: &GazeResult) -> String {
    let eyes = EyeSide::BOTH
        .iter()
        .filter_map(|&side| match result.eye(side) {
            EyeState::Tracked(_) => None,
            EyeState::NotTracked { reason } => Some(format!("{} not tracked: {}", side, reason)),
        })
        .collect::<Vec<_>>()
        .join("; ");

    let angle = match &result.angle {
        Ok(angle) => {
            let (yaw, pitch) = angle.to_degrees();
            format!("yaw {:+7.2} deg  pitch {:+7.2} deg", yaw, pitch)
        }
        Err(e) => format!("{}", e),
    };
    let angle = match result.stabilized_angle() {
        Ok(stabilized) => {
            let (yaw, pitch) = stabilized.to_degrees();
            format!("{}  [head frame yaw {:+7.2} pitch {:+7.2}]", angle, yaw, pitch)
        }
        Err(_) => angle,
    };

    if eyes.is_empty() {
        format!("frame {:>6}: {}", result.frame_id, angle)
    } else {
        format!("frame {:>6}: {}  ({})", result.frame_id, angle, eyes)
    }
}

fn main() -> Result<()> {
    init_logging();
    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let (intrinsics, jobs) = match &args.recording {
        Some(root) => {
            let recording = Recording::load(root)?;
            (recording.intrinsics, recording.jobs().collect::<Vec<_>>())
        }
        None => (CameraIntrinsics::new(600.0, 600.0, 320.0, 240.0)?, synthetic_jobs()),
    };

    let engine = GazeEngine::new(intrinsics, config)?;
    let calibration = SharedCalibration::new(intrinsics)?;
    let mut workers = GazeWorkers::new(engine, calibration, args.workers)?;

    let num_jobs = jobs.len();
    for job in jobs {
        workers.submit(job)?;
    }
    workers.shutdown();

    // Workers finish out of order.
    let results: BTreeMap<u64, GazeResult> = workers
        .results()
        .try_iter()
        .map(|r| (r.frame_id, r))
        .collect();

    let mut tracked = 0usize;
    for result in results.values() {
        if result.angle.is_ok() {
            tracked += 1;
        }
        println!("{}", describe(result));
    }

    info!(frames = num_jobs, with_gaze = tracked, "replay finished");
    Ok(())
}
