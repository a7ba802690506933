#![allow(dead_code)]

use posecam_camera::{
    CameraError, FrameLedger, FrameSource, FrameTensor, Resolution, SyntheticCamera,
};
use posecam_infer::{InferError, Keypoint, Pose, PoseEstimator};
use posecam_scheduler::CancellationToken;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Semaphore, mpsc};

pub const INFERENCE: Resolution = Resolution::new(180, 240);

/// Synthetic frames at a small size, with pull counting and failure
/// injection.
pub struct TestSource {
    camera: SyntheticCamera,
    pulls: Arc<AtomicU64>,
    fail_at_pull: Option<u64>,
}

impl TestSource {
    pub fn new() -> Self {
        Self {
            camera: SyntheticCamera::new(Resolution::new(6, 8)),
            pulls: Arc::new(AtomicU64::new(0)),
            fail_at_pull: None,
        }
    }

    /// The n-th pull (1-based) fails.
    pub fn failing_at(mut self, pull: u64) -> Self {
        self.fail_at_pull = Some(pull);
        self
    }

    pub fn ledger(&self) -> FrameLedger {
        self.camera.ledger().clone()
    }

    pub fn pulls(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.pulls)
    }
}

impl FrameSource for TestSource {
    async fn recv(&mut self) -> Result<FrameTensor, CameraError> {
        let pull = self.pulls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_at_pull == Some(pull) {
            return Err(CameraError::Stream("camera unplugged".to_string()));
        }
        self.camera.recv().await
    }

    fn resolution(&self) -> Resolution {
        INFERENCE
    }
}

/// What the estimator observed, shared with the test body.
#[derive(Clone, Default)]
pub struct Probe {
    pub calls: Arc<AtomicU64>,
    in_flight: Arc<AtomicU64>,
    pub max_in_flight: Arc<AtomicU64>,
    pub frames: Arc<Mutex<Vec<u64>>>,
    pub timestamps: Arc<Mutex<Vec<u64>>>,
}

impl Probe {
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn frames(&self) -> Vec<u64> {
        self.frames.lock().unwrap().clone()
    }
}

pub struct TestEstimator {
    probe: Probe,
    poses: Vec<Pose>,
    fail_on_calls: HashSet<u64>,
    cancel_on_call: Option<(u64, CancellationToken)>,
    gate: Option<(mpsc::UnboundedSender<u64>, Arc<Semaphore>)>,
}

impl TestEstimator {
    pub fn new(probe: Probe) -> Self {
        Self {
            probe,
            poses: vec![nose_pose(90.0, 32.0, 0.5)],
            fail_on_calls: HashSet::new(),
            cancel_on_call: None,
            gate: None,
        }
    }

    pub fn returning(mut self, poses: Vec<Pose>) -> Self {
        self.poses = poses;
        self
    }

    /// The listed calls (1-based) return a runtime error.
    pub fn failing_on(mut self, calls: &[u64]) -> Self {
        self.fail_on_calls = calls.iter().copied().collect();
        self
    }

    /// Cancel `token` from inside the n-th call, as a teardown racing an
    /// in-flight inference would.
    pub fn cancelling_on(mut self, call: u64, token: CancellationToken) -> Self {
        self.cancel_on_call = Some((call, token));
        self
    }

    /// Each call reports its number on `entered` and then waits for a permit.
    pub fn gated(mut self, entered: mpsc::UnboundedSender<u64>, permits: Arc<Semaphore>) -> Self {
        self.gate = Some((entered, permits));
        self
    }
}

impl PoseEstimator for TestEstimator {
    async fn estimate(&mut self, frame: &FrameTensor, timestamp_ms: u64) -> Result<Vec<Pose>, InferError> {
        let call = self.probe.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let in_flight = self.probe.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.probe.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        self.probe.frames.lock().unwrap().push(frame.sequence());
        self.probe.timestamps.lock().unwrap().push(timestamp_ms);

        if let Some((entered, permits)) = &self.gate {
            let _ = entered.send(call);
            permits.acquire().await.expect("semaphore closed").forget();
        }
        tokio::task::yield_now().await;

        if let Some((at, token)) = &self.cancel_on_call {
            if *at == call {
                token.cancel();
            }
        }

        self.probe.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.fail_on_calls.contains(&call) {
            return Err(InferError::Runtime(format!("call {call} failed")));
        }
        Ok(self.poses.clone())
    }
}

pub fn nose_pose(x: f32, y: f32, score: f32) -> Pose {
    Pose::new(vec![Keypoint::new("nose", x, y, 0.0, score)])
}
