use log::{debug, info, warn};
use posecam_base::{Clock, SystemClock};
use posecam_camera::FrameSource;
use posecam_infer::{InferError, PoseEstimator};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

use crate::{CancellationToken, ResultSink, SchedulerError, Ticker};

/// What a single iteration did.
#[derive(Debug)]
pub enum IterationOutcome {
    /// The estimator succeeded and the sink was updated.
    Published {
        iteration: u64,
        frame: u64,
        poses: usize,
        keypoints: usize,
    },
    /// The estimator failed. The frame was still released and the loop
    /// carries on.
    EstimatorFailed {
        iteration: u64,
        frame: u64,
        error: InferError,
    },
    /// The token was cancelled before a frame was taken.
    Cancelled,
}

/// Counters for a loop's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Iterations that pulled a frame and ran the estimator.
    pub iterations: u64,
    pub published: u64,
    pub estimator_failures: u64,
    /// Frames released by the loop.
    pub frames_disposed: u64,
    /// Id of the last iteration that started.
    pub last_iteration: Option<u64>,
}

/// One capture → infer → publish → dispose pipeline.
///
/// Only one iteration is ever active: the next frame is not pulled until the
/// previous estimator call has resolved and its frame has been released.
pub struct FrameLoop<S, E, T> {
    source: S,
    estimator: E,
    ticker: T,
    sink: ResultSink,
    token: CancellationToken,
    clock: Arc<dyn Clock>,
    summary: LoopSummary,
}

impl<S, E, T> FrameLoop<S, E, T>
where
    S: FrameSource,
    E: PoseEstimator,
    T: Ticker,
{
    pub fn new(source: S, estimator: E, ticker: T, sink: ResultSink, token: CancellationToken) -> Self {
        Self {
            source,
            estimator,
            ticker,
            sink,
            token,
            clock: Arc::new(SystemClock),
            summary: LoopSummary::default(),
        }
    }

    /// Timestamps handed to the estimator come from `clock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn sink(&self) -> &ResultSink {
        &self.sink
    }

    pub fn summary(&self) -> &LoopSummary {
        &self.summary
    }

    /// Run exactly one iteration.
    ///
    /// Returns [`IterationOutcome::Cancelled`] without touching the source or
    /// the estimator if the token is cancelled on entry or while waiting for
    /// a frame. An estimator call that has started always runs to completion.
    pub async fn run_iteration(&mut self) -> Result<IterationOutcome, SchedulerError> {
        let Some(iteration) = self.token.advance() else {
            return Ok(IterationOutcome::Cancelled);
        };
        self.summary.last_iteration = Some(iteration);

        let received = tokio::select! {
            biased;
            _ = self.token.cancelled() => return Ok(IterationOutcome::Cancelled),
            received = self.source.recv() => received,
        };
        let frame = received.map_err(|error| SchedulerError::Source {
            error,
            iterations: self.summary.iterations,
        })?;
        let sequence = frame.sequence();

        let timestamp_ms = self.clock.now_millis();
        let started = Instant::now();
        let result = self.estimator.estimate(&frame, timestamp_ms).await;
        let elapsed = started.elapsed();

        let outcome = match result {
            Ok(poses) => {
                let keypoints = self.sink.publish(&poses);
                self.summary.published += 1;
                debug!(
                    "iteration {iteration}: frame {sequence}, {} poses, {keypoints} keypoints published in {elapsed:?}",
                    poses.len()
                );
                IterationOutcome::Published {
                    iteration,
                    frame: sequence,
                    poses: poses.len(),
                    keypoints,
                }
            }
            Err(error) => {
                self.summary.estimator_failures += 1;
                warn!("iteration {iteration}: estimator failed on frame {sequence} after {elapsed:?}: {error}");
                IterationOutcome::EstimatorFailed {
                    iteration,
                    frame: sequence,
                    error,
                }
            }
        };

        frame.dispose();
        self.summary.frames_disposed += 1;
        self.summary.iterations += 1;

        Ok(outcome)
    }

    /// Loop until the token is cancelled or the source fails.
    pub async fn run(mut self) -> Result<LoopSummary, SchedulerError> {
        info!("frame loop started at {:?}", self.source.resolution());

        loop {
            if let IterationOutcome::Cancelled = self.run_iteration().await? {
                break;
            }
            if self.token.is_cancelled() {
                break;
            }
            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                _ = self.ticker.tick() => {}
            }
        }

        info!(
            "frame loop cancelled: {} iterations, {} published, {} estimator failures",
            self.summary.iterations, self.summary.published, self.summary.estimator_failures
        );
        Ok(self.summary)
    }
}

/// Owns the cancellation token and, once started, the spawned loop task.
///
/// Dropping the scheduler cancels the token; the loop then finishes its
/// current iteration and exits.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    token: CancellationToken,
    task: Option<JoinHandle<Result<LoopSummary, SchedulerError>>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: CancellationToken) -> Self {
        Self { token, task: None }
    }

    /// A handle that can stop the loop from elsewhere.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Spawn the loop onto the current tokio runtime.
    ///
    /// Starting twice is refused with [`SchedulerError::AlreadyRunning`] and
    /// leaves the running loop untouched.
    pub fn start<S, E, T>(
        &mut self,
        source: S,
        estimator: E,
        ticker: T,
        sink: ResultSink,
    ) -> Result<(), SchedulerError>
    where
        S: FrameSource + 'static,
        E: PoseEstimator + 'static,
        T: Ticker + 'static,
    {
        self.start_loop(FrameLoop::new(source, estimator, ticker, sink, self.token.clone()))
    }

    /// Like [`start`](Self::start), for a loop configured by the caller.
    ///
    /// The loop must have been built with a clone of [`token`](Self::token);
    /// any other loop is refused with [`SchedulerError::ForeignToken`].
    pub fn start_loop<S, E, T>(&mut self, frame_loop: FrameLoop<S, E, T>) -> Result<(), SchedulerError>
    where
        S: FrameSource + 'static,
        E: PoseEstimator + 'static,
        T: Ticker + 'static,
    {
        if self.is_running() {
            warn!("start ignored: frame loop is already running");
            return Err(SchedulerError::AlreadyRunning);
        }
        if !frame_loop.token().same_as(&self.token) {
            warn!("start ignored: frame loop has its own cancellation token");
            return Err(SchedulerError::ForeignToken);
        }
        if self.token.is_cancelled() {
            warn!("start ignored: scheduler was already cancelled");
            return Err(SchedulerError::Cancelled);
        }

        self.task = Some(tokio::spawn(frame_loop.run()));
        Ok(())
    }

    /// Request a stop. Idempotent.
    pub fn cancel(&self) {
        if self.token.cancel() {
            info!("frame loop cancellation requested");
        }
    }

    /// Wait for the loop to finish on its own.
    pub async fn join(&mut self) -> Result<LoopSummary, SchedulerError> {
        let task = self.task.take().ok_or(SchedulerError::NotStarted)?;
        task.await
            .map_err(|e| SchedulerError::Join(e.to_string()))?
    }

    /// Cancel and wait for the in-flight iteration to finish.
    pub async fn stop(&mut self) -> Result<LoopSummary, SchedulerError> {
        self.cancel();
        self.join().await
    }
}

impl Drop for FrameScheduler {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
