use posecam_camera::FrameTensor;
use std::future::Future;

use crate::{EstimatorConfig, InferError, Pose, Runtime, SmoothedEstimator};

/// An opaque, possibly slow, pose model.
///
/// `estimate` borrows the frame; the caller keeps ownership and releases it
/// after the call resolves, whatever the outcome. Keypoint coordinates are in
/// the frame's pixel space. Errors are per-call and recoverable.
pub trait PoseEstimator: Send {
    fn estimate(
        &mut self,
        frame: &FrameTensor,
        timestamp_ms: u64,
    ) -> impl Future<Output = Result<Vec<Pose>, InferError>> + Send;
}

/// The backends compiled into this build.
pub enum BackendEstimator {
    #[cfg(feature = "onnx")]
    Onnx(crate::OnnxPoseEstimator),
}

impl PoseEstimator for BackendEstimator {
    #[cfg_attr(not(feature = "onnx"), allow(unused_variables))]
    async fn estimate(
        &mut self,
        frame: &FrameTensor,
        timestamp_ms: u64,
    ) -> Result<Vec<Pose>, InferError> {
        match *self {
            #[cfg(feature = "onnx")]
            BackendEstimator::Onnx(ref mut estimator) => {
                estimator.estimate(frame, timestamp_ms).await
            }
        }
    }
}

/// Build the estimator described by `config`.
///
/// Fails if the config is invalid, the runtime is not compiled in, or the
/// model cannot be loaded. Callers treat any failure here as fatal.
pub fn create_estimator(
    config: &EstimatorConfig,
) -> Result<SmoothedEstimator<BackendEstimator>, InferError> {
    config.validate()?;

    let backend = load_backend(config)?;

    log::info!(
        "pose estimator ready: runtime={} model={:?} device={} smoothing={}",
        config.runtime(),
        config.model_type(),
        config.device(),
        config.enable_smoothing()
    );

    Ok(SmoothedEstimator::new(backend).with_enabled(config.enable_smoothing()))
}

#[cfg(feature = "onnx")]
fn load_backend(config: &EstimatorConfig) -> Result<BackendEstimator, InferError> {
    match config.runtime() {
        Runtime::Onnx => Ok(BackendEstimator::Onnx(crate::OnnxPoseEstimator::new(config)?)),
    }
}

#[cfg(not(feature = "onnx"))]
fn load_backend(config: &EstimatorConfig) -> Result<BackendEstimator, InferError> {
    match config.runtime() {
        Runtime::Onnx => Err(InferError::UnsupportedRuntime(
            "onnx (built without the `onnx` feature)".to_string(),
        )),
    }
}
