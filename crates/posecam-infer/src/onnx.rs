use ndarray::ArrayD;
use ort::session::Session;
use ort::value::TensorRef;
use posecam_base::Tensor;
use posecam_camera::FrameTensor;
use std::sync::{Arc, Mutex};

use crate::yolo::{postprocess, preprocess};
use crate::{Device, EstimatorConfig, InferError, Pose, PoseEstimator};

/// YOLO pose model on ONNX Runtime.
///
/// Model execution runs on tokio's blocking pool; the caller's task only
/// does letterboxing and decoding.
pub struct OnnxPoseEstimator {
    session: Arc<Mutex<Session>>,
    output_name: String,
    conf_threshold: f32,
    iou_threshold: f32,
}

impl OnnxPoseEstimator {
    pub fn new(config: &EstimatorConfig) -> Result<Self, InferError> {
        let builder = Session::builder().map_err(|e| {
            InferError::ModelLoad(format!("failed to create session builder: {e}"))
        })?;

        let builder = match config.device() {
            Device::Cpu => builder,
            #[cfg(feature = "cuda")]
            Device::Cuda { device_id } => {
                use ort::execution_providers::CUDAExecutionProvider;
                builder
                    .with_execution_providers([CUDAExecutionProvider::default()
                        .with_device_id(device_id)
                        .build()])
                    .map_err(|e| InferError::Backend(format!("CUDA unavailable: {e}")))?
            }
            #[cfg(not(feature = "cuda"))]
            device @ Device::Cuda { .. } => {
                return Err(InferError::Backend(format!(
                    "{device} requested but built without the `cuda` feature"
                )));
            }
        };

        let path = config.model_path();
        let session = builder.commit_from_file(path).map_err(|e| {
            InferError::ModelLoad(format!("failed to load {}: {e}", path.display()))
        })?;

        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| InferError::ModelLoad("model has no outputs".to_string()))?;

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            output_name,
            conf_threshold: config.conf_threshold(),
            iou_threshold: config.iou_threshold(),
        })
    }
}

impl PoseEstimator for OnnxPoseEstimator {
    async fn estimate(
        &mut self,
        frame: &FrameTensor,
        _timestamp_ms: u64,
    ) -> Result<Vec<Pose>, InferError> {
        let (input, letterbox) = preprocess(frame.tensor())?;

        let session = Arc::clone(&self.session);
        let output_name = self.output_name.clone();
        let output = tokio::task::spawn_blocking(move || run_session(&session, &output_name, input))
            .await
            .map_err(|e| InferError::Runtime(format!("inference task failed: {e}")))??;

        postprocess(&output, &letterbox, self.conf_threshold, self.iou_threshold)
    }
}

fn run_session(
    session: &Mutex<Session>,
    output_name: &str,
    input: Tensor<f32>,
) -> Result<Tensor<f32>, InferError> {
    let array = ArrayD::from_shape_vec(input.shape, input.data)
        .map_err(|e| InferError::Backend(format!("failed to build input array: {e}")))?;
    let input = TensorRef::from_array_view(array.view())
        .map_err(|e| InferError::Backend(format!("failed to create tensor ref: {e}")))?;

    let mut session = session
        .lock()
        .map_err(|_| InferError::Runtime("session lock poisoned".to_string()))?;
    let outputs = session
        .run(ort::inputs![input])
        .map_err(|e| InferError::Runtime(format!("inference failed: {e}")))?;

    let view = outputs[output_name]
        .try_extract_array::<f32>()
        .map_err(|e| InferError::Runtime(format!("output '{output_name}' is not f32: {e}")))?;

    Ok(Tensor::new(view.shape().to_vec(), view.iter().copied().collect())?)
}
