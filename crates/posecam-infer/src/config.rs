use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::InferError;

/// Inference backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
    Onnx,
}

impl FromStr for Runtime {
    type Err = InferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "onnx" | "ort" => Ok(Runtime::Onnx),
            other => Err(InferError::UnsupportedRuntime(other.to_string())),
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Runtime::Onnx => write!(f, "onnx"),
        }
    }
}

/// Size/accuracy tier of the pose model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelType {
    #[default]
    Lite,
    Full,
    Heavy,
}

impl ModelType {
    /// Model file used when no explicit path is configured.
    pub fn default_model_file(self) -> &'static str {
        match self {
            ModelType::Lite => "models/yolov8n-pose.onnx",
            ModelType::Full => "models/yolov8s-pose.onnx",
            ModelType::Heavy => "models/yolov8m-pose.onnx",
        }
    }
}

impl FromStr for ModelType {
    type Err = InferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lite" => Ok(ModelType::Lite),
            "full" => Ok(ModelType::Full),
            "heavy" => Ok(ModelType::Heavy),
            other => Err(InferError::InvalidConfig(format!("unknown model type: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    #[default]
    Cpu,
    Cuda { device_id: i32 },
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "CPU"),
            Device::Cuda { device_id } => write!(f, "CUDA(device_id={device_id})"),
        }
    }
}

/// Everything needed to construct a pose estimator once at startup.
#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    runtime: Runtime,
    enable_smoothing: bool,
    model_type: ModelType,
    model_path: Option<PathBuf>,
    device: Device,
    conf_threshold: f32,
    iou_threshold: f32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            runtime: Runtime::Onnx,
            enable_smoothing: true,
            model_type: ModelType::Lite,
            model_path: None,
            device: Device::Cpu,
            conf_threshold: 0.25,
            iou_threshold: 0.45,
        }
    }
}

impl EstimatorConfig {
    pub fn with_runtime(mut self, runtime: Runtime) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_smoothing(mut self, enable: bool) -> Self {
        self.enable_smoothing = enable;
        self
    }

    pub fn with_model_type(mut self, model_type: ModelType) -> Self {
        self.model_type = model_type;
        self
    }

    /// Load the model from `path` instead of the tier's default file.
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Minimum person-detection confidence.
    pub fn with_conf_threshold(mut self, threshold: f32) -> Self {
        self.conf_threshold = threshold;
        self
    }

    pub fn with_iou_threshold(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    pub fn runtime(&self) -> Runtime {
        self.runtime
    }

    pub fn enable_smoothing(&self) -> bool {
        self.enable_smoothing
    }

    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    pub fn model_path(&self) -> &Path {
        self.model_path
            .as_deref()
            .unwrap_or_else(|| Path::new(self.model_type.default_model_file()))
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn conf_threshold(&self) -> f32 {
        self.conf_threshold
    }

    pub fn iou_threshold(&self) -> f32 {
        self.iou_threshold
    }

    pub fn validate(&self) -> Result<(), InferError> {
        for (name, value) in [
            ("conf_threshold", self.conf_threshold),
            ("iou_threshold", self.iou_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(InferError::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}
