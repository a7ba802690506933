use posecam_base::TensorError;
use std::fmt;

#[derive(Debug)]
pub enum InferError {
    /// The model could not be loaded. Fatal at startup.
    ModelLoad(String),
    /// A single inference call failed. Recoverable.
    Runtime(String),
    ShapeMismatch { expected: String, got: String },
    UnsupportedRuntime(String),
    InvalidConfig(String),
    Backend(String),
}

impl fmt::Display for InferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferError::ModelLoad(msg) => write!(f, "model load error: {msg}"),
            InferError::Runtime(msg) => write!(f, "inference error: {msg}"),
            InferError::ShapeMismatch { expected, got } => {
                write!(f, "shape mismatch: expected {expected}, got {got}")
            }
            InferError::UnsupportedRuntime(name) => write!(f, "unsupported runtime: {name}"),
            InferError::InvalidConfig(msg) => write!(f, "invalid estimator config: {msg}"),
            InferError::Backend(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for InferError {}

impl From<TensorError> for InferError {
    fn from(err: TensorError) -> Self {
        InferError::ShapeMismatch {
            expected: "valid tensor".to_string(),
            got: err.to_string(),
        }
    }
}
