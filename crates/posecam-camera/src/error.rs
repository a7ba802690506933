use posecam_base::TensorError;
use std::fmt;

#[derive(Debug)]
pub enum CameraError {
    Device(String),
    Stream(String),
    Decode(String),
    Channel(String),
    Config(String),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::Device(msg) => write!(f, "device error: {msg}"),
            CameraError::Stream(msg) => write!(f, "stream error: {msg}"),
            CameraError::Decode(msg) => write!(f, "decode error: {msg}"),
            CameraError::Channel(msg) => write!(f, "channel error: {msg}"),
            CameraError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for CameraError {}

impl From<std::io::Error> for CameraError {
    fn from(err: std::io::Error) -> Self {
        CameraError::Device(err.to_string())
    }
}

impl From<TensorError> for CameraError {
    fn from(err: TensorError) -> Self {
        CameraError::Stream(err.to_string())
    }
}
