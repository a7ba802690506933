//! Pose estimation for camera frames.
//!
//! [`PoseEstimator`] is the seam the scheduler drives. Concrete backends are
//! built from an [`EstimatorConfig`] by [`create_estimator`]; the optional
//! one-euro smoothing stage wraps whichever backend was selected.

pub mod config;
pub mod error;
pub mod estimator;
pub mod keypoints;
pub mod smoothing;
pub mod types;
pub mod yolo;

#[cfg(feature = "onnx")]
pub mod onnx;

pub use config::{Device, EstimatorConfig, ModelType, Runtime};
pub use error::InferError;
pub use estimator::{BackendEstimator, PoseEstimator, create_estimator};
pub use keypoints::{COCO_KEYPOINT_COUNT, COCO_KEYPOINT_NAMES};
pub use smoothing::{OneEuroParams, SmoothedEstimator};
pub use types::{Keypoint, Pose};

#[cfg(feature = "onnx")]
pub use onnx::OnnxPoseEstimator;
