//! Camera-side half of the pose pipeline.
//!
//! A [`FrameSource`] yields owned [`FrameTensor`]s at the fixed inference
//! resolution. Every frame handed out is accounted for in a [`FrameLedger`]
//! so that consumers can prove each frame was released exactly once.

pub mod config;
pub mod convert;
pub mod error;
pub mod frame;
pub mod synthetic;
pub mod traits;

#[cfg(feature = "v4l2")]
pub mod v4l2;

pub use config::{CameraConfig, INFERENCE_WIDTH, Platform, Resolution};
pub use convert::resize_rgb;
pub use error::CameraError;
pub use frame::{FrameLedger, FrameTensor};
pub use synthetic::SyntheticCamera;
pub use traits::FrameSource;

#[cfg(feature = "v4l2")]
pub use v4l2::V4l2Camera;
