//! The capture → infer → publish → dispose loop.
//!
//! [`FrameLoop`] runs one iteration at a time: pull a frame, await the
//! estimator, publish the primary pose through the [`ResultSink`], release
//! the frame, then wait for the next display tick. A [`CancellationToken`]
//! stops the loop at the next iteration boundary. [`FrameScheduler`] spawns
//! a loop onto the tokio runtime and guards against starting it twice.

pub mod config;
pub mod error;
pub mod scheduler;
pub mod sink;
pub mod ticker;
pub mod token;

pub use config::SchedulerConfig;
pub use error::SchedulerError;
pub use scheduler::{FrameLoop, FrameScheduler, IterationOutcome, LoopSummary};
pub use sink::{DisplayTransform, MIN_KEYPOINT_SCORE, PublishedResult, ResultSink, primary_keypoints};
pub use ticker::{ImmediateTicker, RefreshTicker, Ticker};
pub use token::{CancellationToken, TokenState};
