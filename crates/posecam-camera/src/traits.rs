use std::future::Future;

use crate::{CameraError, FrameTensor, Resolution};

/// Pull-based, non-restartable sequence of camera frames.
///
/// Each call to `recv` hands ownership of one frame to the caller, who is
/// responsible for releasing it. Frames arrive in emission order. A live
/// camera never ends on its own; an error means the stream is gone.
pub trait FrameSource: Send {
    /// Receive the next frame, suspending until one is available.
    fn recv(&mut self) -> impl Future<Output = Result<FrameTensor, CameraError>> + Send;

    /// Resolution of every frame this source yields.
    fn resolution(&self) -> Resolution;
}
