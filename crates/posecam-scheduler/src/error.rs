use posecam_camera::CameraError;
use std::fmt;

#[derive(Debug)]
pub enum SchedulerError {
    /// `start` was called while a loop is still running.
    AlreadyRunning,
    /// `start` was called with a token that was already cancelled.
    Cancelled,
    /// `start_loop` was given a loop that does not share the scheduler's
    /// token, so the scheduler could never stop it.
    ForeignToken,
    /// `join` or `stop` was called before `start`.
    NotStarted,
    /// The frame source failed; the stream cannot be resumed.
    Source { error: CameraError, iterations: u64 },
    /// The loop task panicked or was aborted.
    Join(String),
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::AlreadyRunning => write!(f, "frame loop is already running"),
            SchedulerError::Cancelled => write!(f, "cancellation token is already cancelled"),
            SchedulerError::ForeignToken => {
                write!(f, "frame loop does not use this scheduler's cancellation token")
            }
            SchedulerError::NotStarted => write!(f, "frame loop was never started"),
            SchedulerError::Source { error, iterations } => {
                write!(f, "frame source failed after {iterations} iterations: {error}")
            }
            SchedulerError::Join(msg) => write!(f, "frame loop task failed: {msg}"),
        }
    }
}

impl std::error::Error for SchedulerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchedulerError::Source { error, .. } => Some(error),
            _ => None,
        }
    }
}
