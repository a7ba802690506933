pub mod clock;
pub mod logging;
pub mod tensor;

pub use clock::{Clock, ManualClock, SystemClock, now_millis};
pub use logging::{FileLogger, StdoutLogger, init_file_logger, init_stdout_logger};
pub use tensor::{Tensor, TensorError};

// Re-export log crate so downstream crates can use posecam_base::log::*
pub use log;
