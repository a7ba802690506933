use posecam_base::Tensor;
use std::fmt;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crate::{CameraError, Resolution};

#[derive(Default)]
struct LedgerCounts {
    acquired: AtomicU64,
    released: AtomicU64,
    peak_live: AtomicU64,
}

/// Shared accounting of frames handed out by a source.
///
/// Clones share the same counters. A frame counts as live from the moment
/// it is stamped until its [`FrameTensor`] is disposed or dropped.
#[derive(Clone, Default)]
pub struct FrameLedger {
    counts: Arc<LedgerCounts>,
}

impl fmt::Debug for FrameLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameLedger")
            .field("acquired", &self.acquired())
            .field("released", &self.released())
            .field("peak_live", &self.peak_live())
            .finish()
    }
}

impl FrameLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an RGB tensor as a tracked frame. Sequence numbers start at 0.
    pub fn stamp(&self, tensor: Tensor<u8>) -> Result<FrameTensor, CameraError> {
        tensor.image_dims()?;

        let sequence = self.counts.acquired.fetch_add(1, Ordering::AcqRel);
        let live = (sequence + 1).saturating_sub(self.counts.released.load(Ordering::Acquire));
        self.counts.peak_live.fetch_max(live, Ordering::AcqRel);

        Ok(FrameTensor {
            sequence,
            tensor,
            ledger: Some(self.clone()),
        })
    }

    pub fn acquired(&self) -> u64 {
        self.counts.acquired.load(Ordering::Acquire)
    }

    pub fn released(&self) -> u64 {
        self.counts.released.load(Ordering::Acquire)
    }

    /// Frames stamped but not yet released.
    pub fn live(&self) -> u64 {
        self.acquired().saturating_sub(self.released())
    }

    /// Highest number of simultaneously live frames seen so far.
    pub fn peak_live(&self) -> u64 {
        self.counts.peak_live.load(Ordering::Acquire)
    }

    fn release(&self) {
        self.counts.released.fetch_add(1, Ordering::AcqRel);
    }
}

/// One camera frame at inference resolution, HWC `[height, width, 3]`.
///
/// The frame is released exactly once: either through [`FrameTensor::dispose`]
/// or, on any other exit path, when it is dropped. `dispose` consumes the
/// frame, so a second release cannot be expressed.
pub struct FrameTensor {
    sequence: u64,
    tensor: Tensor<u8>,
    ledger: Option<FrameLedger>,
}

impl fmt::Debug for FrameTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameTensor")
            .field("sequence", &self.sequence)
            .field("shape", &self.tensor.shape)
            .field("tracked", &self.ledger.is_some())
            .finish()
    }
}

impl FrameTensor {
    /// An untracked frame. Prefer [`FrameLedger::stamp`] for frames that
    /// flow through the scheduler.
    pub fn untracked(sequence: u64, tensor: Tensor<u8>) -> Result<Self, CameraError> {
        tensor.image_dims()?;
        Ok(Self {
            sequence,
            tensor,
            ledger: None,
        })
    }

    /// Position of this frame in the source's emission order.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn tensor(&self) -> &Tensor<u8> {
        &self.tensor
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.tensor.shape[1] as u32, self.tensor.shape[0] as u32)
    }

    /// Release the frame's memory.
    pub fn dispose(self) {
        drop(self);
    }
}

impl Drop for FrameTensor {
    fn drop(&mut self) {
        if let Some(ledger) = self.ledger.take() {
            ledger.release();
        }
    }
}
