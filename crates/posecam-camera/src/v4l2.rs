use log::{error, warn};
use posecam_base::Tensor;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc::{self, error::TrySendError};
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

use crate::{
    CameraConfig, CameraError, FrameLedger, FrameSource, FrameTensor, Resolution, resize_rgb,
};

/// V4L2 MJPEG capture, resized to the inference resolution.
///
/// Capture runs on a dedicated thread. The hand-off channel holds a single
/// frame; frames captured while the consumer is busy are dropped, so a slow
/// consumer lowers the frame rate instead of building a backlog.
pub struct V4l2Camera {
    config: CameraConfig,
    ledger: FrameLedger,
    device: Option<Device>,
    receiver: Option<mpsc::Receiver<Tensor<u8>>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for V4l2Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V4l2Camera")
            .field("config", &self.config)
            .field("ledger", &self.ledger)
            .field("started", &self.receiver.is_some())
            .finish()
    }
}

impl FrameSource for V4l2Camera {
    async fn recv(&mut self) -> Result<FrameTensor, CameraError> {
        self.ensure_started()?;

        let receiver = self
            .receiver
            .as_mut()
            .ok_or_else(|| CameraError::Channel("receiver not initialized".to_string()))?;

        let tensor = receiver
            .recv()
            .await
            .ok_or_else(|| CameraError::Channel("capture thread exited".to_string()))?;

        self.ledger.stamp(tensor)
    }

    fn resolution(&self) -> Resolution {
        self.config.inference_resolution()
    }
}

impl Drop for V4l2Camera {
    fn drop(&mut self) {
        // closing the channel stops the capture thread
        drop(self.receiver.take());
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl V4l2Camera {
    /// Open `config.device()` in MJPEG at the configured capture size and rate.
    pub fn new(config: CameraConfig) -> Result<Self, CameraError> {
        let device = Device::with_path(config.device())?;

        let format = Format::new(config.width(), config.height(), FourCC::new(b"MJPG"));
        let format = Capture::set_format(&device, &format)?;
        if format.fourcc != FourCC::new(b"MJPG") {
            return Err(CameraError::Device(
                "MJPEG format not supported by device".to_string(),
            ));
        }

        let params = v4l::video::capture::Parameters::with_fps(config.fps());
        Capture::set_params(&device, &params)?;

        Ok(Self {
            config,
            ledger: FrameLedger::new(),
            device: Some(device),
            receiver: None,
            thread_handle: None,
        })
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn ledger(&self) -> &FrameLedger {
        &self.ledger
    }

    fn ensure_started(&mut self) -> Result<(), CameraError> {
        if self.receiver.is_some() {
            return Ok(());
        }

        let device = self
            .device
            .take()
            .ok_or_else(|| CameraError::Device("device already consumed".to_string()))?;

        let buffer_count = self.config.buffer_count();
        let target = self.config.inference_resolution();
        let (tx, rx) = mpsc::channel(1);

        let handle = thread::spawn(move || {
            if let Err(e) = Self::capture_loop(device, tx, buffer_count, target) {
                error!("v4l2 capture thread stopped: {e}");
            }
        });

        self.receiver = Some(rx);
        self.thread_handle = Some(handle);
        Ok(())
    }

    fn capture_loop(
        device: Device,
        tx: mpsc::Sender<Tensor<u8>>,
        buffer_count: u32,
        target: Resolution,
    ) -> Result<(), CameraError> {
        let mut stream = MmapStream::with_buffers(&device, Type::VideoCapture, buffer_count)?;
        let mut dropped = 0u64;

        // only device errors end the stream; a corrupt frame is skipped
        loop {
            let (jpeg, _metadata) = CaptureStream::next(&mut stream)?;
            let frame = match prepare_frame(jpeg, target) {
                Ok(frame) => frame,
                Err(e) => {
                    dropped += 1;
                    warn!("skipping undecodable frame ({dropped} so far): {e}");
                    if tx.is_closed() {
                        break;
                    }
                    continue;
                }
            };

            match tx.try_send(frame) {
                Ok(()) | Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Closed(_)) => break,
            }
        }

        Ok(())
    }
}

/// Decode one MJPEG buffer and resize it to `target`.
fn prepare_frame(jpeg: &[u8], target: Resolution) -> Result<Tensor<u8>, CameraError> {
    resize_rgb(&decode_mjpeg(jpeg)?, target)
}

fn decode_mjpeg(jpeg: &[u8]) -> Result<Tensor<u8>, CameraError> {
    let rgb = image::load_from_memory_with_format(jpeg, image::ImageFormat::Jpeg)
        .map_err(|e| CameraError::Decode(e.to_string()))?
        .to_rgb8();
    let (w, h) = rgb.dimensions();
    Ok(Tensor::new(vec![h as usize, w as usize, 3], rgb.into_raw())?)
}
