use log::debug;
use posecam_base::Tensor;
use std::time::Duration;

use crate::{CameraConfig, CameraError, FrameLedger, FrameSource, FrameTensor, Resolution};

/// Test-pattern camera: a bright vertical bar sweeping over a gradient.
///
/// Useful for running the pipeline without capture hardware.
#[derive(Debug)]
pub struct SyntheticCamera {
    resolution: Resolution,
    ledger: FrameLedger,
    frame_interval: Option<Duration>,
    produced: u64,
}

impl SyntheticCamera {
    /// Frames at `resolution`, delivered as fast as they are pulled.
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            ledger: FrameLedger::new(),
            frame_interval: None,
            produced: 0,
        }
    }

    /// Frames at the config's inference resolution, paced at its fps.
    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.inference_resolution()).with_fps(config.fps())
    }

    /// Pace delivery to at most `fps` frames per second. Zero disables pacing.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.frame_interval = (fps > 0).then(|| Duration::from_secs_f64(1.0 / fps as f64));
        self
    }

    /// Use an existing ledger instead of a private one.
    pub fn with_ledger(mut self, ledger: FrameLedger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn ledger(&self) -> &FrameLedger {
        &self.ledger
    }

    fn render(&self, index: u64) -> Result<Tensor<u8>, CameraError> {
        let (w, h) = (self.resolution.width as usize, self.resolution.height as usize);
        if w == 0 || h == 0 {
            return Err(CameraError::Config("synthetic camera needs a non-empty resolution".to_string()));
        }

        let bar_x = (index as usize * 4) % w;
        let mut data = Vec::with_capacity(self.resolution.pixel_count() * 3);
        for y in 0..h {
            for x in 0..w {
                if x.abs_diff(bar_x) < 3 {
                    data.extend_from_slice(&[255, 255, 255]);
                } else {
                    let r = (x * 255 / w) as u8;
                    let g = (y * 255 / h) as u8;
                    data.extend_from_slice(&[r, g, 96]);
                }
            }
        }

        Ok(Tensor::new(vec![h, w, 3], data)?)
    }
}

impl FrameSource for SyntheticCamera {
    async fn recv(&mut self) -> Result<FrameTensor, CameraError> {
        if let Some(interval) = self.frame_interval {
            tokio::time::sleep(interval).await;
        }

        let tensor = self.render(self.produced)?;
        if self.produced == 0 {
            debug!(
                "synthetic camera streaming {}x{}",
                self.resolution.width, self.resolution.height
            );
        }
        self.produced += 1;
        self.ledger.stamp(tensor)
    }

    fn resolution(&self) -> Resolution {
        self.resolution
    }
}
