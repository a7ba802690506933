//! One-euro filtering of keypoint positions across frames.
//!
//! Only the primary (first) pose is filtered: models give no identity across
//! frames, and the primary pose is the one that gets displayed. Filter state
//! is reset whenever no pose is detected or the keypoint layout changes.

use posecam_camera::FrameTensor;
use std::f32::consts::PI;

use crate::{InferError, Pose, PoseEstimator};

/// Frame interval assumed when timestamps do not advance.
const FALLBACK_DT_SECS: f32 = 1.0 / 30.0;

/// One-euro filter tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OneEuroParams {
    /// Cutoff frequency (Hz) at rest. Lower means smoother and laggier.
    pub min_cutoff: f32,
    /// How quickly the cutoff rises with speed.
    pub beta: f32,
    /// Cutoff frequency (Hz) for the derivative estimate.
    pub d_cutoff: f32,
}

impl Default for OneEuroParams {
    fn default() -> Self {
        Self {
            min_cutoff: 1.0,
            beta: 0.007,
            d_cutoff: 1.0,
        }
    }
}

fn smoothing_factor(dt: f32, cutoff: f32) -> f32 {
    let r = 2.0 * PI * cutoff * dt;
    r / (r + 1.0)
}

#[derive(Debug, Clone, Default)]
struct LowPass {
    prev: Option<f32>,
}

impl LowPass {
    fn filter(&mut self, value: f32, alpha: f32) -> f32 {
        let out = match self.prev {
            Some(prev) => alpha * value + (1.0 - alpha) * prev,
            None => value,
        };
        self.prev = Some(out);
        out
    }
}

#[derive(Debug, Clone)]
struct OneEuro {
    params: OneEuroParams,
    value: LowPass,
    derivative: LowPass,
    prev_raw: Option<f32>,
}

impl OneEuro {
    fn new(params: OneEuroParams) -> Self {
        Self {
            params,
            value: LowPass::default(),
            derivative: LowPass::default(),
            prev_raw: None,
        }
    }

    fn filter(&mut self, raw: f32, dt: f32) -> f32 {
        let dx = match self.prev_raw {
            Some(prev) => (raw - prev) / dt,
            None => 0.0,
        };
        self.prev_raw = Some(raw);

        let edx = self.derivative.filter(dx, smoothing_factor(dt, self.params.d_cutoff));
        let cutoff = self.params.min_cutoff + self.params.beta * edx.abs();
        self.value.filter(raw, smoothing_factor(dt, cutoff))
    }
}

/// Wraps an estimator and smooths the primary pose's x, y and z.
///
/// When disabled, results pass through untouched.
pub struct SmoothedEstimator<E> {
    inner: E,
    enabled: bool,
    params: OneEuroParams,
    filters: Vec<[OneEuro; 3]>,
    last_timestamp_ms: Option<u64>,
}

impl<E> SmoothedEstimator<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            enabled: true,
            params: OneEuroParams::default(),
            filters: Vec::new(),
            last_timestamp_ms: None,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_params(mut self, params: OneEuroParams) -> Self {
        self.params = params;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    fn reset(&mut self) {
        self.filters.clear();
        self.last_timestamp_ms = None;
    }

    fn smooth(&mut self, pose: &mut Pose, timestamp_ms: u64) {
        if self.filters.len() != pose.keypoints.len() {
            let params = self.params;
            self.filters = (0..pose.keypoints.len())
                .map(|_| std::array::from_fn(|_| OneEuro::new(params)))
                .collect();
            self.last_timestamp_ms = None;
        }

        let dt = match self.last_timestamp_ms {
            Some(last) if timestamp_ms > last => (timestamp_ms - last) as f32 / 1000.0,
            _ => FALLBACK_DT_SECS,
        };
        self.last_timestamp_ms = Some(timestamp_ms);

        for (keypoint, [fx, fy, fz]) in pose.keypoints.iter_mut().zip(self.filters.iter_mut()) {
            keypoint.x = fx.filter(keypoint.x, dt);
            keypoint.y = fy.filter(keypoint.y, dt);
            keypoint.z = fz.filter(keypoint.z, dt);
        }
    }
}

impl<E: PoseEstimator> PoseEstimator for SmoothedEstimator<E> {
    async fn estimate(
        &mut self,
        frame: &FrameTensor,
        timestamp_ms: u64,
    ) -> Result<Vec<Pose>, InferError> {
        let mut poses = self.inner.estimate(frame, timestamp_ms).await?;
        if !self.enabled {
            return Ok(poses);
        }

        match poses.first_mut() {
            Some(primary) => self.smooth(primary, timestamp_ms),
            None => self.reset(),
        }
        Ok(poses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_passes_through() {
        let mut f = OneEuro::new(OneEuroParams::default());
        assert_eq!(f.filter(42.0, FALLBACK_DT_SECS), 42.0);
    }

    #[test]
    fn test_step_is_damped() {
        let mut f = OneEuro::new(OneEuroParams::default());
        f.filter(0.0, FALLBACK_DT_SECS);
        let out = f.filter(100.0, FALLBACK_DT_SECS);
        assert!(out > 0.0 && out < 100.0, "got {out}");
    }

    #[test]
    fn test_constant_signal_is_unchanged() {
        let mut f = OneEuro::new(OneEuroParams::default());
        for _ in 0..10 {
            assert!((f.filter(5.0, FALLBACK_DT_SECS) - 5.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_smoothing_factor_bounds() {
        let a = smoothing_factor(FALLBACK_DT_SECS, 1.0);
        assert!(a > 0.0 && a < 1.0);
        assert!(smoothing_factor(1.0, 100.0) > a);
    }
}
