use posecam_camera::Resolution;

use crate::{DisplayTransform, RefreshTicker};

/// Display-side settings for a frame loop.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    refresh_hz: u32,
    display: Resolution,
    swap_axes: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            refresh_hz: 60,
            display: Resolution::new(360, 480),
            swap_axes: false,
        }
    }
}

impl SchedulerConfig {
    pub fn with_refresh_hz(mut self, refresh_hz: u32) -> Self {
        self.refresh_hz = refresh_hz;
        self
    }

    /// Size of the on-screen preview keypoints are drawn over.
    pub fn with_display(mut self, display: Resolution) -> Self {
        self.display = display;
        self
    }

    /// Set when the display orientation differs from the capture orientation.
    pub fn with_swap_axes(mut self, swap_axes: bool) -> Self {
        self.swap_axes = swap_axes;
        self
    }

    pub fn refresh_hz(&self) -> u32 {
        self.refresh_hz
    }

    pub fn display(&self) -> Resolution {
        self.display
    }

    pub fn swap_axes(&self) -> bool {
        self.swap_axes
    }

    pub fn transform_for(&self, inference: Resolution) -> DisplayTransform {
        DisplayTransform::new(inference, self.display, self.swap_axes)
    }

    pub fn ticker(&self) -> RefreshTicker {
        RefreshTicker::new(self.refresh_hz)
    }
}
