/// Width of every tensor handed to the pose estimator.
pub const INFERENCE_WIDTH: u32 = 180;

/// Width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Inference resolution for a host: fixed width, height from the host's
    /// camera aspect convention.
    pub fn inference(platform: Platform) -> Self {
        let height = (INFERENCE_WIDTH as f32 / platform.camera_aspect()).round() as u32;
        Self::new(INFERENCE_WIDTH, height)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Host family, which decides the camera's portrait aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    Ios,
    Android,
    Desktop,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "ios") {
            Platform::Ios
        } else if cfg!(target_os = "android") {
            Platform::Android
        } else {
            Platform::Desktop
        }
    }

    /// Width over height of the camera preview in portrait.
    pub fn camera_aspect(self) -> f32 {
        match self {
            Platform::Ios => 9.0 / 16.0,
            Platform::Android | Platform::Desktop => 3.0 / 4.0,
        }
    }
}

/// Configuration for camera capture.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    device: String,
    width: u32,
    height: u32,
    fps: u32,
    buffer_count: u32,
    platform: Platform,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            width: 640,
            height: 480,
            fps: 30,
            buffer_count: 4,
            platform: Platform::current(),
        }
    }
}

impl CameraConfig {
    /// Set the device path (e.g., "/dev/video0").
    pub fn with_device(mut self, device: String) -> Self {
        self.device = device;
        self
    }

    /// Set the capture width in pixels.
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Set the capture height in pixels.
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_buffer_count(mut self, buffer_count: u32) -> Self {
        self.buffer_count = buffer_count;
        self
    }

    /// Override the host platform used to derive the inference resolution.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn capture_resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn buffer_count(&self) -> u32 {
        self.buffer_count
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Resolution frames are resized to before inference.
    pub fn inference_resolution(&self) -> Resolution {
        Resolution::inference(self.platform)
    }
}
