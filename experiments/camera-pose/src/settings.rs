use posecam_camera::Resolution;
use posecam_infer::{Device, EstimatorConfig, ModelType, Runtime};
use posecam_scheduler::SchedulerConfig;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, PartialEq)]
pub struct SettingsError {
    var: &'static str,
    value: String,
    reason: String,
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}={:?}: {}", self.var, self.value, self.reason)
    }
}

impl std::error::Error for SettingsError {}

/// Run settings read from `POSECAM_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub runtime: Runtime,
    pub model_type: ModelType,
    pub model_path: Option<PathBuf>,
    pub smoothing: bool,
    pub cuda_device: Option<i32>,
    /// V4L2 capture device. Unset means the synthetic camera.
    pub camera_device: Option<String>,
    pub display_width: u32,
    pub refresh_hz: u32,
    pub log_dir: Option<PathBuf>,
    /// Stop after this many published results. Unset runs until Ctrl-C.
    pub frames: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            runtime: Runtime::Onnx,
            model_type: ModelType::default(),
            model_path: None,
            smoothing: true,
            cuda_device: None,
            camera_device: None,
            display_width: 360,
            refresh_hz: 60,
            log_dir: None,
            frames: None,
        }
    }
}

fn parse<T>(
    var: &'static str,
    value: &str,
    f: impl FnOnce(&str) -> Result<T, String>,
) -> Result<T, SettingsError> {
    f(value).map_err(|reason| SettingsError {
        var,
        value: value.to_string(),
        reason,
    })
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err("expected a boolean".to_string()),
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let mut settings = Settings::default();

        if let Some(v) = lookup("POSECAM_RUNTIME") {
            settings.runtime = parse("POSECAM_RUNTIME", &v, |s| s.parse::<Runtime>().map_err(|e| format!("{e}")))?;
        }
        if let Some(v) = lookup("POSECAM_MODEL_TYPE") {
            settings.model_type = parse("POSECAM_MODEL_TYPE", &v, |s| s.parse::<ModelType>().map_err(|e| format!("{e}")))?;
        }
        settings.model_path = lookup("POSECAM_MODEL_PATH").map(PathBuf::from);
        if let Some(v) = lookup("POSECAM_SMOOTHING") {
            settings.smoothing = parse("POSECAM_SMOOTHING", &v, parse_bool)?;
        }
        if let Some(v) = lookup("POSECAM_CUDA_DEVICE") {
            settings.cuda_device = Some(parse("POSECAM_CUDA_DEVICE", &v, |s| {
                s.parse::<i32>().map_err(|e| format!("{e}"))
            })?);
        }
        settings.camera_device = lookup("POSECAM_DEVICE");
        if let Some(v) = lookup("POSECAM_DISPLAY_WIDTH") {
            settings.display_width = parse("POSECAM_DISPLAY_WIDTH", &v, |s| match s.parse::<u32>() {
                Ok(0) => Err("must be positive".to_string()),
                Ok(width) => Ok(width),
                Err(e) => Err(format!("{e}")),
            })?;
        }
        if let Some(v) = lookup("POSECAM_REFRESH_HZ") {
            settings.refresh_hz = parse("POSECAM_REFRESH_HZ", &v, |s| match s.parse::<u32>() {
                Ok(0) => Err("must be positive".to_string()),
                Ok(hz) => Ok(hz),
                Err(e) => Err(format!("{e}")),
            })?;
        }
        settings.log_dir = lookup("POSECAM_LOG_DIR").map(PathBuf::from);
        if let Some(v) = lookup("POSECAM_FRAMES") {
            settings.frames = Some(parse("POSECAM_FRAMES", &v, |s| s.parse::<u64>().map_err(|e| format!("{e}")))?);
        }

        Ok(settings)
    }

    pub fn estimator_config(&self) -> EstimatorConfig {
        let mut config = EstimatorConfig::default()
            .with_runtime(self.runtime)
            .with_model_type(self.model_type)
            .with_smoothing(self.smoothing);
        if let Some(path) = &self.model_path {
            config = config.with_model_path(path.clone());
        }
        if let Some(device_id) = self.cuda_device {
            config = config.with_device(Device::Cuda { device_id });
        }
        config
    }

    /// The preview keeps the inference aspect ratio at the configured width.
    pub fn scheduler_config(&self, inference: Resolution) -> SchedulerConfig {
        let height = (self.display_width as u64 * inference.height as u64 / inference.width.max(1) as u64) as u32;
        SchedulerConfig::default()
            .with_refresh_hz(self.refresh_hz)
            .with_display(Resolution::new(self.display_width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.estimator_config().enable_smoothing());
    }

    #[test]
    fn test_reads_every_variable() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("POSECAM_RUNTIME", "ort"),
            ("POSECAM_MODEL_TYPE", "heavy"),
            ("POSECAM_MODEL_PATH", "/models/pose.onnx"),
            ("POSECAM_SMOOTHING", "off"),
            ("POSECAM_CUDA_DEVICE", "1"),
            ("POSECAM_DEVICE", "/dev/video2"),
            ("POSECAM_DISPLAY_WIDTH", "720"),
            ("POSECAM_REFRESH_HZ", "30"),
            ("POSECAM_LOG_DIR", "/tmp/posecam"),
            ("POSECAM_FRAMES", "100"),
        ]))
        .unwrap();

        assert_eq!(settings.model_type, ModelType::Heavy);
        assert_eq!(settings.camera_device.as_deref(), Some("/dev/video2"));
        assert_eq!(settings.frames, Some(100));
        assert_eq!(settings.log_dir, Some(PathBuf::from("/tmp/posecam")));

        let estimator = settings.estimator_config();
        assert!(!estimator.enable_smoothing());
        assert_eq!(estimator.model_path(), std::path::Path::new("/models/pose.onnx"));
        assert_eq!(estimator.device(), Device::Cuda { device_id: 1 });
    }

    #[test]
    fn test_display_follows_inference_aspect() {
        let settings = Settings {
            display_width: 360,
            ..Settings::default()
        };
        let config = settings.scheduler_config(Resolution::new(180, 320));
        assert_eq!(config.display(), Resolution::new(360, 640));
        assert_eq!(config.refresh_hz(), 60);
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = Settings::from_lookup(lookup_from(&[("POSECAM_FRAMES", "lots")])).unwrap_err();
        assert!(err.to_string().starts_with("invalid POSECAM_FRAMES=\"lots\""));

        let err = Settings::from_lookup(lookup_from(&[("POSECAM_DISPLAY_WIDTH", "0")])).unwrap_err();
        assert_eq!(err.to_string(), "invalid POSECAM_DISPLAY_WIDTH=\"0\": must be positive");

        assert!(Settings::from_lookup(lookup_from(&[("POSECAM_RUNTIME", "tflite")])).is_err());
        assert!(Settings::from_lookup(lookup_from(&[("POSECAM_SMOOTHING", "maybe")])).is_err());
    }
}
