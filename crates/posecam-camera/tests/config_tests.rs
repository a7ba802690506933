use posecam_camera::{CameraConfig, INFERENCE_WIDTH, Platform, Resolution};

#[test]
fn test_inference_resolution_per_platform() {
    assert_eq!(Resolution::inference(Platform::Ios), Resolution::new(180, 320));
    assert_eq!(Resolution::inference(Platform::Android), Resolution::new(180, 240));
    assert_eq!(Resolution::inference(Platform::Desktop), Resolution::new(180, 240));
}

#[test]
fn test_inference_width_is_fixed() {
    for platform in [Platform::Ios, Platform::Android, Platform::Desktop] {
        assert_eq!(Resolution::inference(platform).width, INFERENCE_WIDTH);
    }
}

#[test]
fn test_config_builder() {
    let config = CameraConfig::default()
        .with_device("/dev/video2".to_string())
        .with_width(1280)
        .with_height(720)
        .with_fps(60)
        .with_buffer_count(2)
        .with_platform(Platform::Ios);

    assert_eq!(config.device(), "/dev/video2");
    assert_eq!(config.capture_resolution(), Resolution::new(1280, 720));
    assert_eq!(config.fps(), 60);
    assert_eq!(config.buffer_count(), 2);
    assert_eq!(config.inference_resolution(), Resolution::new(180, 320));
}

#[test]
fn test_config_defaults() {
    let config = CameraConfig::default();
    assert_eq!(config.device(), "/dev/video0");
    assert_eq!((config.width(), config.height()), (640, 480));
    assert_eq!(config.fps(), 30);
    assert_eq!(config.platform(), Platform::current());
}

#[test]
fn test_pixel_count() {
    assert_eq!(Resolution::new(180, 240).pixel_count(), 43_200);
    assert_eq!(Resolution::new(0, 240).pixel_count(), 0);
}
