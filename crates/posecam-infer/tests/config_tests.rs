use posecam_infer::{Device, EstimatorConfig, InferError, ModelType, Runtime};
use std::path::Path;

#[test]
fn test_defaults_match_startup_configuration() {
    let config = EstimatorConfig::default();
    assert_eq!(config.runtime(), Runtime::Onnx);
    assert!(config.enable_smoothing());
    assert_eq!(config.model_type(), ModelType::Lite);
    assert_eq!(config.device(), Device::Cpu);
    assert!(config.validate().is_ok());
}

#[test]
fn test_model_path_falls_back_to_tier_default() {
    let config = EstimatorConfig::default().with_model_type(ModelType::Heavy);
    assert_eq!(config.model_path(), Path::new("models/yolov8m-pose.onnx"));

    let config = config.with_model_path("/opt/models/custom.onnx");
    assert_eq!(config.model_path(), Path::new("/opt/models/custom.onnx"));
}

#[test]
fn test_validate_rejects_out_of_range_thresholds() {
    let config = EstimatorConfig::default().with_conf_threshold(1.5);
    assert!(matches!(config.validate(), Err(InferError::InvalidConfig(_))));

    let config = EstimatorConfig::default().with_iou_threshold(f32::NAN);
    assert!(matches!(config.validate(), Err(InferError::InvalidConfig(_))));
}

#[test]
fn test_parse_runtime_and_model_type() {
    assert_eq!("ONNX".parse::<Runtime>().unwrap(), Runtime::Onnx);
    assert!(matches!(
        "tfjs".parse::<Runtime>(),
        Err(InferError::UnsupportedRuntime(name)) if name == "tfjs"
    ));

    assert_eq!("full".parse::<ModelType>().unwrap(), ModelType::Full);
    assert!("giant".parse::<ModelType>().is_err());
}

#[test]
fn test_device_display() {
    assert_eq!(Device::Cpu.to_string(), "CPU");
    assert_eq!(Device::Cuda { device_id: 1 }.to_string(), "CUDA(device_id=1)");
}
