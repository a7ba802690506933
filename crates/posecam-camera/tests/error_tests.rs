use posecam_base::TensorError;
use posecam_camera::CameraError;
use std::io;

#[test]
fn test_from_io_error() {
    let err: CameraError = io::Error::new(io::ErrorKind::NotFound, "device not found").into();
    match err {
        CameraError::Device(msg) => assert!(msg.contains("device not found")),
        other => panic!("expected CameraError::Device, got {other:?}"),
    }
}

#[test]
fn test_from_tensor_error() {
    let err: CameraError = TensorError::ShapeOverflow.into();
    assert!(matches!(err, CameraError::Stream(_)));
}

#[test]
fn test_error_display() {
    assert!(CameraError::Channel("closed".into()).to_string().contains("closed"));
    assert!(CameraError::Decode("bad jpeg".into()).to_string().starts_with("decode error"));
    assert!(CameraError::Config("zero width".into()).to_string().contains("zero width"));
}
