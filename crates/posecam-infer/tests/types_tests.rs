use posecam_infer::{COCO_KEYPOINT_COUNT, COCO_KEYPOINT_NAMES, Keypoint, Pose};

#[test]
fn test_keypoint_accepts_static_and_owned_names() {
    let a = Keypoint::new("nose", 1.0, 2.0, 0.0, 0.9);
    let b = Keypoint::new(String::from("nose"), 1.0, 2.0, 0.0, 0.9);
    assert_eq!(a, b);
}

#[test]
fn test_pose_lookup_by_name() {
    let pose = Pose::new(vec![
        Keypoint::new("nose", 90.0, 32.0, 0.0, 0.5),
        Keypoint::new("left_eye", 85.0, 28.0, 0.0, 0.4),
    ])
    .with_score(0.8);

    assert_eq!(pose.keypoint("left_eye").map(|k| k.x), Some(85.0));
    assert!(pose.keypoint("right_ankle").is_none());
    assert_eq!(pose.score, Some(0.8));
}

#[test]
fn test_coco_names_are_in_anatomical_order() {
    assert_eq!(COCO_KEYPOINT_NAMES.len(), COCO_KEYPOINT_COUNT);
    assert_eq!(COCO_KEYPOINT_NAMES[0], "nose");
    assert_eq!(COCO_KEYPOINT_NAMES[5], "left_shoulder");
    assert_eq!(COCO_KEYPOINT_NAMES[16], "right_ankle");
}
