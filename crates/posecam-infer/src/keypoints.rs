/// Number of keypoints in COCO pose format
pub const COCO_KEYPOINT_COUNT: usize = 17;

/// COCO keypoint labels in model output order.
pub const COCO_KEYPOINT_NAMES: [&str; COCO_KEYPOINT_COUNT] = [
    "nose",
    "left_eye",
    "right_eye",
    "left_ear",
    "right_ear",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
];
