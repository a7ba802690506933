use posecam_base::Tensor;
use posecam_camera::FrameTensor;
use posecam_infer::{InferError, Keypoint, Pose, PoseEstimator, SmoothedEstimator};
use std::collections::VecDeque;

/// Replays a scripted sequence of results.
struct Scripted {
    results: VecDeque<Result<Vec<Pose>, InferError>>,
}

impl Scripted {
    fn new(results: Vec<Result<Vec<Pose>, InferError>>) -> Self {
        Self {
            results: results.into(),
        }
    }
}

impl PoseEstimator for Scripted {
    async fn estimate(&mut self, _frame: &FrameTensor, _ts: u64) -> Result<Vec<Pose>, InferError> {
        self.results.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

fn frame() -> FrameTensor {
    FrameTensor::untracked(0, Tensor::new(vec![2, 2, 3], vec![0u8; 12]).unwrap()).unwrap()
}

fn nose_at(x: f32) -> Vec<Pose> {
    vec![Pose::new(vec![Keypoint::new("nose", x, x, 0.0, 0.9)])]
}

#[tokio::test]
async fn test_disabled_passes_through() {
    let mut est = SmoothedEstimator::new(Scripted::new(vec![Ok(nose_at(0.0)), Ok(nose_at(100.0))]))
        .with_enabled(false);
    let f = frame();

    est.estimate(&f, 0).await.unwrap();
    let poses = est.estimate(&f, 33).await.unwrap();
    assert_eq!(poses[0].keypoints[0].x, 100.0);
}

#[tokio::test]
async fn test_enabled_damps_jumps() {
    let mut est = SmoothedEstimator::new(Scripted::new(vec![Ok(nose_at(0.0)), Ok(nose_at(100.0))]));
    let f = frame();

    let first = est.estimate(&f, 0).await.unwrap();
    assert_eq!(first[0].keypoints[0].x, 0.0);

    let second = est.estimate(&f, 33).await.unwrap();
    let x = second[0].keypoints[0].x;
    assert!(x > 0.0 && x < 100.0, "got {x}");
    assert_eq!(second[0].keypoints[0].name, "nose");
    assert_eq!(second[0].keypoints[0].score, 0.9);
}

#[tokio::test]
async fn test_empty_result_resets_filter() {
    let mut est = SmoothedEstimator::new(Scripted::new(vec![
        Ok(nose_at(0.0)),
        Ok(Vec::new()),
        Ok(nose_at(100.0)),
    ]));
    let f = frame();

    est.estimate(&f, 0).await.unwrap();
    assert!(est.estimate(&f, 33).await.unwrap().is_empty());
    let after_reset = est.estimate(&f, 66).await.unwrap();
    assert_eq!(after_reset[0].keypoints[0].x, 100.0);
}

#[tokio::test]
async fn test_only_primary_pose_is_filtered() {
    let two = |x: f32| {
        vec![
            Pose::new(vec![Keypoint::new("nose", x, 0.0, 0.0, 0.9)]),
            Pose::new(vec![Keypoint::new("nose", x, 0.0, 0.0, 0.9)]),
        ]
    };
    let mut est = SmoothedEstimator::new(Scripted::new(vec![Ok(two(0.0)), Ok(two(50.0))]));
    let f = frame();

    est.estimate(&f, 0).await.unwrap();
    let poses = est.estimate(&f, 33).await.unwrap();
    assert!(poses[0].keypoints[0].x < 50.0);
    assert_eq!(poses[1].keypoints[0].x, 50.0);
}

#[tokio::test]
async fn test_errors_propagate() {
    let mut est = SmoothedEstimator::new(Scripted::new(vec![Err(InferError::Runtime(
        "model hiccup".to_string(),
    ))]));
    let f = frame();
    assert!(matches!(est.estimate(&f, 0).await, Err(InferError::Runtime(_))));
}
