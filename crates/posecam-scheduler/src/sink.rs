use posecam_camera::Resolution;
use posecam_infer::{Keypoint, Pose};
use tokio::sync::watch;

/// Keypoints at or below this confidence are never published.
pub const MIN_KEYPOINT_SCORE: f32 = 0.3;

/// Fixed linear map from inference pixel space to display pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform {
    scale_x: f32,
    scale_y: f32,
    swap_axes: bool,
}

impl DisplayTransform {
    /// One factor per axis, `display / inference`.
    ///
    /// With `swap_axes` the display is rotated a quarter turn relative to
    /// the inference frame: display x follows inference y and vice versa.
    pub fn new(inference: Resolution, display: Resolution, swap_axes: bool) -> Self {
        let (src_w, src_h) = if swap_axes {
            (inference.height, inference.width)
        } else {
            (inference.width, inference.height)
        };
        Self {
            scale_x: display.width as f32 / src_w.max(1) as f32,
            scale_y: display.height as f32 / src_h.max(1) as f32,
            swap_axes,
        }
    }

    pub fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            swap_axes: false,
        }
    }

    pub fn scale(&self) -> (f32, f32) {
        (self.scale_x, self.scale_y)
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let (x, y) = if self.swap_axes { (y, x) } else { (x, y) };
        (x * self.scale_x, y * self.scale_y)
    }
}

/// The latest keypoints ready for rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishedResult {
    /// Primary-pose keypoints in display space, all above the score floor.
    pub keypoints: Vec<Keypoint>,
    /// Bumped on every publish, including empty ones.
    pub revision: u64,
}

impl PublishedResult {
    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

/// Select the first pose, drop low-confidence keypoints, and map the rest
/// into display space. Keypoint order is preserved.
pub fn primary_keypoints(raw_poses: &[Pose], transform: &DisplayTransform) -> Vec<Keypoint> {
    let Some(primary) = raw_poses.first() else {
        return Vec::new();
    };

    primary
        .keypoints
        .iter()
        .filter(|k| k.score > MIN_KEYPOINT_SCORE)
        .map(|k| {
            let (x, y) = transform.apply(k.x, k.y);
            Keypoint {
                name: k.name.clone(),
                x,
                y,
                z: k.z,
                score: k.score,
            }
        })
        .collect()
}

/// Holds the current [`PublishedResult`] and notifies subscribers when it
/// is replaced.
#[derive(Debug)]
pub struct ResultSink {
    transform: DisplayTransform,
    sender: watch::Sender<PublishedResult>,
}

impl ResultSink {
    pub fn new(transform: DisplayTransform) -> Self {
        let (sender, _) = watch::channel(PublishedResult::default());
        Self { transform, sender }
    }

    pub fn transform(&self) -> &DisplayTransform {
        &self.transform
    }

    /// Read-only view for a renderer. Sees every later publish.
    pub fn subscribe(&self) -> watch::Receiver<PublishedResult> {
        self.sender.subscribe()
    }

    /// Replace the current result with the filtered primary pose of
    /// `raw_poses`. Returns the number of keypoints published.
    pub fn publish(&self, raw_poses: &[Pose]) -> usize {
        let keypoints = primary_keypoints(raw_poses, &self.transform);
        let count = keypoints.len();
        self.sender.send_modify(|current| {
            current.keypoints = keypoints;
            current.revision += 1;
        });
        count
    }

    pub fn latest(&self) -> PublishedResult {
        self.sender.borrow().clone()
    }
}
