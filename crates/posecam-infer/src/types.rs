use std::borrow::Cow;

/// One anatomical landmark.
#[derive(Debug, Clone, PartialEq)]
pub struct Keypoint {
    pub name: Cow<'static, str>,
    pub x: f32,
    pub y: f32,
    /// Depth estimate; 0.0 for 2D models.
    pub z: f32,
    /// Confidence in [0.0, 1.0].
    pub score: f32,
}

impl Keypoint {
    pub fn new(name: impl Into<Cow<'static, str>>, x: f32, y: f32, z: f32, score: f32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            z,
            score,
        }
    }
}

/// A detected body. Keypoints are ordered by anatomical index, and that
/// order is the same for every pose a given model returns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pose {
    pub keypoints: Vec<Keypoint>,
    /// Detection confidence, when the model reports one.
    pub score: Option<f32>,
}

impl Pose {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self {
            keypoints,
            score: None,
        }
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    pub fn keypoint(&self, name: &str) -> Option<&Keypoint> {
        self.keypoints.iter().find(|k| k.name == name)
    }
}
