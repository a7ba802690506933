//! Pre- and post-processing for YOLO pose models.
//!
//! Input: letterboxed `[1, 3, 640, 640]` in [0, 1]. Output: `[1, 56, N]`
//! where each column is `cx, cy, w, h, conf` followed by 17 × `(x, y, score)`.

use posecam_base::Tensor;

use crate::{COCO_KEYPOINT_COUNT, COCO_KEYPOINT_NAMES, InferError, Keypoint, Pose};

/// Square model input edge.
pub const INPUT_SIZE: usize = 640;
const PAD_VALUE: f32 = 114.0 / 255.0;
const OUTPUT_ROWS: usize = 5 + COCO_KEYPOINT_COUNT * 3;

/// How an image was scaled and padded into the model input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
}

impl Letterbox {
    /// Map a point from model input space back to the source image.
    pub fn unmap(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

/// Letterbox an HWC RGB frame into NCHW model input.
pub fn preprocess(image: &Tensor<u8>) -> Result<(Tensor<f32>, Letterbox), InferError> {
    let (h, w) = image.image_dims().map_err(|_| InferError::ShapeMismatch {
        expected: "[H, W, 3]".to_string(),
        got: format!("{:?}", image.shape),
    })?;
    if h == 0 || w == 0 {
        return Err(InferError::ShapeMismatch {
            expected: "non-empty image".to_string(),
            got: format!("{:?}", image.shape),
        });
    }

    let scale = (INPUT_SIZE as f32 / w as f32).min(INPUT_SIZE as f32 / h as f32);
    let new_w = ((w as f32 * scale) as usize).min(INPUT_SIZE);
    let new_h = ((h as f32 * scale) as usize).min(INPUT_SIZE);
    let pad_x = (INPUT_SIZE - new_w) / 2;
    let pad_y = (INPUT_SIZE - new_h) / 2;

    let plane = INPUT_SIZE * INPUT_SIZE;
    let mut data = vec![PAD_VALUE; 3 * plane];
    for y in 0..new_h {
        let src_y = ((y as f32 / scale) as usize).min(h - 1);
        for x in 0..new_w {
            let src_x = ((x as f32 / scale) as usize).min(w - 1);
            let src = (src_y * w + src_x) * 3;
            let dst = (y + pad_y) * INPUT_SIZE + (x + pad_x);
            for ch in 0..3 {
                data[ch * plane + dst] = image.data[src + ch] as f32 / 255.0;
            }
        }
    }

    let input = Tensor::new(vec![1, 3, INPUT_SIZE, INPUT_SIZE], data)?;
    let letterbox = Letterbox {
        scale,
        pad_x: pad_x as f32,
        pad_y: pad_y as f32,
    };
    Ok((input, letterbox))
}

#[derive(Debug, Clone, Copy)]
struct Bbox {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
}

impl Bbox {
    fn area(&self) -> f32 {
        (self.x1 - self.x0).max(0.0) * (self.y1 - self.y0).max(0.0)
    }

    fn iou(&self, other: &Bbox) -> f32 {
        let ix = (self.x1.min(other.x1) - self.x0.max(other.x0)).max(0.0);
        let iy = (self.y1.min(other.y1) - self.y0.max(other.y0)).max(0.0);
        let intersection = ix * iy;
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 { 0.0 } else { intersection / union }
    }
}

/// Decode raw model output into poses in source-image coordinates, sorted
/// by detection confidence, with overlapping detections suppressed.
pub fn postprocess(
    output: &Tensor<f32>,
    letterbox: &Letterbox,
    conf_threshold: f32,
    iou_threshold: f32,
) -> Result<Vec<Pose>, InferError> {
    if output.shape.len() != 3 || output.shape[0] != 1 || output.shape[1] != OUTPUT_ROWS {
        return Err(InferError::ShapeMismatch {
            expected: format!("[1, {OUTPUT_ROWS}, N]"),
            got: format!("{:?}", output.shape),
        });
    }

    let n = output.shape[2];
    // element [0, row, col] lives at row * n + col
    let at = |row: usize, col: usize| output.data[row * n + col];

    let mut candidates: Vec<(Bbox, Pose)> = Vec::new();
    for i in 0..n {
        let confidence = at(4, i);
        if confidence < conf_threshold {
            continue;
        }

        let (cx, cy) = letterbox.unmap(at(0, i), at(1, i));
        let (bw, bh) = (at(2, i) / letterbox.scale, at(3, i) / letterbox.scale);
        let bbox = Bbox {
            x0: cx - bw / 2.0,
            y0: cy - bh / 2.0,
            x1: cx + bw / 2.0,
            y1: cy + bh / 2.0,
        };

        let keypoints = COCO_KEYPOINT_NAMES
            .iter()
            .enumerate()
            .map(|(k, name)| {
                let base = 5 + k * 3;
                let (x, y) = letterbox.unmap(at(base, i), at(base + 1, i));
                Keypoint::new(*name, x, y, 0.0, at(base + 2, i).clamp(0.0, 1.0))
            })
            .collect();

        candidates.push((bbox, Pose::new(keypoints).with_score(confidence)));
    }

    candidates.sort_by(|a, b| {
        b.1.score
            .partial_cmp(&a.1.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<(Bbox, Pose)> = Vec::new();
    for (bbox, pose) in candidates {
        if kept.iter().all(|(k, _)| k.iou(&bbox) <= iou_threshold) {
            kept.push((bbox, pose));
        }
    }

    Ok(kept.into_iter().map(|(_, pose)| pose).collect())
}
