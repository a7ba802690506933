use posecam_base::Tensor;

use crate::{CameraError, Resolution};

/// Nearest-neighbour resize of an HWC RGB tensor to `target`.
///
/// Aspect ratio is not preserved; each axis is scaled independently.
pub fn resize_rgb(image: &Tensor<u8>, target: Resolution) -> Result<Tensor<u8>, CameraError> {
    let (h, w) = image.image_dims()?;
    if h == 0 || w == 0 || target.width == 0 || target.height == 0 {
        return Err(CameraError::Config(format!(
            "cannot resize {w}x{h} to {}x{}",
            target.width, target.height
        )));
    }

    let (out_w, out_h) = (target.width as usize, target.height as usize);
    if (out_w, out_h) == (w, h) {
        return Ok(image.clone());
    }

    let scale_x = w as f32 / out_w as f32;
    let scale_y = h as f32 / out_h as f32;

    let mut data = Vec::with_capacity(target.pixel_count() * 3);
    for out_y in 0..out_h {
        let src_y = ((out_y as f32 * scale_y).floor() as usize).min(h - 1);
        for out_x in 0..out_w {
            let src_x = ((out_x as f32 * scale_x).floor() as usize).min(w - 1);
            let src = (src_y * w + src_x) * 3;
            data.extend_from_slice(&image.data[src..src + 3]);
        }
    }

    Ok(Tensor::new(vec![out_h, out_w, 3], data)?)
}
