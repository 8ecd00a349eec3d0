//! Width-capped downscaling of RGB frames.
//!
//! Frames wider than the configured maximum are shrunk with an area-averaging
//! (box) filter, preserving aspect ratio. Frames are never enlarged.

use fast_image_resize as fr;
use fr::images::Image;

use crate::error::{CoreError, CoreResult};

/// Output dimensions for a `width`x`height` frame under `max_width`.
///
/// `max_width == 0` disables the cap. Both dimensions are rounded to the
/// nearest integer and are at least 1.
#[must_use]
pub fn compute_output_size(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    let scale = if max_width > 0 {
        (f64::from(max_width) / f64::from(width.max(1))).min(1.0)
    } else {
        1.0
    };
    if scale >= 1.0 {
        return (width.max(1), height.max(1));
    }

    let scaled = |v: u32| ((f64::from(v) * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// Resizes packed RGB24 `data` from `width`x`height` to `out_width`x`out_height`
/// using a box filter.
///
/// Returns the input unchanged when the sizes are equal.
pub fn downscale_rgb(
    data: Vec<u8>,
    width: u32,
    height: u32,
    out_width: u32,
    out_height: u32,
) -> CoreResult<Vec<u8>> {
    if (width, height) == (out_width, out_height) {
        return Ok(data);
    }

    let src_image = Image::from_vec_u8(width, height, data, fr::PixelType::U8x3)
        .map_err(|e| CoreError::OperationFailed(format!("invalid frame buffer: {e}")))?;
    let mut dst_image = Image::new(out_width, out_height, fr::PixelType::U8x3);

    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Box));
    let mut resizer = fr::Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| CoreError::OperationFailed(format!("resize failed: {e}")))?;

    Ok(dst_image.buffer().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_frames_are_capped() {
        assert_eq!(compute_output_size(1920, 1080, 1280), (1280, 720));
        assert_eq!(compute_output_size(3840, 2160, 1280), (1280, 720));
    }

    #[test]
    fn test_never_upscales() {
        assert_eq!(compute_output_size(640, 360, 1280), (640, 360));
        assert_eq!(compute_output_size(1280, 720, 1280), (1280, 720));
    }

    #[test]
    fn test_zero_disables_cap() {
        assert_eq!(compute_output_size(4000, 3000, 0), (4000, 3000));
    }

    #[test]
    fn test_dimensions_stay_positive() {
        assert_eq!(compute_output_size(10_000, 1, 100), (100, 1));
    }

    #[test]
    fn test_downscale_averages_blocks() {
        // 2x2 image -> 1x1: the box filter averages all four pixels
        let data = vec![0, 0, 0, 100, 100, 100, 100, 100, 100, 200, 200, 200];
        let out = downscale_rgb(data, 2, 2, 1, 1).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|&v| (99..=101).contains(&v)), "{out:?}");
    }

    #[test]
    fn test_downscale_same_size_is_identity() {
        let data = vec![1, 2, 3, 4, 5, 6];
        assert_eq!(downscale_rgb(data.clone(), 2, 1, 2, 1).unwrap(), data);
    }

    #[test]
    fn test_downscale_rejects_short_buffer() {
        assert!(downscale_rgb(vec![0; 5], 2, 2, 1, 1).is_err());
    }
}
