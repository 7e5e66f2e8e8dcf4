//! Crop-then-resize normalization of arbitrary images into the fixed output frame.

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};

use crate::encode::sink::FrameBgr24;
use crate::foundation::core::Resolution;
use crate::foundation::error::{SlideError, SlideResult};

/// Interpolation used for the final resize (bicubic).
pub const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Centered crop rectangle in source-pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropWindow {
    /// Left edge.
    pub left: u32,
    /// Top edge.
    pub top: u32,
    /// Window width.
    pub width: u32,
    /// Window height.
    pub height: u32,
}

/// Compute the centered crop that gives a `src_w x src_h` image the aspect ratio of `target`.
///
/// Images wider than the target keep every row and lose columns on both sides; all other
/// images (including an exact ratio match) keep every column and lose rows.
pub fn crop_window(src_w: u32, src_h: u32, target: Resolution) -> SlideResult<CropWindow> {
    if src_w == 0 || src_h == 0 {
        return Err(SlideError::input(format!(
            "image has degenerate size {src_w}x{src_h}"
        )));
    }
    if target.width == 0 || target.height == 0 {
        return Err(SlideError::input("target resolution must be non-zero"));
    }

    let image_ratio = f64::from(src_w) / f64::from(src_h);
    let target_ratio = target.ratio();

    let window = if image_ratio > target_ratio {
        let new_width = (f64::from(src_h) * target_ratio).round() as u32;
        CropWindow {
            left: (src_w - new_width.min(src_w)) / 2,
            top: 0,
            width: new_width.min(src_w),
            height: src_h,
        }
    } else {
        let new_height = (f64::from(src_w) / target_ratio).round() as u32;
        CropWindow {
            left: 0,
            top: (src_h - new_height.min(src_h)) / 2,
            width: src_w,
            height: new_height.min(src_h),
        }
    };

    if window.width == 0 || window.height == 0 {
        return Err(SlideError::input(format!(
            "image {src_w}x{src_h} collapses to an empty crop"
        )));
    }
    Ok(window)
}

/// Crop and resize `image` to exactly `target`. The source is not modified.
pub fn normalize(image: &DynamicImage, target: Resolution) -> SlideResult<RgbImage> {
    let rgb = image.to_rgb8();
    let window = crop_window(rgb.width(), rgb.height(), target)?;
    let cropped =
        image::imageops::crop_imm(&rgb, window.left, window.top, window.width, window.height)
            .to_image();
    Ok(image::imageops::resize(
        &cropped,
        target.width,
        target.height,
        RESIZE_FILTER,
    ))
}

/// Repack an RGB frame into the encoder's `bgr24` order.
pub fn to_bgr24(frame: &RgbImage) -> FrameBgr24 {
    let mut data = Vec::with_capacity(FrameBgr24::byte_len(frame.width(), frame.height()));
    for px in frame.as_raw().chunks_exact(3) {
        data.extend_from_slice(&[px[2], px[1], px[0]]);
    }
    FrameBgr24 {
        width: frame.width(),
        height: frame.height(),
        data,
    }
}

#[cfg(test)]
#[path = "../tests/unit/normalize.rs"]
mod tests;
