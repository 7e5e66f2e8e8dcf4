use super::*;
use crate::foundation::core::TARGET_RESOLUTION;
use image::Rgb;

#[test]
fn wide_image_keeps_full_height_and_crops_columns() {
    let w = crop_window(1920, 1080, TARGET_RESOLUTION).unwrap();
    assert_eq!(w.height, 1080);
    assert_eq!(w.top, 0);
    // 1080 * 0.5625 = 607.5 rounds half away from zero.
    assert_eq!(w.width, 608);
    assert_eq!(w.left, (1920 - 608) / 2);
}

#[test]
fn tall_image_keeps_full_width_and_crops_rows() {
    let w = crop_window(1000, 4000, TARGET_RESOLUTION).unwrap();
    assert_eq!(w.width, 1000);
    assert_eq!(w.left, 0);
    assert_eq!(w.height, 1778);
    assert_eq!(w.top, (4000 - 1778) / 2);
}

#[test]
fn exact_ratio_takes_vertical_branch_as_noop() {
    for (sw, sh) in [(1080, 1920), (540, 960), (9, 16)] {
        let w = crop_window(sw, sh, TARGET_RESOLUTION).unwrap();
        assert_eq!(
            w,
            CropWindow {
                left: 0,
                top: 0,
                width: sw,
                height: sh
            }
        );
    }
}

#[test]
fn crop_window_never_exceeds_source() {
    for (sw, sh) in [(1, 1), (3, 7), (7, 3), (4000, 3), (3, 4000), (1081, 1921)] {
        let w = crop_window(sw, sh, TARGET_RESOLUTION).unwrap();
        assert!(w.left + w.width <= sw, "{sw}x{sh} -> {w:?}");
        assert!(w.top + w.height <= sh, "{sw}x{sh} -> {w:?}");
        let image_ratio = f64::from(sw) / f64::from(sh);
        if image_ratio > TARGET_RESOLUTION.ratio() {
            assert_eq!(w.height, sh);
        } else {
            assert_eq!(w.width, sw);
        }
    }
}

#[test]
fn degenerate_sizes_are_input_errors() {
    assert!(matches!(
        crop_window(0, 10, TARGET_RESOLUTION),
        Err(SlideError::Input(_))
    ));
    assert!(matches!(
        crop_window(10, 0, TARGET_RESOLUTION),
        Err(SlideError::Input(_))
    ));

    let needle = Resolution {
        width: 1,
        height: 1000,
    };
    assert!(matches!(crop_window(10, 1, needle), Err(SlideError::Input(_))));
}

#[test]
fn normalize_output_always_matches_target() {
    for (sw, sh) in [(1, 1), (640, 480), (480, 640), (1080, 1920), (37, 5)] {
        let src = DynamicImage::ImageRgb8(RgbImage::new(sw, sh));
        let out = normalize(&src, TARGET_RESOLUTION).unwrap();
        assert_eq!(out.dimensions(), (1080, 1920), "source {sw}x{sh}");
    }
}

#[test]
fn normalize_keeps_center_content() {
    // Blue | red | blue thirds. The 9:16 center crop of a 300x100 image lands in the red band.
    let src = RgbImage::from_fn(300, 100, |x, _| {
        if (100..200).contains(&x) {
            Rgb([255, 0, 0])
        } else {
            Rgb([0, 0, 255])
        }
    });
    let target = Resolution {
        width: 18,
        height: 32,
    };
    let out = normalize(&DynamicImage::ImageRgb8(src), target).unwrap();
    for px in out.pixels() {
        assert!(px[0] > 250 && px[2] < 5, "unexpected pixel {px:?}");
    }
}

#[test]
fn normalize_drops_alpha() {
    let src = image::RgbaImage::from_pixel(20, 20, image::Rgba([10, 20, 30, 0]));
    let out = normalize(&DynamicImage::ImageRgba8(src), TARGET_RESOLUTION).unwrap();
    assert_eq!(out.get_pixel(0, 0), &Rgb([10, 20, 30]));
}

#[test]
fn bgr24_swaps_red_and_blue() {
    let mut rgb = RgbImage::new(2, 1);
    rgb.put_pixel(0, 0, Rgb([1, 2, 3]));
    rgb.put_pixel(1, 0, Rgb([200, 100, 50]));
    let frame = to_bgr24(&rgb);
    assert_eq!((frame.width, frame.height), (2, 1));
    assert_eq!(frame.data, vec![3, 2, 1, 50, 100, 200]);
}
