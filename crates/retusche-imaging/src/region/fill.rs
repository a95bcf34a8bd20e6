// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Area fill — overwrite a rectangle by inpainting, border mean, border
// median, or a flat colour.

use image::RgbImage;
use retusche_core::{FillMode, Rect, Rgb};
use tracing::{debug, info, instrument};

use super::inpaint::{INPAINT_RADIUS, inpaint_rects};
use crate::raster::Image;
use crate::stats::{channel_mean, channel_median};

/// Fill `rect` according to `mode`.
///
/// `rect` is clamped to the image; a degenerate result returns an
/// unmodified copy. `Average` and `Median` leave the region untouched when
/// the rectangle touches all four image edges (no border to sample).
#[instrument(skip(image), fields(width = image.width(), height = image.height(), %rect, mode = mode.name()))]
pub fn fill(image: &Image, rect: Rect, mode: FillMode) -> Image {
    let r = rect.clamp_to(image.width(), image.height());
    if r.is_empty() {
        debug!("Degenerate region; returning unchanged");
        return image.clone();
    }

    let out = match mode {
        FillMode::Inpaint => inpaint_rects(image, &[r], INPAINT_RADIUS),
        FillMode::Average => match channel_mean(&border_samples(image.as_rgb(), r)) {
            Some(color) => flat(image, r, color),
            None => image.clone(),
        },
        FillMode::Median => match channel_median(&border_samples(image.as_rgb(), r)) {
            Some(color) => flat(image, r, color),
            None => image.clone(),
        },
        FillMode::Color(color) => flat(image, r, color),
    };
    info!("Region filled");
    out
}

/// Fill by mode keyword. Unrecognised keywords return an unmodified copy.
pub fn fill_named(image: &Image, rect: Rect, mode: &str, color: Option<Rgb>) -> Image {
    match FillMode::from_name(mode, color) {
        Some(mode) => fill(image, rect, mode),
        None => {
            debug!(mode, "Unknown fill mode; returning unchanged");
            image.clone()
        }
    }
}

/// The one-pixel ring just outside `r`, on each side that lies within the
/// image. `r` must already be clamped and non-empty.
fn border_samples(buf: &RgbImage, r: Rect) -> Vec<[u8; 3]> {
    let (w, h) = (buf.width() as i32, buf.height() as i32);
    let mut samples = Vec::with_capacity(2 * (r.width() + r.height()) as usize);
    let mut take = |x: i32, y: i32| samples.push(buf.get_pixel(x as u32, y as u32).0);

    if r.y1 > 0 {
        (r.x1..r.x2).for_each(|x| take(x, r.y1 - 1));
    }
    if r.y2 < h {
        (r.x1..r.x2).for_each(|x| take(x, r.y2));
    }
    if r.x1 > 0 {
        (r.y1..r.y2).for_each(|y| take(r.x1 - 1, y));
    }
    if r.x2 < w {
        (r.y1..r.y2).for_each(|y| take(r.x2, y));
    }
    samples
}

/// Copy of `image` with `r` painted `color`.
fn flat(image: &Image, r: Rect, color: Rgb) -> Image {
    let mut buf = image.to_buffer();
    let px = image::Rgb(color.channels());
    for y in r.y1..r.y2 {
        for x in r.x1..r.x2 {
            buf.put_pixel(x as u32, y as u32, px);
        }
    }
    Image::from_buffer(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image() -> Image {
        Image::from_buffer(RgbImage::from_fn(30, 20, |x, y| {
            image::Rgb([(x * 8) as u8, (y * 12) as u8, 90])
        }))
    }

    #[test]
    fn degenerate_region_is_identity_for_every_mode() {
        let img = gradient_image();
        let modes = [
            FillMode::Inpaint,
            FillMode::Average,
            FillMode::Median,
            FillMode::Color(Rgb::new(1, 2, 3)),
        ];
        let rects = [
            Rect { x1: 5, y1: 5, x2: 5, y2: 10 },
            Rect { x1: 5, y1: 10, x2: 12, y2: 10 },
            Rect { x1: 12, y1: 5, x2: 3, y2: 10 },
            Rect::new(40, 40, 60, 60),
        ];
        for mode in modes {
            for rect in rects {
                assert_eq!(fill(&img, rect, mode), img, "{mode:?} over {rect}");
            }
        }
    }

    #[test]
    fn color_fill_is_exact_inside_and_untouched_outside() {
        let img = gradient_image();
        let rect = Rect::new(4, 3, 17, 11);
        let color = Rgb::new(12, 34, 56);
        let out = fill(&img, rect, FillMode::Color(color));
        for y in 0..20 {
            for x in 0..30 {
                if rect.contains(x as i32, y as i32) {
                    assert_eq!(out.pixel(x, y), color, "inside ({x}, {y})");
                } else {
                    assert_eq!(out.pixel(x, y), img.pixel(x, y), "outside ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn average_uses_border_mean() {
        // Border above is 100, below is 200: mean 150.
        let img = Image::from_buffer(RgbImage::from_fn(10, 10, |_, y| {
            if y < 5 { image::Rgb([100, 100, 100]) } else { image::Rgb([200, 200, 200]) }
        }));
        let out = fill(&img, Rect::new(0, 4, 10, 6), FillMode::Average);
        assert_eq!(out.pixel(3, 4), Rgb::new(150, 150, 150));
        assert_eq!(out.pixel(3, 5), Rgb::new(150, 150, 150));
        assert_eq!(out.pixel(3, 3), Rgb::new(100, 100, 100));
    }

    #[test]
    fn median_ignores_a_stray_dark_border_pixel() {
        let mut buf = RgbImage::from_pixel(12, 12, image::Rgb([210, 210, 210]));
        buf.put_pixel(5, 3, image::Rgb([0, 0, 0]));
        for y in 4..8 {
            for x in 4..8 {
                buf.put_pixel(x, y, image::Rgb([10, 200, 10]));
            }
        }
        let img = Image::from_buffer(buf);
        let median = fill(&img, Rect::new(4, 4, 8, 8), FillMode::Median);
        let mean = fill(&img, Rect::new(4, 4, 8, 8), FillMode::Average);
        assert_eq!(median.pixel(6, 6), Rgb::new(210, 210, 210));
        assert!(mean.pixel(6, 6).r < 210);
    }

    #[test]
    fn full_image_border_fill_is_a_no_op() {
        let img = gradient_image();
        let all = img.bounds();
        assert_eq!(fill(&img, all, FillMode::Average), img);
        assert_eq!(fill(&img, all, FillMode::Median), img);
    }

    #[test]
    fn unknown_mode_keyword_is_a_no_op() {
        let img = gradient_image();
        assert_eq!(fill_named(&img, Rect::new(2, 2, 9, 9), "smudge", None), img);
    }

    #[test]
    fn color_keyword_defaults_to_white() {
        let img = gradient_image();
        let out = fill_named(&img, Rect::new(2, 2, 9, 9), "color", None);
        assert_eq!(out.pixel(5, 5), Rgb::WHITE);
    }
}
