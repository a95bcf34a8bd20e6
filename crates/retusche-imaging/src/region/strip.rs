// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Vertical strip delete — remove a full-width band of rows and close the gap.

use image::RgbImage;
use retusche_core::Rect;
use tracing::{debug, instrument};

use crate::raster::Image;

/// Remove rows `[y1, y2)` across the full image width and stitch the part
/// below directly under the part above.
///
/// The horizontal extent of `rect` is ignored: the operation always spans
/// the whole width. Rows are clamped to the image; an empty band, or one
/// that would leave no rows, returns an unmodified copy. The new canvas
/// starts white before the two parts are pasted.
#[instrument(skip(image), fields(width = image.width(), height = image.height(), %rect))]
pub fn strip_delete(image: &Image, rect: Rect) -> Image {
    let (width, height) = image.dimensions();
    let h = height as i32;
    let y1 = rect.y1.clamp(0, h) as u32;
    let y2 = rect.y2.clamp(0, h) as u32;

    if y1 >= y2 {
        debug!(y1, y2, "Empty band; returning unchanged");
        return image.clone();
    }

    let top_rows = y1;
    let bottom_rows = height - y2;
    let new_height = top_rows + bottom_rows;
    if new_height == 0 {
        debug!("Band covers the whole image; returning unchanged");
        return image.clone();
    }

    let source = image.as_rgb();
    let mut stitched = RgbImage::from_pixel(width, new_height, image::Rgb([255, 255, 255]));

    if top_rows > 0 {
        let top = image::imageops::crop_imm(source, 0, 0, width, top_rows).to_image();
        image::imageops::replace(&mut stitched, &top, 0, 0);
    }
    if bottom_rows > 0 {
        let bottom = image::imageops::crop_imm(source, 0, y2, width, bottom_rows).to_image();
        image::imageops::replace(&mut stitched, &bottom, 0, i64::from(top_rows));
    }

    debug!(removed = y2 - y1, new_height, "Strip removed");
    Image::from_buffer(stitched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use retusche_core::Rgb;

    /// 4 px wide, one row per value 0..height so row identity is visible.
    fn striped(height: u32) -> Image {
        Image::from_buffer(RgbImage::from_fn(4, height, |_, y| image::Rgb([y as u8, 0, 0])))
    }

    #[test]
    fn output_height_follows_the_reflow_law() {
        let img = striped(50);
        for (y1, y2) in [(0, 10), (10, 20), (40, 50), (5, 49), (1, 50)] {
            let out = strip_delete(&img, Rect::new(0, y1, 4, y2));
            let expected = (if y1 > 0 { y1 } else { 0 }) + (if y2 < 50 { 50 - y2 } else { 0 });
            assert_eq!(out.height(), expected as u32, "band [{y1}, {y2})");
            assert_eq!(out.width(), 4);
        }
    }

    #[test]
    fn rows_below_move_up() {
        let out = strip_delete(&striped(20), Rect::new(0, 5, 4, 8));
        assert_eq!(out.pixel(0, 4), Rgb::new(4, 0, 0));
        assert_eq!(out.pixel(0, 5), Rgb::new(8, 0, 0));
        assert_eq!(out.pixel(3, 16), Rgb::new(19, 0, 0));
    }

    #[test]
    fn horizontal_extent_is_ignored() {
        let img = striped(20);
        let narrow = strip_delete(&img, Rect::new(1, 5, 2, 8));
        let wide = strip_delete(&img, Rect::new(-100, 5, 100, 8));
        assert_eq!(narrow, wide);
    }

    #[test]
    fn empty_band_is_a_no_op() {
        let img = striped(20);
        assert_eq!(strip_delete(&img, Rect::new(0, 7, 4, 7)), img);
        assert_eq!(strip_delete(&img, Rect::new(0, 30, 4, 40)), img);
    }

    #[test]
    fn whole_image_band_is_a_no_op() {
        let img = striped(20);
        assert_eq!(strip_delete(&img, Rect::new(0, -5, 4, 25)), img);
    }
}
