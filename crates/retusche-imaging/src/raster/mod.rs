// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster module — the immutable RGB image value and its file I/O.

pub mod io;

use std::sync::Arc;

use image::{DynamicImage, RgbImage};
use retusche_core::{Rect, Rgb};

/// An immutable RGB8 image.
///
/// There is no way to mutate pixels through an `Image`: transforms borrow
/// one, copy its pixels into a fresh buffer with [`Image::to_buffer`], edit
/// that, and wrap the result with [`Image::from_buffer`]. Clones share the
/// pixel storage, which is sound because nothing can write to it.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    pixels: Arc<RgbImage>,
}

impl Image {
    // -- Construction ---------------------------------------------------------

    /// Wrap an owned RGB buffer.
    pub fn from_buffer(buffer: RgbImage) -> Self {
        Self {
            pixels: Arc::new(buffer),
        }
    }

    /// Convert any decoded image to RGB8.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self::from_buffer(image.to_rgb8())
    }

    /// A `width` x `height` image of a single colour.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        Self::from_buffer(RgbImage::from_pixel(width, height, image::Rgb(color.channels())))
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Colour at `(x, y)`. Panics when out of bounds, like `RgbImage`.
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        Rgb::from(self.pixels.get_pixel(x, y).0)
    }

    /// Borrow the pixel buffer for reading.
    pub fn as_rgb(&self) -> &RgbImage {
        &self.pixels
    }

    /// The whole image as a rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width() as i32, self.height() as i32)
    }

    // -- Copies ---------------------------------------------------------------

    /// A freshly allocated, mutable copy of the pixels.
    pub fn to_buffer(&self) -> RgbImage {
        self.pixels.as_ref().clone()
    }

    /// An `Image` backed by its own pixel storage, sharing nothing with
    /// `self`.
    pub fn deep_copy(&self) -> Self {
        Self::from_buffer(self.to_buffer())
    }

    /// Whether two values share pixel storage.
    pub fn shares_storage_with(&self, other: &Image) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }

    /// Copy out a region. `rect` is clamped; an empty region yields a 0x0 image.
    pub fn crop(&self, rect: Rect) -> Self {
        let r = rect.clamp_to(self.width(), self.height());
        if r.is_empty() {
            return Self::from_buffer(RgbImage::new(0, 0));
        }
        let view = image::imageops::crop_imm(
            self.as_rgb(),
            r.x1 as u32,
            r.y1 as u32,
            r.width() as u32,
            r.height() as u32,
        );
        Self::from_buffer(view.to_image())
    }
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl From<RgbImage> for Image {
    fn from(buffer: RgbImage) -> Self {
        Self::from_buffer(buffer)
    }
}
