// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text compositing: remove detected text by inpainting, draw replacement or
// new text centred in a box.

use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, PxScale};
use imageproc::drawing::{draw_text_mut, text_size};
use retusche_core::error::{Result, RetuscheError};
use retusche_core::{FontFeatures, FontParams, Rect, Rgb, TextBox};
use tracing::{debug, info, instrument, warn};

use super::builtin;
use super::features::extract_font_features;
use super::fonts::{FontLookup, FontMatch, FontMatcher};
use crate::raster::Image;
use crate::region::inpaint::{INPAINT_RADIUS, inpaint_rects};

/// Extra margin around each text box when building the removal mask.
pub const DELETE_PADDING: i32 = 2;

/// Upper bound for a requested font size, in pixels.
pub const MAX_FONT_SIZE: u32 = u16::MAX as u32;

/// Largest size that can still put ink on `image`: twice its longer side,
/// never above [`MAX_FONT_SIZE`].
fn font_size_limit(image: &Image) -> u32 {
    image
        .width()
        .max(image.height())
        .saturating_mul(2)
        .clamp(1, MAX_FONT_SIZE)
}

/// A loaded rendering face.
enum Face {
    Outline(FontArc),
    Builtin,
}

impl Face {
    fn measure(&self, text: &str, size: u32) -> (u32, u32) {
        match self {
            Face::Outline(font) => text_size(PxScale::from(size as f32), font, text),
            Face::Builtin => builtin::measure(text, size),
        }
    }

    fn draw(&self, canvas: &mut image::RgbImage, text: &str, x: i32, y: i32, size: u32, color: Rgb) {
        match self {
            Face::Outline(font) => draw_text_mut(
                canvas,
                image::Rgb(color.channels()),
                x,
                y,
                PxScale::from(size as f32),
                font,
                text,
            ),
            Face::Builtin => builtin::draw(canvas, text, x, y, size, color),
        }
    }
}

/// Read and parse an outline font file.
fn load_outline(path: &Path) -> Result<FontArc> {
    let bytes = std::fs::read(path)
        .map_err(|err| RetuscheError::FontError(format!("{} is unreadable: {err}", path.display())))?;
    FontArc::try_from_vec(bytes)
        .map_err(|err| RetuscheError::FontError(format!("{} could not be parsed: {err}", path.display())))
}

/// [`load_outline`], logging the failure.
fn try_outline(path: &Path) -> Option<FontArc> {
    load_outline(path)
        .inspect_err(|err| warn!(error = %err, "Skipping font"))
        .ok()
}

/// Remove every box in one inpainting pass. Each box's bounds are clamped,
/// skipped if empty, then padded by [`DELETE_PADDING`].
#[instrument(skip(image, boxes), fields(count = boxes.len()))]
pub fn delete_text(image: &Image, boxes: &[TextBox]) -> Image {
    let rects: Vec<Rect> = boxes
        .iter()
        .map(|tb| tb.bounds().clamp_to(image.width(), image.height()))
        .filter(|r| !r.is_empty())
        .map(|r| r.expand(DELETE_PADDING))
        .collect();
    if rects.is_empty() {
        debug!("No text regions to remove");
        return image.clone();
    }
    let out = inpaint_rects(image, &rects, INPAINT_RADIUS);
    info!(regions = rects.len(), "Text removed");
    out
}

/// Draws text with faces chosen through a [`FontMatcher`].
#[derive(Debug)]
pub struct TextCompositor<L> {
    matcher: FontMatcher<L>,
}

impl<L: FontLookup> TextCompositor<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            matcher: FontMatcher::new(lookup),
        }
    }

    pub fn matcher(&self) -> &FontMatcher<L> {
        &self.matcher
    }

    pub fn delete_text(&self, image: &Image, boxes: &[TextBox]) -> Image {
        delete_text(image, boxes)
    }

    /// Features sampled from `bbox` and the face that would be used to
    /// render `text` with them.
    pub fn suggest(&mut self, image: &Image, bbox: &TextBox, text: &str) -> (FontFeatures, FontMatch) {
        let features = extract_font_features(image, bbox);
        let matched = self.matcher.match_font(&features, text);
        (features, matched)
    }

    /// Remove the text in `old`, then draw `text` centred in its bounds.
    ///
    /// Features are sampled from the image after removal. Fields left unset
    /// in `params` are taken from those features.
    #[instrument(skip(self, image, params), fields(bounds = %old.bounds(), chars = text.chars().count()))]
    pub fn replace_text(
        &mut self,
        image: &Image,
        old: &TextBox,
        text: &str,
        params: Option<&FontParams>,
    ) -> Image {
        if text.is_empty() {
            return image.clone();
        }
        let cleaned = delete_text(image, std::slice::from_ref(old));
        let features = extract_font_features(&cleaned, old);
        self.add_text(&cleaned, old, text, params, Some(&features))
    }

    /// Draw `text` centred in `target` without removing anything first.
    ///
    /// Size and colour come from `params`, else `features`, else defaults.
    /// The face is taken from an explicit path, else a named font, else the
    /// best match for `features`.
    #[instrument(skip(self, image, params, features), fields(bounds = %target.bounds(), chars = text.chars().count()))]
    pub fn add_text(
        &mut self,
        image: &Image,
        target: &TextBox,
        text: &str,
        params: Option<&FontParams>,
        features: Option<&FontFeatures>,
    ) -> Image {
        if text.is_empty() {
            return image.clone();
        }
        let defaults = FontFeatures::default();
        let features = features.unwrap_or(&defaults);
        let params = params.cloned().unwrap_or_default();

        let requested = params.font_size.unwrap_or(features.font_size);
        let size = requested.clamp(1, font_size_limit(image));
        if size != requested {
            debug!(requested, size, "Font size clamped");
        }
        let color = params.font_color.unwrap_or(features.font_color);
        let path = self.pick_font_path(&params, features, text);
        let face = self.load_face(path.as_deref());

        let (w, h) = face.measure(text, size);
        let center = target.bounds().center();
        let half = |extent: u32| i32::try_from(extent / 2).unwrap_or(i32::MAX);
        let x = center.x.saturating_sub(half(w));
        let y = center.y.saturating_sub(half(h));

        let mut canvas = image.to_buffer();
        face.draw(&mut canvas, text, x, y, size, color);
        debug!(x, y, w, h, size, builtin = matches!(face, Face::Builtin), "Text drawn");
        Image::from_buffer(canvas)
    }

    fn pick_font_path(&mut self, params: &FontParams, features: &FontFeatures, text: &str) -> Option<PathBuf> {
        if let Some(path) = &params.font_path {
            return Some(path.clone());
        }
        if let Some(name) = &params.font_name {
            if let Some(path) = self.matcher.resolve_named(name) {
                return Some(path);
            }
            debug!(font = %name, "Named font not found; matching by features");
        }
        self.matcher.match_font(features, text).path
    }

    /// Load `path`, else a generic system default, else the built-in face.
    fn load_face(&mut self, path: Option<&Path>) -> Face {
        if let Some(font) = path.filter(|p| p.exists()).and_then(try_outline) {
            return Face::Outline(font);
        }
        if let Some(font) = self.matcher.generic_default().as_deref().and_then(try_outline) {
            return Face::Outline(font);
        }
        debug!("Using built-in bitmap face");
        Face::Builtin
    }
}
