// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Font-feature inference — estimate size, colour, weight and spacing of the
// text inside a region so replacement text can match it.

use imageproc::edges::canny;
use retusche_core::{FontFeatures, TextBox};
use tracing::{debug, instrument};

use crate::raster::Image;
use crate::stats::{channel_mean, channel_median};

/// Pixels whose channel sum is below this count as glyph strokes.
const DARK_SUM_THRESHOLD: u32 = 600;

/// Canny hysteresis thresholds.
const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;

/// Edge density above which the text is considered bold.
const BOLD_EDGE_DENSITY: f64 = 0.1;

const MIN_FONT_SIZE: u32 = 12;

/// Sample the region bounded by `bbox` and infer rendering parameters.
///
/// An empty region (zero area after clamping) yields
/// [`FontFeatures::default`].
#[instrument(skip(image), fields(bounds = %bbox.bounds()))]
pub fn extract_font_features(image: &Image, bbox: &TextBox) -> FontFeatures {
    let rect = bbox.bounds().clamp_to(image.width(), image.height());
    if rect.is_empty() {
        debug!("Empty sample region; using default features");
        return FontFeatures::default();
    }

    let region = image.crop(rect);
    let pixels: Vec<[u8; 3]> = region.as_rgb().pixels().map(|p| p.0).collect();

    let dark: Vec<[u8; 3]> = pixels
        .iter()
        .copied()
        .filter(|px| px.iter().map(|&c| u32::from(c)).sum::<u32>() < DARK_SUM_THRESHOLD)
        .collect();
    let font_color = channel_median(&dark)
        .or_else(|| channel_mean(&pixels))
        .unwrap_or(FontFeatures::default().font_color);

    let gray = image::imageops::grayscale(region.as_rgb());
    let edges = canny(&gray, CANNY_LOW, CANNY_HIGH);
    let edge_count = edges.pixels().filter(|p| p.0[0] > 0).count();
    let density = edge_count as f64 / pixels.len() as f64;

    let features = FontFeatures {
        font_size: MIN_FONT_SIZE.max((0.8 * f64::from(rect.height())).round() as u32),
        font_color,
        is_bold: density > BOLD_EDGE_DENSITY,
        char_spacing: (0.05 * f64::from(rect.width())).round().max(0.0) as u32,
        source_bbox: Some(rect),
    };
    debug!(
        font_size = features.font_size,
        is_bold = features.is_bold,
        density,
        dark_pixels = dark.len(),
        "Font features inferred"
    );
    features
}
