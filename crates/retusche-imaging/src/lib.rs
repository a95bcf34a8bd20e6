// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// retusche-imaging — The region transform engine.
//
// Provides the immutable `Image` value and file I/O, region transforms
// (strip delete with reflow, area fill, content-aware inpainting), text
// handling (font-feature inference, font matching, text delete / replace /
// add) and the text-detection oracle interface.

pub mod detect;
pub mod raster;
pub mod region;
pub mod text;

mod stats;

// Re-export the primary items so callers can use `retusche_imaging::Image` etc.
pub use detect::{TextDetector, UnavailableDetector};
pub use raster::Image;
pub use raster::io::{load_image, save_image};
pub use region::fill::{fill, fill_named};
pub use region::strip::strip_delete;
pub use text::compose::{TextCompositor, delete_text};
pub use text::features::extract_font_features;
pub use text::fonts::{FontCache, FontLookup, FontMatch, FontMatcher, SystemFonts};

#[cfg(feature = "ocr")]
pub use detect::ocr::{OcrConfig, OcrsDetector};
