// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text module — font-feature inference, font lookup and matching, and text
// compositing.

mod builtin;
pub mod compose;
pub mod features;
pub mod fonts;

pub use compose::{TextCompositor, delete_text};
pub use features::extract_font_features;
pub use fonts::{FontCache, FontLookup, FontMatch, FontMatcher, SystemFonts};
