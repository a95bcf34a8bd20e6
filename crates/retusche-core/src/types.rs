// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Retusche: pixel-space geometry, colours, font
// descriptions, detection results and fill policies.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A point in image-pixel space. Pointer input may be negative or beyond the
/// image while dragging, so coordinates are signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle `(x1, y1, x2, y2)`, half-open on the far edges.
///
/// Constructors normalise so that `x1 <= x2` and `y1 <= y2`. A rectangle may
/// be degenerate (zero width or height); transforms treat that as a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    /// Build a rectangle from two opposite corners in any order.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Bounding box of two points, independent of drag direction.
    pub fn spanning(a: Point, b: Point) -> Self {
        Self::new(a.x, a.y, b.x, b.y)
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// True when the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.x1 >= self.x2 || self.y1 >= self.y2
    }

    /// Clamp all four coordinates into `[0, width] x [0, height]`.
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let w = i32::try_from(width).unwrap_or(i32::MAX);
        let h = i32::try_from(height).unwrap_or(i32::MAX);
        Self {
            x1: self.x1.clamp(0, w),
            y1: self.y1.clamp(0, h),
            x2: self.x2.clamp(0, w),
            y2: self.y2.clamp(0, h),
        }
    }

    /// Grow by `padding` pixels on every side (not clamped).
    pub fn expand(&self, padding: i32) -> Self {
        Self {
            x1: self.x1 - padding,
            y1: self.y1 - padding,
            x2: self.x2 + padding,
            y2: self.y2 + padding,
        }
    }

    /// Whether `other` lies entirely within this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x1 >= self.x1 && other.y1 >= self.y1 && other.x2 <= self.x2 && other.y2 <= self.y2
    }

    /// Whether pixel `(x, y)` lies inside the half-open rectangle.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x < self.x2 && y >= self.y1 && y < self.y2
    }

    /// Integer centre, rounding towards negative infinity.
    pub fn center(&self) -> Point {
        Point::new(
            (self.x1 + self.x2).div_euclid(2),
            (self.y1 + self.y2).div_euclid(2),
        )
    }
}

impl From<[i32; 4]> for Rect {
    fn from([x1, y1, x2, y2]: [i32; 4]) -> Self {
        Self::new(x1, y1, x2, y2)
    }
}

impl From<Rect> for [i32; 4] {
    fn from(rect: Rect) -> Self {
        [rect.x1, rect.y1, rect.x2, rect.y2]
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Four-corner text polygon as reported by the detection oracle.
///
/// Producers currently emit axis-aligned boxes, but consumers only ever rely
/// on [`TextBox::bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[[i32; 2]; 4]", into = "[[i32; 2]; 4]")]
pub struct TextBox {
    pub corners: [Point; 4],
}

impl TextBox {
    pub fn new(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    /// Clockwise polygon for an axis-aligned rectangle, starting top-left.
    pub fn from_rect(rect: Rect) -> Self {
        Self::new([
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x2, rect.y1),
            Point::new(rect.x2, rect.y2),
            Point::new(rect.x1, rect.y2),
        ])
    }

    /// Axis-aligned bounding box (not clamped).
    pub fn bounds(&self) -> Rect {
        let xs = self.corners.map(|p| p.x);
        let ys = self.corners.map(|p| p.y);
        // Arrays of four are never empty; the fallbacks are unreachable.
        Rect {
            x1: xs.iter().copied().min().unwrap_or(0),
            y1: ys.iter().copied().min().unwrap_or(0),
            x2: xs.iter().copied().max().unwrap_or(0),
            y2: ys.iter().copied().max().unwrap_or(0),
        }
    }

    /// Translate every corner, e.g. from region to image coordinates.
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.corners.map(|p| Point::new(p.x + dx, p.y + dy)))
    }
}

impl From<[[i32; 2]; 4]> for TextBox {
    fn from(raw: [[i32; 2]; 4]) -> Self {
        Self::new(raw.map(|[x, y]| Point::new(x, y)))
    }
}

impl From<TextBox> for [[i32; 2]; 4] {
    fn from(tb: TextBox) -> Self {
        tb.corners.map(|p| [p.x, p.y])
    }
}

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        c.channels()
    }
}

/// Rendering parameters inferred from an existing text region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontFeatures {
    pub font_size: u32,
    pub font_color: Rgb,
    pub is_bold: bool,
    pub char_spacing: u32,
    /// The clamped rectangle that was sampled, `None` for the defaults.
    pub source_bbox: Option<Rect>,
}

impl Default for FontFeatures {
    fn default() -> Self {
        Self {
            font_size: 24,
            font_color: Rgb::BLACK,
            is_bold: false,
            char_spacing: 2,
            source_bbox: None,
        }
    }
}

/// Caller-supplied rendering overrides. Every field is optional; unset
/// fields fall back to inferred features.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontParams {
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    #[serde(default)]
    pub font_name: Option<String>,
    #[serde(default)]
    pub font_size: Option<u32>,
    #[serde(default)]
    pub font_color: Option<Rgb>,
}

/// One detected line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    pub text: String,
    pub bbox: TextBox,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f32,
}

impl OcrResult {
    pub fn new(text: impl Into<String>, bbox: TextBox, confidence: f32) -> Self {
        Self {
            text: text.into(),
            bbox,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Area fill policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "color", rename_all = "lowercase")]
pub enum FillMode {
    /// Content-aware reconstruction from the surrounding pixels.
    #[default]
    Inpaint,
    /// Per-channel mean of the one-pixel border.
    Average,
    /// Per-channel median of the one-pixel border.
    Median,
    /// Uniform colour.
    Color(Rgb),
}

impl FillMode {
    /// Parse a mode keyword. `"color"` without an explicit colour fills
    /// white. Unknown keywords yield `None`.
    pub fn from_name(name: &str, color: Option<Rgb>) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "inpaint" => Some(Self::Inpaint),
            "average" => Some(Self::Average),
            "median" => Some(Self::Median),
            "color" | "colour" => Some(Self::Color(color.unwrap_or(Rgb::WHITE))),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Inpaint => "inpaint",
            Self::Average => "average",
            Self::Median => "median",
            Self::Color(_) => "color",
        }
    }
}
