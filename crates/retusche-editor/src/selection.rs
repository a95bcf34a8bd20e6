// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rubber-band selection in image-pixel coordinates.
//
// Pointer input is untrusted (negative or past the image edge while
// dragging), so nothing here rejects input: rectangles are normalised and
// clamped, and `is_valid` decides whether the result counts.

use retusche_core::{Point, Rect};

/// Default minimum extent, in pixels, for a selection to count.
pub const DEFAULT_MIN_EXTENT: i32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionModel {
    anchor: Option<Point>,
    rect: Option<Rect>,
    active: bool,
    min_extent: i32,
}

impl Default for SelectionModel {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_EXTENT)
    }
}

impl SelectionModel {
    pub fn new(min_extent: i32) -> Self {
        Self {
            anchor: None,
            rect: None,
            active: false,
            min_extent,
        }
    }

    /// Begin a drag at `(x, y)`, discarding any previous rectangle.
    pub fn start(&mut self, x: i32, y: i32) {
        self.anchor = Some(Point::new(x, y));
        self.rect = None;
        self.active = true;
    }

    /// Span the rectangle from the drag start to `(x, y)`. Ignored when no
    /// drag is active.
    pub fn update(&mut self, x: i32, y: i32) {
        if let (true, Some(anchor)) = (self.active, self.anchor) {
            self.rect = Some(Rect::spanning(anchor, Point::new(x, y)));
        }
    }

    /// Final `update`, then end the drag.
    pub fn end(&mut self, x: i32, y: i32) {
        if self.active {
            self.update(x, y);
            self.active = false;
        }
    }

    /// Replace the selection outright (keyboard or scripted input).
    pub fn set(&mut self, rect: Rect) {
        self.anchor = None;
        self.rect = Some(Rect::new(rect.x1, rect.y1, rect.x2, rect.y2));
        self.active = false;
    }

    pub fn clear(&mut self) {
        self.anchor = None;
        self.rect = None;
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    /// True when both extents exceed the minimum.
    pub fn is_valid(&self) -> bool {
        self.rect
            .is_some_and(|r| r.width() > self.min_extent && r.height() > self.min_extent)
    }

    /// Clamp the rectangle into `[0, width] x [0, height]`.
    pub fn normalize(&mut self, width: u32, height: u32) {
        if let Some(r) = self.rect {
            self.rect = Some(r.clamp_to(width, height));
        }
    }

    /// Clamp to the image and return the rectangle if it then counts.
    pub fn valid_rect(&mut self, width: u32, height: u32) -> Option<Rect> {
        self.normalize(width, height);
        self.is_valid().then_some(self.rect).flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_direction_does_not_matter() {
        let mut s = SelectionModel::default();
        s.start(80, 60);
        s.update(30, 90);
        assert_eq!(s.rect(), Some(Rect::new(30, 60, 80, 90)));
        s.end(10, 10);
        assert_eq!(s.rect(), Some(Rect { x1: 10, y1: 10, x2: 80, y2: 60 }));
        assert!(!s.is_active());
    }

    #[test]
    fn start_clears_previous_rectangle() {
        let mut s = SelectionModel::default();
        s.set(Rect::new(0, 0, 50, 50));
        s.start(5, 5);
        assert_eq!(s.rect(), None);
    }

    #[test]
    fn update_without_start_is_ignored() {
        let mut s = SelectionModel::default();
        s.update(10, 10);
        s.end(20, 20);
        assert_eq!(s.rect(), None);
    }

    #[test]
    fn tiny_selections_are_not_valid() {
        let mut s = SelectionModel::default();
        s.set(Rect::new(10, 10, 15, 40));
        assert!(!s.is_valid(), "width of exactly 5 does not count");
        assert_eq!(s.valid_rect(100, 100), None);
        s.set(Rect::new(10, 10, 16, 16));
        assert!(s.is_valid());
        assert_eq!(s.valid_rect(100, 100), Some(Rect::new(10, 10, 16, 16)));
    }

    #[test]
    fn normalize_clamps_out_of_range_drag() {
        let mut s = SelectionModel::default();
        s.start(-20, -5);
        s.end(500, 70);
        s.normalize(100, 50);
        assert_eq!(s.rect(), Some(Rect::new(0, 0, 100, 50)));
    }

    #[test]
    fn valid_rect_rejects_selection_mostly_outside_image() {
        let mut s = SelectionModel::default();
        s.set(Rect::new(97, 10, 140, 40));
        assert_eq!(s.valid_rect(100, 100), None, "only 3 px remain inside");
        s.set(Rect::new(10, 10, 90, 40));
        assert_eq!(s.valid_rect(100, 100), Some(Rect::new(10, 10, 90, 40)));
    }

    #[test]
    fn clear_resets_everything() {
        let mut s = SelectionModel::new(2);
        s.start(1, 1);
        s.update(9, 9);
        s.clear();
        assert_eq!(s, SelectionModel::new(2));
    }
}
