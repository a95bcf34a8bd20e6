// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bounded linear undo/redo history of whole-image snapshots.

use std::collections::VecDeque;

use retusche_imaging::Image;
use tracing::debug;

/// A linear timeline `[e0..eN]` with a cursor.
///
/// Every snapshot is stored as a deep copy and handed out as a deep copy,
/// so no entry ever shares pixels with the live image or with another
/// entry. Saving while the cursor is behind the newest entry discards the
/// redo branch. Once more than `max_history` entries exist the oldest is
/// dropped.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: VecDeque<Image>,
    cursor: usize,
    max_history: usize,
}

impl HistoryStore {
    /// `max_history` below 1 is treated as 1.
    pub fn new(max_history: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            max_history: max_history.max(1),
        }
    }

    /// Record `image` as the newest state and move the cursor onto it.
    pub fn save_state(&mut self, image: &Image) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(image.deep_copy());
        while self.entries.len() > self.max_history {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
        debug!(len = self.entries.len(), cursor = self.cursor, "History state saved");
    }

    /// Step back one entry and return it, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<Image> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.current_state()
    }

    /// Step forward one entry and return it, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<Image> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.current_state()
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.cursor + 1 < self.entries.len()
    }

    /// Copy of the entry under the cursor.
    pub fn current_state(&self) -> Option<Image> {
        self.entries.get(self.cursor).map(Image::deep_copy)
    }

    /// Start a fresh timeline holding only `image`.
    pub fn reset(&mut self, image: &Image) {
        self.clear();
        self.save_state(image);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the current entry; meaningless while empty.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }
}
