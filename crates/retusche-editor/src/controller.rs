// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editor controller — turns user intents into transform-then-commit steps.
//
// The controller exclusively owns the live image. Every successful edit
// records its result in the history, so the base of the next edit is always
// the entry under the history cursor and redo restores the newest state.
// A revision counter moves on every change of the live image; detection
// results computed against an older revision are refused as stale.

use std::path::{Path, PathBuf};

use retusche_core::error::{Result, RetuscheError};
use retusche_core::{EditorConfig, FillMode, FontFeatures, FontParams, OcrResult, Point, Rect, TextBox};
use retusche_imaging::raster::io::{ImageInfo, image_info};
use retusche_imaging::{
    FontLookup, FontMatch, Image, SystemFonts, TextCompositor, fill, load_image, save_image, strip_delete,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::history::HistoryStore;
use crate::selection::SelectionModel;

/// Snapshot of editor state for status display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorStatus {
    pub image: Option<ImageInfo>,
    pub path: Option<PathBuf>,
    pub selection: Option<Rect>,
    pub detected_texts: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub history_len: usize,
    pub revision: u64,
}

/// What a detection job needs: the selected region cut out of the live
/// image, where it came from, and the revision it belongs to.
#[derive(Debug, Clone)]
pub struct DetectionRequest {
    pub rect: Rect,
    pub region: Image,
    pub revision: u64,
}

impl DetectionRequest {
    /// Top-left corner of the region in image coordinates.
    pub fn origin(&self) -> Point {
        Point::new(self.rect.x1, self.rect.y1)
    }
}

/// Rendering parameters proposed for replacing a detected line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSuggestion {
    /// Features sampled from the line before anything is removed.
    pub features: FontFeatures,
    pub font: FontMatch,
    /// Ready-to-edit parameters combining both.
    pub params: FontParams,
}

pub struct EditorController<L = SystemFonts> {
    config: EditorConfig,
    image: Option<Image>,
    original: Option<Image>,
    path: Option<PathBuf>,
    selection: SelectionModel,
    history: HistoryStore,
    detected: Vec<OcrResult>,
    compositor: TextCompositor<L>,
    revision: u64,
}

impl<L> std::fmt::Debug for EditorController<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorController")
            .field("image", &self.image)
            .field("path", &self.path)
            .field("selection", &self.selection.rect())
            .field("history_len", &self.history.len())
            .field("detected", &self.detected.len())
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl EditorController<SystemFonts> {
    /// Controller using the system fonts plus `config.font_dirs`.
    pub fn new(config: EditorConfig) -> Self {
        let fonts = SystemFonts::new(config.font_dirs.clone());
        Self::with_fonts(config, fonts)
    }
}

impl<L: FontLookup> EditorController<L> {
    pub fn with_fonts(config: EditorConfig, fonts: L) -> Self {
        Self {
            selection: SelectionModel::new(config.min_selection_extent),
            history: HistoryStore::new(config.max_history),
            compositor: TextCompositor::new(fonts),
            config,
            image: None,
            original: None,
            path: None,
            detected: Vec::new(),
            revision: 0,
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionModel {
        &mut self.selection
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// The current detected-text working set.
    pub fn detected(&self) -> &[OcrResult] {
        &self.detected
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn status(&self) -> EditorStatus {
        EditorStatus {
            image: self.image.as_ref().map(image_info),
            path: self.path.clone(),
            selection: self.selection.rect(),
            detected_texts: self.detected.len(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            history_len: self.history.len(),
            revision: self.revision,
        }
    }

    fn current(&self) -> Result<&Image> {
        self.image.as_ref().ok_or(RetuscheError::NoImageLoaded)
    }

    /// The selection clamped to the image, if it is large enough to count.
    fn selected_rect(&mut self) -> Result<Rect> {
        let (w, h) = self.current()?.dimensions();
        self.selection.valid_rect(w, h).ok_or(RetuscheError::NoSelection)
    }

    /// Make `result` the live image and record it. A transform that
    /// returned its input unchanged commits nothing.
    fn commit(&mut self, result: Image) -> bool {
        if self.image.as_ref().is_some_and(|cur| cur.shares_storage_with(&result)) {
            debug!("Edit was a no-op; nothing committed");
            return false;
        }
        self.history.save_state(&result);
        self.image = Some(result);
        self.revision += 1;
        true
    }

    /// Replace the live image without touching history (undo / redo).
    fn restore(&mut self, image: Image) {
        self.image = Some(image);
        self.revision += 1;
    }

    // -- Files ----------------------------------------------------------------

    /// Load an image file and start a new timeline from it.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<ImageInfo> {
        let image = load_image(path.as_ref())?;
        let info = self.load(image);
        self.path = Some(path.as_ref().to_path_buf());
        Ok(info)
    }

    /// Start a new timeline from `image`. Clears the selection, the
    /// detected texts and any file association.
    pub fn load(&mut self, image: Image) -> ImageInfo {
        let info = image_info(&image);
        self.original = Some(image.deep_copy());
        self.history.reset(&image);
        self.image = Some(image);
        self.path = None;
        self.selection.clear();
        self.detected.clear();
        self.revision += 1;
        info!(width = info.width, height = info.height, "Image loaded into editor");
        info
    }

    /// Save to `path`, or to the path the image was opened from / last
    /// saved to. Uses the configured JPEG quality.
    pub fn save(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        let quality = self.config.jpeg_quality;
        self.save_with_quality(path, quality)
    }

    pub fn save_with_quality(&mut self, path: Option<&Path>, quality: u8) -> Result<PathBuf> {
        let image = self.current()?;
        let target = path
            .map(Path::to_path_buf)
            .or_else(|| self.path.clone())
            .ok_or(RetuscheError::NoOutputPath)?;
        let written = save_image(image, &target, quality)?;
        self.path = Some(written.clone());
        Ok(written)
    }

    /// Go back to the image as it was loaded, discarding the timeline.
    pub fn reset_to_original(&mut self) -> Result<()> {
        let original = self.original.as_ref().ok_or(RetuscheError::NoImageLoaded)?.deep_copy();
        self.history.reset(&original);
        self.image = Some(original);
        self.selection.clear();
        self.detected.clear();
        self.revision += 1;
        info!("Reset to original image");
        Ok(())
    }

    // -- History --------------------------------------------------------------

    /// Step back one edit. `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        self.current()?;
        match self.history.undo() {
            Some(image) => {
                self.restore(image);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Step forward one edit. `Ok(false)` when there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool> {
        self.current()?;
        match self.history.redo() {
            Some(image) => {
                self.restore(image);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // -- Region edits ---------------------------------------------------------

    /// Remove the selected row band and close the gap.
    pub fn strip_delete_selection(&mut self) -> Result<bool> {
        let rect = self.selected_rect()?;
        let result = strip_delete(self.current()?, rect);
        let changed = self.commit(result);
        self.selection.clear();
        Ok(changed)
    }

    pub fn fill_selection(&mut self, mode: FillMode) -> Result<bool> {
        let rect = self.selected_rect()?;
        let result = fill(self.current()?, rect, mode);
        let changed = self.commit(result);
        self.selection.clear();
        Ok(changed)
    }

    /// Strip-delete an explicit band. Degenerate bands are a no-op, or
    /// `InvalidGeometry` with `strict_geometry`.
    pub fn strip_region(&mut self, rect: Rect) -> Result<bool> {
        let image = self.current()?;
        let band = Rect::new(0, rect.y1, image.width() as i32, rect.y2);
        self.check_geometry(band, rect)?;
        let result = strip_delete(image, rect);
        Ok(self.commit(result))
    }

    /// Fill an explicit rectangle. Degenerate rectangles are a no-op, or
    /// `InvalidGeometry` with `strict_geometry`.
    pub fn fill_region(&mut self, rect: Rect, mode: FillMode) -> Result<bool> {
        self.check_geometry(rect, rect)?;
        let result = fill(self.current()?, rect, mode);
        Ok(self.commit(result))
    }

    fn check_geometry(&self, effective: Rect, requested: Rect) -> Result<()> {
        let (w, h) = self.current()?.dimensions();
        if self.config.strict_geometry && effective.clamp_to(w, h).is_empty() {
            warn!(%requested, "Rejected degenerate region");
            return Err(RetuscheError::InvalidGeometry(requested));
        }
        Ok(())
    }

    // -- Detection ------------------------------------------------------------

    /// Cut out the selection for a detection job.
    pub fn detection_request(&mut self) -> Result<DetectionRequest> {
        let rect = self.selected_rect()?;
        let region = self.current()?.crop(rect);
        Ok(DetectionRequest {
            rect,
            region,
            revision: self.revision,
        })
    }

    /// Store detection results (already in image coordinates) as the working
    /// set. Returns `false` and stores nothing when the image has changed
    /// since `revision`.
    pub fn accept_detection(&mut self, revision: u64, results: Vec<OcrResult>) -> bool {
        if revision != self.revision {
            warn!(revision, current = self.revision, "Discarding stale detection results");
            return false;
        }
        info!(count = results.len(), "Detected text stored");
        self.detected = results;
        true
    }

    // -- Text edits -----------------------------------------------------------

    /// Detected entries lying entirely inside the selection.
    pub fn texts_in_selection(&mut self) -> Result<Vec<OcrResult>> {
        self.current()?;
        if self.detected.is_empty() {
            return Err(RetuscheError::NoDetectedText);
        }
        let rect = self.selected_rect()?;
        let inside: Vec<OcrResult> = self
            .detected
            .iter()
            .filter(|r| rect.contains_rect(&r.bbox.bounds()))
            .cloned()
            .collect();
        if inside.is_empty() {
            return Err(RetuscheError::NoTextInSelection);
        }
        Ok(inside)
    }

    /// Remove the given lines in one pass. Only those lines leave the
    /// detected set. Returns how many were removed: 0 when every box lies
    /// outside the image and nothing was committed.
    pub fn delete_texts(&mut self, entries: &[OcrResult]) -> Result<usize> {
        let image = self.current()?;
        if entries.is_empty() {
            return Err(RetuscheError::NoTextChosen);
        }
        let boxes: Vec<TextBox> = entries.iter().map(|e| e.bbox).collect();
        let result = self.compositor.delete_text(image, &boxes);
        let changed = self.commit(result);
        self.selection.clear();
        self.detected.retain(|r| !boxes.contains(&r.bbox));
        if !changed {
            debug!(count = entries.len(), "No chosen text lies on the image");
            return Ok(0);
        }
        info!(count = entries.len(), remaining = self.detected.len(), "Texts deleted");
        Ok(entries.len())
    }

    pub fn delete_texts_in_selection(&mut self) -> Result<usize> {
        let entries = self.texts_in_selection()?;
        self.delete_texts(&entries)
    }

    /// Features and face for replacing `entry`, sampled before any removal.
    pub fn suggest_font_params(&mut self, entry: &OcrResult, new_text: Option<&str>) -> Result<FontSuggestion> {
        let image = self.image.as_ref().ok_or(RetuscheError::NoImageLoaded)?;
        let (features, font) = self
            .compositor
            .suggest(image, &entry.bbox, new_text.unwrap_or(&entry.text));
        let params = FontParams {
            font_path: font.path.clone(),
            font_name: font.name.clone(),
            font_size: Some(font.font_size),
            font_color: Some(features.font_color),
        };
        Ok(FontSuggestion { features, font, params })
    }

    /// Replace the line `entry` with `text`. Clears the detected set.
    pub fn replace_text(&mut self, entry: &OcrResult, text: &str, params: Option<&FontParams>) -> Result<bool> {
        let image = self.image.as_ref().ok_or(RetuscheError::NoImageLoaded)?;
        if text.trim().is_empty() {
            return Err(RetuscheError::EmptyText);
        }
        let result = self.compositor.replace_text(image, &entry.bbox, text, params);
        let changed = self.commit(result);
        self.selection.clear();
        self.detected.clear();
        info!(old = %entry.text, new = %text, "Text replaced");
        Ok(changed)
    }

    /// Draw `text` centred in the selection. Clears the detected set.
    pub fn add_text_in_selection(&mut self, text: &str, params: Option<&FontParams>) -> Result<bool> {
        self.current()?;
        if text.trim().is_empty() {
            return Err(RetuscheError::EmptyText);
        }
        let rect = self.selected_rect()?;
        let image = self.image.as_ref().ok_or(RetuscheError::NoImageLoaded)?;
        let result = self.compositor.add_text(
            image,
            &TextBox::from_rect(rect),
            text,
            params,
            None,
        );
        let changed = self.commit(result);
        self.selection.clear();
        self.detected.clear();
        Ok(changed)
    }
}
