// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text-detection oracle interface.
//
// A detector takes an image (usually a cropped selection) and reports each
// line of text with its polygon in that image's coordinates. "Not
// available" is an error; "ran and found nothing" is an empty list.

#[cfg(feature = "ocr")]
pub mod ocr;

use retusche_core::error::{Result, RetuscheError};
use retusche_core::OcrResult;

use crate::raster::Image;

/// A black-box text detector.
pub trait TextDetector: Send + Sync {
    /// Whether [`detect`](Self::detect) can succeed at all.
    fn is_available(&self) -> bool;

    fn detect(&self, image: &Image) -> Result<Vec<OcrResult>>;
}

/// Stand-in used when no detection engine is configured.
#[derive(Debug, Clone)]
pub struct UnavailableDetector {
    reason: String,
}

impl UnavailableDetector {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl Default for UnavailableDetector {
    fn default() -> Self {
        Self::new("no text detection engine is configured")
    }
}

impl TextDetector for UnavailableDetector {
    fn is_available(&self) -> bool {
        false
    }

    fn detect(&self, _image: &Image) -> Result<Vec<OcrResult>> {
        Err(RetuscheError::DetectorUnavailable(self.reason.clone()))
    }
}

impl<T: TextDetector + ?Sized> TextDetector for std::sync::Arc<T> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn detect(&self, image: &Image) -> Result<Vec<OcrResult>> {
        (**self).detect(image)
    }
}
