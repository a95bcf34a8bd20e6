// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Retusche.

use thiserror::Error;

use crate::types::Rect;

/// Top-level error type for all Retusche operations.
///
/// Region transforms never produce these: they are total and fall back to
/// an unmodified copy. Only resource, oracle, I/O and precondition failures
/// surface here.
#[derive(Debug, Error)]
pub enum RetuscheError {
    // -- Image errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid region {0}")]
    InvalidGeometry(Rect),

    // -- Font errors --
    #[error("font could not be loaded: {0}")]
    FontError(String),

    // -- Text detection --
    #[error("text detection unavailable: {0}")]
    DetectorUnavailable(String),

    #[error("text detection failed: {0}")]
    DetectionFailed(String),

    #[error("background worker failed: {0}")]
    Worker(String),

    // -- Editor preconditions --
    #[error("no image loaded")]
    NoImageLoaded,

    #[error("no region selected")]
    NoSelection,

    #[error("replacement text is empty")]
    EmptyText,

    #[error("no detected text available")]
    NoDetectedText,

    #[error("no detected text inside the selected region")]
    NoTextInSelection,

    #[error("no text entries chosen")]
    NoTextChosen,

    #[error("no output path given")]
    NoOutputPath,

    // -- Storage / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RetuscheError>;
