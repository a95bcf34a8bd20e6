// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the editor shell.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the shell presents it (status bar vs. dialog).

use crate::error::RetuscheError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Worth trying again as-is.
    Transient,
    /// The user must do something first (open an image, select a region).
    ActionRequired,
    /// Retrying will not help.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether repeating the same action may succeed.
    pub retriable: bool,
    pub severity: Severity,
}

impl HumanError {
    fn new(message: &str, suggestion: impl Into<String>, retriable: bool, severity: Severity) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
            retriable,
            severity,
        }
    }
}

/// Convert a `RetuscheError` into a `HumanError` for display.
pub fn humanize_error(err: &RetuscheError) -> HumanError {
    use Severity::*;

    match err {
        // -- Preconditions --
        RetuscheError::NoImageLoaded => HumanError::new(
            "No image is open.",
            "Open an image first.",
            false,
            ActionRequired,
        ),
        RetuscheError::NoSelection => HumanError::new(
            "No region is selected.",
            "Drag a rectangle over the part of the image you want to change. Very small selections are ignored.",
            false,
            ActionRequired,
        ),
        RetuscheError::EmptyText => HumanError::new(
            "The new text is empty.",
            "Type the replacement text, or use Delete Text to remove it instead.",
            false,
            ActionRequired,
        ),
        RetuscheError::NoDetectedText => HumanError::new(
            "There is no recognised text to work with.",
            "Select a region containing text and run Recognise Text first.",
            false,
            ActionRequired,
        ),
        RetuscheError::NoTextInSelection => HumanError::new(
            "No recognised text lies inside the selection.",
            "Make the selection larger so it fully covers the text, or recognise the text again.",
            false,
            ActionRequired,
        ),
        RetuscheError::NoTextChosen => HumanError::new(
            "No text was chosen.",
            "Pick at least one recognised line.",
            false,
            ActionRequired,
        ),
        RetuscheError::NoOutputPath => HumanError::new(
            "There's nowhere to save the image yet.",
            "Choose a file name with Save As.",
            false,
            ActionRequired,
        ),
        RetuscheError::InvalidGeometry(rect) => HumanError::new(
            "The selected region is empty.",
            format!("The region {rect} has no area inside the image. Select a larger region."),
            false,
            ActionRequired,
        ),

        // -- Images and fonts --
        RetuscheError::ImageError(_) => HumanError::new(
            "There's a problem with this image.",
            "The image may be damaged or in an unusual format. Try saving it as a PNG or JPEG first.",
            false,
            Permanent,
        ),
        RetuscheError::UnsupportedFormat(ext) => HumanError::new(
            "This image format isn't supported.",
            format!("Use JPEG, PNG, BMP, GIF, WebP or TIFF. (Got: {ext})"),
            false,
            Permanent,
        ),
        RetuscheError::FontError(_) => HumanError::new(
            "The chosen font couldn't be loaded.",
            "A default font was used instead. Pick another font if the result looks wrong.",
            false,
            Permanent,
        ),

        // -- Text detection --
        RetuscheError::DetectorUnavailable(detail) => HumanError::new(
            "Text recognition isn't available.",
            format!("Install the recognition models and restart. ({detail})"),
            false,
            ActionRequired,
        ),
        RetuscheError::DetectionFailed(detail) => HumanError::new(
            "Text recognition failed.",
            format!("Try again with a tighter selection around the text. ({detail})"),
            true,
            Transient,
        ),
        RetuscheError::Worker(_) => HumanError::new(
            "A background task stopped unexpectedly.",
            "Try the action again. Your image has not been changed.",
            true,
            Transient,
        ),

        // -- Storage --
        RetuscheError::Config(_) => HumanError::new(
            "The settings couldn't be read.",
            "Default settings are being used.",
            false,
            Permanent,
        ),
        RetuscheError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError::new(
                "The file couldn't be found.",
                "It may have been moved or deleted. Try choosing the file again.",
                false,
                ActionRequired,
            ),
            std::io::ErrorKind::PermissionDenied => HumanError::new(
                "The editor doesn't have permission to use that file.",
                "Check the file permissions, or save to a different folder.",
                false,
                ActionRequired,
            ),
            _ => HumanError::new(
                "There was a problem reading or writing a file.",
                "Try again. If this keeps happening, your disk may be full.",
                true,
                Transient,
            ),
        },
        RetuscheError::Serialization(_) => HumanError::new(
            "The editor had an internal data problem.",
            "Check the file contents and try again.",
            false,
            Permanent,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rect;

    #[test]
    fn missing_selection_is_action_required() {
        let human = humanize_error(&RetuscheError::NoSelection);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn detection_failure_is_retriable() {
        let human = humanize_error(&RetuscheError::DetectionFailed("model crashed".into()));
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
        assert!(human.suggestion.contains("model crashed"));
    }

    #[test]
    fn unavailable_detector_differs_from_failure() {
        let unavailable = humanize_error(&RetuscheError::DetectorUnavailable("no models".into()));
        let failed = humanize_error(&RetuscheError::DetectionFailed("boom".into()));
        assert_ne!(unavailable.message, failed.message);
        assert!(!unavailable.retriable);
    }

    #[test]
    fn invalid_geometry_names_the_region() {
        let human = humanize_error(&RetuscheError::InvalidGeometry(Rect::new(3, 3, 3, 9)));
        assert!(human.suggestion.contains("(3, 3, 3, 9)"));
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = RetuscheError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }
}
