// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text detection backed by `ocrs`, a pure-Rust OCR engine running neural
// network models through `rten`.
//
// # Feature Gate
//
// Only compiled with the `ocr` feature:
//
// ```toml
// retusche-imaging = { path = "crates/retusche-imaging", features = ["ocr"] }
// ```
//
// # Models
//
// Two model files are needed: `text-detection.rten` locates words and
// `text-recognition.rten` reads the characters of each line. Running
// `ocrs-cli` once downloads both into `$XDG_CACHE_HOME/ocrs` (typically
// `~/.cache/ocrs`), which is the default location searched here.
//
// The engine should be built in release mode; debug builds of `rten` are
// very slow.

use std::path::{Path, PathBuf};

use ocrs::{ImageSource, OcrEngine, OcrEngineParams, TextItem};
use retusche_core::error::{Result, RetuscheError};
use retusche_core::{OcrResult, Rect, TextBox};
use rten::Model;
use tracing::{debug, info, instrument};

use super::TextDetector;
use crate::raster::Image;

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// `ocrs` reports no per-line score.
const LINE_CONFIDENCE: f32 = 1.0;

/// `$XDG_CACHE_HOME/ocrs`, else `~/.cache/ocrs`, else `./ocrs-models`.
pub fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Where to load the two model files from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrConfig {
    /// Both models from one directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// `from_dir(dir)` when given, otherwise the default cache directory.
    pub fn from_optional_dir(dir: Option<&Path>) -> Self {
        dir.map(Self::from_dir).unwrap_or_default()
    }

    /// Report the first missing model file.
    pub fn validate(&self) -> Result<()> {
        for (kind, path) in [
            ("detection", &self.detection_model_path),
            ("recognition", &self.recognition_model_path),
        ] {
            if !path.exists() {
                return Err(RetuscheError::DetectorUnavailable(format!(
                    "{kind} model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// [`TextDetector`] running the `ocrs` pipeline: word detection, line
/// grouping, then recognition per line.
pub struct OcrsDetector {
    engine: OcrEngine,
}

impl std::fmt::Debug for OcrsDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrsDetector").finish_non_exhaustive()
    }
}

impl OcrsDetector {
    /// Load both models. This is the expensive step; build once and reuse.
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: &OcrConfig) -> Result<Self> {
        config.validate()?;

        let load = |path: &Path, kind: &str| {
            info!(kind, "Loading OCR model");
            Model::load_file(path).map_err(|err| {
                RetuscheError::DetectorUnavailable(format!(
                    "failed to load {kind} model from {}: {err}",
                    path.display()
                ))
            })
        };
        let detection_model = load(&config.detection_model_path, "detection")?;
        let recognition_model = load(&config.recognition_model_path, "recognition")?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| RetuscheError::DetectorUnavailable(format!("failed to initialise OCR engine: {err}")))?;

        info!("OCR engine initialised");
        Ok(Self { engine })
    }
}

impl TextDetector for OcrsDetector {
    fn is_available(&self) -> bool {
        true
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn detect(&self, image: &Image) -> Result<Vec<OcrResult>> {
        let rgb = image.as_rgb();
        let source = ImageSource::from_bytes(rgb.as_raw(), rgb.dimensions()).map_err(|err| {
            RetuscheError::DetectionFailed(format!(
                "failed to create image source ({}x{}): {err}",
                rgb.width(),
                rgb.height()
            ))
        })?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| RetuscheError::DetectionFailed(format!("OCR preprocessing failed: {err}")))?;

        let words = self
            .engine
            .detect_words(&input)
            .map_err(|err| RetuscheError::DetectionFailed(format!("word detection failed: {err}")))?;
        let lines = self.engine.find_text_lines(&input, &words);
        debug!(words = words.len(), lines = lines.len(), "Text lines found");

        let recognised = self
            .engine
            .recognize_text(&input, &lines)
            .map_err(|err| RetuscheError::DetectionFailed(format!("line recognition failed: {err}")))?;

        let results: Vec<OcrResult> = recognised
            .iter()
            .flatten()
            .filter_map(|line| {
                let text = line.to_string();
                if text.trim().is_empty() {
                    return None;
                }
                let r = line.bounding_rect();
                let rect = Rect::new(r.left() as i32, r.top() as i32, r.right() as i32, r.bottom() as i32);
                Some(OcrResult::new(text.trim(), TextBox::from_rect(rect), LINE_CONFIDENCE))
            })
            .collect();

        info!(lines = results.len(), "Text detection complete");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_dir_uses_well_known_names() {
        let config = OcrConfig::from_dir("/tmp/models");
        assert_eq!(config.detection_model_path, PathBuf::from("/tmp/models/text-detection.rten"));
        assert_eq!(config.recognition_model_path, PathBuf::from("/tmp/models/text-recognition.rten"));
    }

    #[test]
    fn default_config_ends_with_model_names() {
        let config = OcrConfig::default();
        assert!(config.detection_model_path.ends_with(DETECTION_MODEL_FILENAME));
        assert!(config.recognition_model_path.ends_with(RECOGNITION_MODEL_FILENAME));
    }

    #[test]
    fn missing_models_are_unavailable_not_failed() {
        let dir = tempfile::tempdir().unwrap();
        let config = OcrConfig::from_dir(dir.path());
        assert!(matches!(config.validate(), Err(RetuscheError::DetectorUnavailable(_))));
        assert!(matches!(OcrsDetector::new(&config), Err(RetuscheError::DetectorUnavailable(_))));
    }
}
