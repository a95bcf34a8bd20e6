// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON edit scripts: a headless sequence of editor steps.
//
// ```json
// {
//   "input": "scan.png",
//   "output": "scan-clean.png",
//   "steps": [
//     { "op": "select", "rect": [40, 20, 300, 60] },
//     { "op": "detect" },
//     { "op": "replace_text", "target": "Draft", "text": "Final" },
//     { "op": "fill", "rect": [0, 400, 120, 440], "mode": "median" },
//     { "op": "undo" }
//   ]
// }
// ```
//
// Relative paths are resolved against the script's directory.

use std::path::{Path, PathBuf};

use retusche_core::error::{Result, RetuscheError};
use retusche_core::{FillMode, FontParams, OcrResult, Rect, Rgb, TextBox};
use retusche_imaging::FontLookup;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::session::{DetectionOutcome, EditSession};

fn default_fill_mode() -> String {
    FillMode::Inpaint.name().to_string()
}

/// One scripted editor action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditStep {
    Select {
        rect: Rect,
    },
    /// Strip `rect`'s rows, or the selection's.
    Strip {
        #[serde(default)]
        rect: Option<Rect>,
    },
    /// Fill `rect`, or the selection. Unknown modes leave the image as is.
    Fill {
        #[serde(default)]
        rect: Option<Rect>,
        #[serde(default = "default_fill_mode")]
        mode: String,
        #[serde(default)]
        color: Option<Rgb>,
    },
    /// Detect text in the selection.
    Detect,
    /// Remove explicit boxes, or every detected line inside the selection.
    DeleteText {
        #[serde(default)]
        boxes: Option<Vec<Rect>>,
    },
    /// Replace one line. `bbox` names the box directly; otherwise the
    /// detected line in the selection whose text is `target` (or the first
    /// one) is used.
    ReplaceText {
        #[serde(default)]
        bbox: Option<Rect>,
        #[serde(default)]
        target: Option<String>,
        text: String,
        #[serde(default)]
        params: Option<FontParams>,
    },
    AddText {
        text: String,
        #[serde(default)]
        params: Option<FontParams>,
    },
    Undo,
    Redo,
    Reset,
}

impl EditStep {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Select { .. } => "select",
            Self::Strip { .. } => "strip",
            Self::Fill { .. } => "fill",
            Self::Detect => "detect",
            Self::DeleteText { .. } => "delete_text",
            Self::ReplaceText { .. } => "replace_text",
            Self::AddText { .. } => "add_text",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Reset => "reset",
        }
    }
}

/// A parsed edit script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditScript {
    pub input: PathBuf,
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Save quality; the configured `jpeg_quality` when absent.
    #[serde(default)]
    pub quality: Option<u8>,
    #[serde(default)]
    pub steps: Vec<EditStep>,
}

/// What a step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub op: &'static str,
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl StepReport {
    fn new(op: &'static str, changed: bool) -> Self {
        Self { op, changed, detail: None }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptReport {
    pub output: PathBuf,
    pub steps: Vec<StepReport>,
}

/// `dir/name-edited.ext` for an input `dir/name.ext`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
    let ext = input.extension().and_then(|s| s.to_str()).unwrap_or("png");
    input.with_file_name(format!("{stem}-edited.{ext}"))
}

impl EditScript {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a script file and resolve its paths against its directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let script = Self::from_json(&json)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(script.resolved_against(base))
    }

    pub fn resolved_against(mut self, base: &Path) -> Self {
        let resolve = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };
        self.input = resolve(self.input);
        self.output = self.output.map(resolve);
        self
    }

    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| default_output_path(&self.input))
    }

    /// Open the input, run every step in order and save the result.
    /// Stops at the first failing step.
    #[instrument(skip_all, fields(input = %self.input.display(), steps = self.steps.len()))]
    pub async fn run<L: FontLookup + 'static>(&self, session: &EditSession<L>) -> Result<ScriptReport> {
        let input = self.input.clone();
        session.apply(move |c| c.open(&input)).await?;

        let mut reports = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.iter().enumerate() {
            let report = run_step(session, step.clone()).await.inspect_err(|err| {
                warn!(index, op = step.name(), error = %err, "Script step failed");
            })?;
            reports.push(report);
        }

        let output = self.output_path();
        let quality = self.quality;
        let written = session
            .apply(move |c| match quality {
                Some(q) => c.save_with_quality(Some(output.as_path()), q),
                None => c.save(Some(output.as_path())),
            })
            .await?;
        info!(output = %written.display(), "Script finished");
        Ok(ScriptReport {
            output: written,
            steps: reports,
        })
    }
}

async fn run_step<L: FontLookup + 'static>(session: &EditSession<L>, step: EditStep) -> Result<StepReport> {
    let op = step.name();
    let report = match step {
        EditStep::Select { rect } => {
            session
                .apply(move |c| {
                    c.selection_mut().set(rect);
                    Ok(())
                })
                .await?;
            StepReport::new(op, false)
        }
        EditStep::Strip { rect } => {
            let changed = session
                .apply(move |c| match rect {
                    Some(rect) => c.strip_region(rect),
                    None => c.strip_delete_selection(),
                })
                .await?;
            StepReport::new(op, changed)
        }
        EditStep::Fill { rect, mode, color } => match FillMode::from_name(&mode, color) {
            Some(mode) => {
                let changed = session
                    .apply(move |c| match rect {
                        Some(rect) => c.fill_region(rect, mode),
                        None => c.fill_selection(mode),
                    })
                    .await?;
                StepReport::new(op, changed)
            }
            None => {
                warn!(%mode, "Unknown fill mode, image left unchanged");
                StepReport::new(op, false).with_detail(format!("unknown fill mode '{mode}'"))
            }
        },
        EditStep::Detect => {
            let job = session.start_detection().await?;
            match session.finish_detection(job).await {
                DetectionOutcome::Found(lines) => {
                    StepReport::new(op, false).with_detail(format!("{} line(s) found", lines.len()))
                }
                DetectionOutcome::NothingFound => StepReport::new(op, false).with_detail("no text found"),
                DetectionOutcome::Failed(message) => return Err(RetuscheError::DetectionFailed(message)),
                DetectionOutcome::Cancelled => StepReport::new(op, false).with_detail("cancelled"),
                DetectionOutcome::Stale => StepReport::new(op, false).with_detail("image changed during detection"),
            }
        }
        EditStep::DeleteText { boxes } => {
            let count = session
                .apply(move |c| match boxes {
                    Some(boxes) => {
                        let entries: Vec<OcrResult> = boxes
                            .into_iter()
                            .map(|r| OcrResult::new("", TextBox::from_rect(r), 1.0))
                            .collect();
                        c.delete_texts(&entries)
                    }
                    None => c.delete_texts_in_selection(),
                })
                .await?;
            StepReport::new(op, count > 0).with_detail(format!("{count} line(s) removed"))
        }
        EditStep::ReplaceText {
            bbox,
            target,
            text,
            params,
        } => {
            let changed = session
                .apply(move |c| {
                    let entry = match bbox {
                        Some(rect) => OcrResult::new("", TextBox::from_rect(rect), 1.0),
                        None => {
                            let candidates = c.texts_in_selection()?;
                            candidates
                                .into_iter()
                                .find(|e| target.as_deref().is_none_or(|t| e.text == t))
                                .ok_or(RetuscheError::NoTextInSelection)?
                        }
                    };
                    c.replace_text(&entry, &text, params.as_ref())
                })
                .await?;
            StepReport::new(op, changed)
        }
        EditStep::AddText { text, params } => {
            let changed = session
                .apply(move |c| c.add_text_in_selection(&text, params.as_ref()))
                .await?;
            StepReport::new(op, changed)
        }
        EditStep::Undo => StepReport::new(op, session.apply(|c| c.undo()).await?),
        EditStep::Redo => StepReport::new(op, session.apply(|c| c.redo()).await?),
        EditStep::Reset => {
            session.apply(|c| c.reset_to_original()).await?;
            StepReport::new(op, true)
        }
    };
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use retusche_core::EditorConfig;
    use retusche_imaging::{Image, TextDetector, UnavailableDetector, load_image, save_image};

    use crate::controller::EditorController;
    use crate::controller::tests::NoFonts;

    fn session(detector: Arc<dyn TextDetector>) -> EditSession<NoFonts> {
        EditSession::new(EditorController::with_fonts(EditorConfig::default(), NoFonts), detector)
    }

    /// 100x100 white image with a black bar at rows 40..50.
    fn write_input(dir: &Path) -> PathBuf {
        let mut buf = Image::filled(100, 100, Rgb::WHITE).to_buffer();
        for y in 40..50 {
            for x in 10..90 {
                buf.put_pixel(x, y, image::Rgb([0, 0, 0]));
            }
        }
        let path = dir.join("input.png");
        save_image(&Image::from_buffer(buf), &path, 95).unwrap();
        path
    }

    struct OneLine;

    impl TextDetector for OneLine {
        fn is_available(&self) -> bool {
            true
        }

        fn detect(&self, _image: &Image) -> Result<Vec<OcrResult>> {
            // Region coordinates; the selection below starts at (0, 30).
            Ok(vec![OcrResult::new("Draft", TextBox::from_rect(Rect::new(10, 10, 90, 20)), 1.0)])
        }
    }

    #[test]
    fn steps_parse_with_defaults() {
        let script = EditScript::from_json(
            r#"{
                "input": "a.png",
                "steps": [
                    { "op": "select", "rect": [90, 40, 10, 10] },
                    { "op": "fill" },
                    { "op": "fill", "rect": [0, 0, 5, 5], "mode": "color", "color": [255, 0, 0] },
                    { "op": "replace_text", "text": "New" },
                    { "op": "undo" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(script.output, None);
        assert_eq!(script.steps[0], EditStep::Select { rect: Rect::new(10, 10, 90, 40) });
        assert_eq!(
            script.steps[1],
            EditStep::Fill {
                rect: None,
                mode: "inpaint".into(),
                color: None
            }
        );
        assert!(matches!(&script.steps[2], EditStep::Fill { color: Some(c), .. } if *c == Rgb::new(255, 0, 0)));
        assert!(matches!(&script.steps[3], EditStep::ReplaceText { bbox: None, target: None, .. }));
        assert_eq!(script.steps[4].name(), "undo");
    }

    #[test]
    fn unknown_op_is_rejected() {
        let err = EditScript::from_json(r#"{ "input": "a.png", "steps": [{ "op": "rotate" }] }"#).unwrap_err();
        assert!(matches!(err, RetuscheError::Serialization(_)));
    }

    #[test]
    fn paths_resolve_against_script_dir() {
        let dir = tempfile::tempdir().unwrap();
        let script_path = dir.path().join("edit.json");
        std::fs::write(&script_path, r#"{ "input": "in/photo.jpg", "output": "/abs/out.png" }"#).unwrap();
        let script = EditScript::from_path(&script_path).unwrap();
        assert_eq!(script.input, dir.path().join("in/photo.jpg"));
        assert_eq!(script.output_path(), PathBuf::from("/abs/out.png"));

        let script = EditScript {
            output: None,
            ..script
        };
        assert_eq!(script.output_path(), dir.path().join("in/photo-edited.jpg"));
    }

    #[tokio::test]
    async fn strip_fill_undo_redo_then_save() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path());
        let script = EditScript {
            input,
            output: None,
            quality: None,
            steps: vec![
                EditStep::Strip {
                    rect: Some(Rect::new(0, 40, 100, 50)),
                },
                EditStep::Fill {
                    rect: Some(Rect::new(0, 0, 10, 10)),
                    mode: "color".into(),
                    color: Some(Rgb::BLACK),
                },
                EditStep::Undo,
                EditStep::Redo,
                EditStep::Fill {
                    rect: Some(Rect::new(0, 0, 10, 10)),
                    mode: "sparkle".into(),
                    color: None,
                },
            ],
        };

        let report = script.run(&session(Arc::new(UnavailableDetector::default()))).await.unwrap();
        assert_eq!(report.output, dir.path().join("input-edited.png"));
        let changed: Vec<bool> = report.steps.iter().map(|s| s.changed).collect();
        assert_eq!(changed, [true, true, true, true, false]);
        assert!(report.steps[4].detail.as_deref().unwrap().contains("sparkle"));

        let out = load_image(&report.output).unwrap();
        assert_eq!(out.dimensions(), (100, 90), "the stripped band is gone");
        assert_eq!(out.pixel(5, 5), Rgb::BLACK, "redo restored the fill");
        assert_eq!(out.pixel(50, 45), Rgb::WHITE, "the bar was in the stripped band");
    }

    #[tokio::test]
    async fn detect_then_delete_in_selection() {
        let dir = tempfile::tempdir().unwrap();
        let script = EditScript {
            input: write_input(dir.path()),
            output: Some(dir.path().join("out.png")),
            quality: None,
            steps: vec![
                EditStep::Select {
                    rect: Rect::new(0, 30, 100, 70),
                },
                EditStep::Detect,
                EditStep::Select {
                    rect: Rect::new(0, 30, 100, 70),
                },
                EditStep::DeleteText { boxes: None },
            ],
        };

        let report = script.run(&session(Arc::new(OneLine))).await.unwrap();
        assert_eq!(report.steps[1].detail.as_deref(), Some("1 line(s) found"));
        assert!(report.steps[3].changed);

        let out = load_image(&report.output).unwrap();
        assert_eq!(out.dimensions(), (100, 100));
        assert!(out.pixel(50, 45).r > 200, "the bar was inpainted away");
    }

    #[tokio::test]
    async fn deleting_boxes_off_the_image_reports_no_change() {
        let dir = tempfile::tempdir().unwrap();
        let script = EditScript {
            input: write_input(dir.path()),
            output: Some(dir.path().join("out.png")),
            quality: None,
            steps: vec![
                EditStep::DeleteText {
                    boxes: Some(vec![Rect::new(200, 200, 260, 220)]),
                },
                EditStep::DeleteText {
                    boxes: Some(vec![Rect::new(10, 40, 90, 50)]),
                },
            ],
        };
        let report = script.run(&session(Arc::new(UnavailableDetector::default()))).await.unwrap();
        assert!(!report.steps[0].changed);
        assert_eq!(report.steps[0].detail.as_deref(), Some("0 line(s) removed"));
        assert!(report.steps[1].changed);
    }

    #[tokio::test]
    async fn detection_without_engine_stops_the_script() {
        let dir = tempfile::tempdir().unwrap();
        let script = EditScript {
            input: write_input(dir.path()),
            output: Some(dir.path().join("out.png")),
            quality: None,
            steps: vec![
                EditStep::Select {
                    rect: Rect::new(0, 0, 50, 50),
                },
                EditStep::Detect,
            ],
        };
        let err = script
            .run(&session(Arc::new(UnavailableDetector::default())))
            .await
            .unwrap_err();
        assert!(matches!(err, RetuscheError::DetectorUnavailable(_)));
        assert!(!dir.path().join("out.png").exists(), "nothing is saved after a failed step");
    }

    #[tokio::test]
    async fn replace_without_detection_is_a_precondition_error() {
        let dir = tempfile::tempdir().unwrap();
        let script = EditScript {
            input: write_input(dir.path()),
            output: None,
            quality: None,
            steps: vec![
                EditStep::Select {
                    rect: Rect::new(0, 0, 50, 50),
                },
                EditStep::ReplaceText {
                    bbox: None,
                    target: None,
                    text: "New".into(),
                    params: None,
                },
            ],
        };
        let err = script
            .run(&session(Arc::new(UnavailableDetector::default())))
            .await
            .unwrap_err();
        assert!(matches!(err, RetuscheError::NoDetectedText));
    }
}
