// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// retusche-editor — Interactive editing state on top of the transform engine.
//
// `SelectionModel` and `HistoryStore` hold the user-facing state,
// `EditorController` sequences transforms and commits, `EditSession` runs
// them off the caller's task, and `EditScript` drives all of it headlessly.

pub mod controller;
pub mod data_dir;
pub mod history;
pub mod script;
pub mod selection;
pub mod session;

pub use controller::{DetectionRequest, EditorController, EditorStatus, FontSuggestion};
pub use history::HistoryStore;
pub use script::{EditScript, EditStep, ScriptReport};
pub use selection::SelectionModel;
pub use session::{CancelHandle, DetectionJob, DetectionOutcome, EditSession};
