// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Retusche — headless runner for JSON edit scripts.
//
//     retusche <script.json>
//
// Loads the configuration from the data directory, runs every step and
// prints the step report as JSON.

use std::process::ExitCode;
use std::sync::Arc;

use retusche_core::EditorConfig;
use retusche_core::human_errors::humanize_error;
use retusche_editor::{EditScript, EditSession, EditorController, data_dir};
use retusche_imaging::TextDetector;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let Some(script_path) = std::env::args_os().nth(1) else {
        eprintln!("usage: retusche <script.json>");
        return ExitCode::from(2);
    };

    tracing::info!("Retusche starting");
    let config = data_dir::load_config(&data_dir::data_dir());
    let detector = build_detector(&config);
    let session = EditSession::new(EditorController::new(config), detector);

    let result = match EditScript::from_path(&script_path) {
        Ok(script) => script.run(&session).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(report) => {
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{json}"),
                Err(err) => tracing::warn!(error = %err, "could not render report"),
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            let human = humanize_error(&err);
            tracing::error!(error = %err, "script failed");
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "ocr")]
fn build_detector(config: &EditorConfig) -> Arc<dyn TextDetector> {
    use retusche_imaging::{OcrConfig, OcrsDetector, UnavailableDetector};

    let ocr = OcrConfig::from_optional_dir(config.ocr_model_dir.as_deref());
    match OcrsDetector::new(&ocr) {
        Ok(detector) => Arc::new(detector),
        Err(err) => {
            tracing::warn!(error = %err, "text detection disabled");
            Arc::new(UnavailableDetector::new(err.to_string()))
        }
    }
}

#[cfg(not(feature = "ocr"))]
fn build_detector(_config: &EditorConfig) -> Arc<dyn TextDetector> {
    Arc::new(retusche_imaging::UnavailableDetector::new(
        "built without the `ocr` feature",
    ))
}
