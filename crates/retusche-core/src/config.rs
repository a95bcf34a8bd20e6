// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editor configuration and its JSON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RetuscheError};

/// File name of the persisted configuration inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Persistent editor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo snapshots kept.
    pub max_history: usize,
    /// A selection counts only when both extents exceed this many pixels.
    pub min_selection_extent: i32,
    /// JPEG (and lossy WebP) quality used when saving, 1-100.
    pub jpeg_quality: u8,
    /// Extra font directories searched before the platform defaults.
    pub font_dirs: Vec<PathBuf>,
    /// Directory holding the OCR models; `None` uses the ocrs cache dir.
    pub ocr_model_dir: Option<PathBuf>,
    /// Reject degenerate explicit regions instead of treating them as no-ops.
    pub strict_geometry: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history: 20,
            min_selection_extent: 5,
            jpeg_quality: 95,
            font_dirs: Vec::new(),
            ocr_model_dir: None,
            strict_geometry: false,
        }
    }
}

impl EditorConfig {
    /// Load `config.json` from `dir`. A missing file yields defaults; a file
    /// that exists but can't be read or parsed is a `Config` error.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(RetuscheError::Config(format!("{} is unreadable: {err}", path.display())));
            }
        };
        serde_json::from_str(&data)
            .map_err(|err| RetuscheError::Config(format!("{} is malformed: {err}", path.display())))
    }

    /// [`EditorConfig::load`], with defaults on any error.
    pub fn load_or_default(dir: &Path) -> Self {
        Self::load(dir).unwrap_or_default()
    }

    /// Write `config.json` into `dir`.
    pub fn persist(&self, dir: &Path) -> Result<()> {
        let path = dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(())
    }
}
