// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::path::{Path, PathBuf};

use retusche_core::EditorConfig;
use tracing::{debug, warn};

const APP_DIR: &str = "retusche";

/// Return the application data directory, creating it if needed.
pub fn data_dir() -> PathBuf {
    let dir = resolve_data_dir(
        std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    );
    if let Err(err) = std::fs::create_dir_all(&dir) {
        warn!(dir = %dir.display(), error = %err, "could not create data directory");
    }
    dir
}

/// `$XDG_DATA_HOME/retusche`, else `~/.local/share/retusche`, else a
/// directory under the system temp dir.
pub fn resolve_data_dir(xdg_data_home: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    let base = match (xdg_data_home, home) {
        (Some(xdg), _) if !xdg.as_os_str().is_empty() => xdg,
        (_, Some(home)) if !home.as_os_str().is_empty() => home.join(".local").join("share"),
        _ => std::env::temp_dir(),
    };
    base.join(APP_DIR)
}

/// Configuration stored in `dir`, or defaults. A malformed file is logged
/// and ignored.
pub fn load_config(dir: &Path) -> EditorConfig {
    let config = EditorConfig::load(dir).unwrap_or_else(|err| {
        warn!(error = %err, "using default configuration");
        EditorConfig::default()
    });
    debug!(dir = %dir.display(), max_history = config.max_history, "configuration loaded");
    config
}
