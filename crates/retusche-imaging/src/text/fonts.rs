// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Font discovery and matching.
//
// `FontLookup` is the seam to the platform: it lists font names and turns a
// name into a file. `FontMatcher` picks a face for a piece of text from the
// inferred features and memoises name resolution in an explicit
// `FontCache`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use retusche_core::FontFeatures;
use tracing::{debug, instrument, trace};

/// Extensions listed as available fonts.
const LISTED_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

/// Extensions a name can resolve to. Collections are listed but not loaded.
const LOADABLE_EXTENSIONS: &[&str] = &["ttf", "otf"];

/// Names tried when no face was chosen for the text.
pub const GENERIC_DEFAULT_FONTS: &[&str] = &["Arial", "DejaVuSans"];

/// Source of installed fonts.
pub trait FontLookup: Send + Sync {
    /// Path of a loadable font file matching `name`, if any.
    fn resolve_font_path(&self, name: &str) -> Option<PathBuf>;

    /// Installed font names. The order decides the "first available"
    /// fallback.
    fn list_available_fonts(&self) -> Vec<String>;
}

// ---------------------------------------------------------------------------
// System fonts
// ---------------------------------------------------------------------------

/// Fonts found by walking font directories on disk.
#[derive(Debug, Clone)]
pub struct SystemFonts {
    dirs: Vec<PathBuf>,
}

impl SystemFonts {
    /// Search `extra_dirs` first, then the platform font directories.
    pub fn new(extra_dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut dirs: Vec<PathBuf> = extra_dirs.into_iter().collect();
        dirs.extend(platform_font_dirs());
        Self { dirs }
    }

    /// Search only `dirs`.
    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Every font file below the configured directories, in walk order.
    fn font_files(&self, extensions: &[&str]) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for dir in &self.dirs {
            walk(dir, extensions, &mut files);
        }
        files
    }
}

impl Default for SystemFonts {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FontLookup for SystemFonts {
    fn resolve_font_path(&self, name: &str) -> Option<PathBuf> {
        let needle = name.to_lowercase();
        self.font_files(LOADABLE_EXTENSIONS).into_iter().find(|path| {
            path.file_name()
                .and_then(|f| f.to_str())
                .is_some_and(|f| f.to_lowercase().contains(&needle))
        })
    }

    fn list_available_fonts(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .font_files(LISTED_EXTENSIONS)
            .iter()
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_owned))
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

fn platform_font_dirs() -> Vec<PathBuf> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    if cfg!(target_os = "windows") {
        let windir = std::env::var_os("WINDIR").unwrap_or_else(|| "C:\\Windows".into());
        vec![PathBuf::from(windir).join("Fonts")]
    } else if cfg!(target_os = "macos") {
        let mut dirs = vec![
            PathBuf::from("/System/Library/Fonts"),
            PathBuf::from("/Library/Fonts"),
        ];
        dirs.extend(home.map(|h| h.join("Library").join("Fonts")));
        dirs
    } else {
        let mut dirs = vec![
            PathBuf::from("/usr/share/fonts"),
            PathBuf::from("/usr/local/share/fonts"),
        ];
        dirs.extend(home.map(|h| h.join(".fonts")));
        dirs
    }
}

/// Recursively collect files under `dir` with one of `extensions`.
/// Unreadable directories are skipped.
fn walk(dir: &Path, extensions: &[&str], out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    let mut entries: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    entries.sort();
    for path in entries {
        if path.is_dir() {
            walk(&path, extensions, out);
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.contains(&e.to_ascii_lowercase().as_str()))
        {
            out.push(path);
        }
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Name → path memo. `None` records a name known not to resolve.
#[derive(Debug, Default, Clone)]
pub struct FontCache {
    entries: HashMap<String, Option<PathBuf>>,
}

impl FontCache {
    pub fn get(&self, name: &str) -> Option<&Option<PathBuf>> {
        self.entries.get(name)
    }

    pub fn insert(&mut self, name: &str, path: Option<PathBuf>) {
        self.entries.insert(name.to_owned(), path);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The face chosen for a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontMatch {
    /// Chosen font name; `None` when no font is installed at all.
    pub name: Option<String>,
    /// Resolved file; `None` means render with a fallback face.
    pub path: Option<PathBuf>,
    pub font_size: u32,
}

/// Whether `text` contains a CJK unified ideograph (U+4E00..=U+9FFF).
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(|c| ('\u{4E00}'..='\u{9FFF}').contains(&c))
}

/// Preference list for the script and weight, most preferred first.
pub fn preferred_fonts(cjk: bool, bold: bool) -> Vec<&'static str> {
    let (bold_first, base): (&[&str], &[&str]) = if cjk {
        (
            &["SimHei", "Microsoft YaHei", "KaiTi"],
            &["SimHei", "Microsoft YaHei", "SimSun", "KaiTi"],
        )
    } else {
        (
            &["Arial Bold", "Times New Roman Bold"],
            &["Arial", "Times New Roman", "Calibri", "Courier New"],
        )
    };
    let mut list = Vec::with_capacity(bold_first.len() + base.len());
    if bold {
        list.extend_from_slice(bold_first);
    }
    list.extend_from_slice(base);
    list
}

/// Chooses faces through a [`FontLookup`], caching name resolution.
#[derive(Debug)]
pub struct FontMatcher<L> {
    lookup: L,
    cache: FontCache,
}

impl<L: FontLookup> FontMatcher<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            cache: FontCache::default(),
        }
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn cache(&self) -> &FontCache {
        &self.cache
    }

    /// Pick a face for `text` from the preference list, else the first
    /// installed font, and resolve it to a file.
    #[instrument(skip(self, features), fields(bold = features.is_bold, size = features.font_size))]
    pub fn match_font(&mut self, features: &FontFeatures, text: &str) -> FontMatch {
        let available = self.lookup.list_available_fonts();
        let preferred = preferred_fonts(contains_cjk(text), features.is_bold);

        let chosen = preferred
            .iter()
            .find_map(|want| available.iter().find(|have| have.eq_ignore_ascii_case(want)))
            .or_else(|| available.first())
            .cloned();

        let Some(name) = chosen else {
            debug!("No fonts installed; caller falls back to the built-in face");
            return FontMatch {
                name: None,
                path: None,
                font_size: features.font_size,
            };
        };

        let path = self.resolve_named(&name);
        debug!(font = %name, resolved = path.is_some(), "Font matched");
        FontMatch {
            name: Some(name),
            path,
            font_size: features.font_size,
        }
    }

    /// Resolve a font name to a file, consulting the cache first.
    pub fn resolve_named(&mut self, name: &str) -> Option<PathBuf> {
        if let Some(hit) = self.cache.get(name) {
            trace!(font = name, "Font cache hit");
            return hit.clone();
        }
        let path = self.lookup.resolve_font_path(name);
        self.cache.insert(name, path.clone());
        path
    }

    /// First generic default that resolves, if any.
    pub fn generic_default(&mut self) -> Option<PathBuf> {
        GENERIC_DEFAULT_FONTS
            .iter()
            .find_map(|name| self.resolve_named(name))
    }
}
