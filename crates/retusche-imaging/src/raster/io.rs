// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image file I/O: open, and save by extension.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use retusche_core::error::{Result, RetuscheError};
use serde::Serialize;
use tracing::{info, instrument};

use super::Image;

/// File extensions accepted by [`load_image`] (lowercase, without the dot).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp", "tiff", "tif"];

/// Width/height summary for status display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

pub fn image_info(image: &Image) -> ImageInfo {
    ImageInfo {
        width: image.width(),
        height: image.height(),
    }
}

/// Lowercased extension of `path`, if any.
fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Whether `path` carries one of the [`SUPPORTED_EXTENSIONS`].
pub fn is_supported_format(path: impl AsRef<Path>) -> bool {
    extension_of(path.as_ref()).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Load an image file and convert it to RGB8.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_image(path: impl AsRef<Path>) -> Result<Image> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RetuscheError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }
    if !is_supported_format(path) {
        return Err(RetuscheError::UnsupportedFormat(
            extension_of(path).unwrap_or_else(|| "(none)".into()),
        ));
    }

    let decoded = image::open(path).map_err(|err| {
        RetuscheError::ImageError(format!("failed to open {}: {}", path.display(), err))
    })?;
    info!(
        width = decoded.width(),
        height = decoded.height(),
        color = ?decoded.color(),
        "Image loaded"
    );
    Ok(Image::from_dynamic(decoded))
}

/// Write `image` to `path`, choosing the encoding from the extension.
///
/// JPEG uses `quality` (clamped to 1-100). WebP is written lossless because
/// that is the only encoder available. An unknown extension is written as
/// PNG; a path without an extension gets `.png` appended. Missing parent
/// directories are created. Returns the path actually written.
#[instrument(skip(image), fields(path = %path.as_ref().display(), quality))]
pub fn save_image(image: &Image, path: impl AsRef<Path>, quality: u8) -> Result<PathBuf> {
    let mut path = path.as_ref().to_path_buf();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let format = match extension_of(&path).as_deref() {
        Some("jpg") | Some("jpeg") => ImageFormat::Jpeg,
        Some("png") => ImageFormat::Png,
        Some("bmp") => ImageFormat::Bmp,
        Some("gif") => ImageFormat::Gif,
        Some("webp") => ImageFormat::WebP,
        Some("tif") | Some("tiff") => ImageFormat::Tiff,
        Some(_) => ImageFormat::Png,
        None => {
            path.set_extension("png");
            ImageFormat::Png
        }
    };

    let save_err = |err: image::ImageError| {
        RetuscheError::ImageError(format!("failed to save image to {}: {}", path.display(), err))
    };

    if format == ImageFormat::Jpeg {
        let mut writer = BufWriter::new(File::create(&path)?);
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
        image.as_rgb().write_with_encoder(encoder).map_err(save_err)?;
    } else {
        image.as_rgb().save_with_format(&path, format).map_err(save_err)?;
    }

    info!(format = ?format, "Image saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use retusche_core::Rgb;

    fn sample() -> Image {
        let mut buf = image::RgbImage::from_pixel(6, 4, image::Rgb([255, 255, 255]));
        buf.put_pixel(2, 1, image::Rgb([10, 20, 30]));
        Image::from_buffer(buf)
    }

    #[test]
    fn supported_formats_are_case_insensitive() {
        assert!(is_supported_format("photo.JPG"));
        assert!(is_supported_format("scan.tif"));
        assert!(!is_supported_format("notes.txt"));
        assert!(!is_supported_format("no_extension"));
    }

    #[test]
    fn png_round_trip_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let written = save_image(&sample(), dir.path().join("out.png"), 95).unwrap();
        let back = load_image(&written).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn missing_extension_gets_png() {
        let dir = tempfile::tempdir().unwrap();
        let written = save_image(&sample(), dir.path().join("nested/out"), 95).unwrap();
        assert_eq!(written.extension().and_then(|e| e.to_str()), Some("png"));
        assert!(written.exists());
    }

    #[test]
    fn jpeg_keeps_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let img = Image::filled(32, 16, Rgb::new(200, 100, 50));
        let written = save_image(&img, dir.path().join("out.jpeg"), 80).unwrap();
        assert_eq!(load_image(&written).unwrap().dimensions(), (32, 16));
    }

    #[test]
    fn unsupported_extension_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.xyz");
        std::fs::write(&path, b"whatever").unwrap();
        assert!(matches!(load_image(&path), Err(RetuscheError::UnsupportedFormat(_))));
    }

    #[test]
    fn missing_file_is_io_not_found() {
        match load_image("/nonexistent/retusche/photo.png") {
            Err(RetuscheError::Io(err)) => assert_eq!(err.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
