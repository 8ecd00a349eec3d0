//! Encoding and writing of sampled frames.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};

use crate::config::{ExtractionSettings, ImageFormat};
use crate::error::{CoreResult, frame_write_error};
use crate::utils::list_files_with_extension;

/// File name of the `index`-th sampled frame: `{stem}_{index:06}.{ext}`.
#[must_use]
pub fn frame_file_name(stem: &str, index: u64, format: ImageFormat) -> String {
    format!("{stem}_{index:06}.{}", format.extension())
}

/// Encodes packed RGB24 `data` and writes it to `path`.
///
/// JPEG uses `settings.quality`; PNG uses the encoder defaults. The buffer
/// must hold exactly `width * height * 3` bytes.
pub fn write_frame(
    path: &Path,
    data: &[u8],
    width: u32,
    height: u32,
    settings: &ExtractionSettings,
) -> CoreResult<()> {
    let expected = width as usize * height as usize * 3;
    if data.len() != expected {
        return Err(frame_write_error(
            path,
            format!(
                "buffer holds {} bytes, expected {expected} for {width}x{height} RGB",
                data.len()
            ),
        ));
    }

    let file = File::create(path).map_err(|e| frame_write_error(path, e))?;
    let mut out = BufWriter::new(file);

    let encoded = match settings.format {
        ImageFormat::Jpg => JpegEncoder::new_with_quality(&mut out, settings.quality)
            .encode(data, width, height, ColorType::Rgb8),
        ImageFormat::Png => {
            PngEncoder::new(&mut out).write_image(data, width, height, ColorType::Rgb8)
        }
    };
    encoded.map_err(|e| frame_write_error(path, e))?;
    out.flush().map_err(|e| frame_write_error(path, e))?;
    Ok(())
}

/// Deletes every `*.{ext}` file in `dir`, returning how many were removed.
///
/// Best-effort: failures are logged and skipped.
pub fn clear_frames(dir: &Path, format: ImageFormat) -> usize {
    let mut removed = 0;
    for path in list_files_with_extension(dir, format.extension()) {
        match std::fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => log::warn!("Could not remove {}: {}", path.display(), e),
        }
    }
    removed
}

/// True if `dir` already holds at least one `*.{ext}` file.
#[must_use]
pub fn frames_present(dir: &Path, format: ImageFormat) -> bool {
    !list_files_with_extension(dir, format.extension()).is_empty()
}

/// Path of the `index`-th sampled frame inside `dir`.
#[must_use]
pub fn frame_path(dir: &Path, stem: &str, index: u64, format: ImageFormat) -> PathBuf {
    dir.join(frame_file_name(stem, index, format))
}
