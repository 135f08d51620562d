//! Image encoding: `DynamicImage` → page file on disk.
//!
//! pdfium renders into BGRA bitmaps which `pdfium-render` exposes as RGBA
//! `DynamicImage`s. PNG, BMP and TIFF take RGBA as-is. JPEG has no alpha
//! channel, and handing it an RGBA buffer either fails in the encoder or
//! misreads the channels, so JPEG pages are flattened to `Rgb8` first.

use crate::config::ImageFormat;
use crate::error::Pdf2ImgError;
use image::DynamicImage;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// `{prefix}_page_{NNN}.{ext}` with a 1-based, zero-padded page number.
pub fn page_file_name(prefix: &str, page_num: usize, format: ImageFormat) -> String {
    format!("{}_page_{:03}.{}", prefix, page_num, format.extension())
}

/// Full output path for one page.
pub fn page_output_path(
    output_directory: &Path,
    prefix: &str,
    page_num: usize,
    format: ImageFormat,
) -> PathBuf {
    output_directory.join(page_file_name(prefix, page_num, format))
}

/// Normalise the colour model for `format`. Borrowed when nothing changes.
pub fn prepare_for_format(img: &DynamicImage, format: ImageFormat) -> Cow<'_, DynamicImage> {
    if format.requires_rgb() && !matches!(img, DynamicImage::ImageRgb8(_)) {
        Cow::Owned(DynamicImage::ImageRgb8(img.to_rgb8()))
    } else {
        Cow::Borrowed(img)
    }
}

/// Encode `img` as `format` and write it to `path`, replacing any existing file.
pub fn write_page(
    img: &DynamicImage,
    path: &Path,
    format: ImageFormat,
) -> Result<(), Pdf2ImgError> {
    let prepared = prepare_for_format(img, format);

    let file = File::create(path).map_err(|e| Pdf2ImgError::EncodeFailed {
        path: path.to_path_buf(),
        source: image::ImageError::IoError(e),
    })?;
    let mut writer = BufWriter::new(file);

    prepared
        .write_to(&mut writer, format.to_image_format())
        .map_err(|e| Pdf2ImgError::EncodeFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    // Small pages never leave the buffer before this; a failed flush on drop
    // would be silently lost.
    writer.flush().map_err(|e| Pdf2ImgError::EncodeFailed {
        path: path.to_path_buf(),
        source: image::ImageError::IoError(e),
    })?;

    debug!(
        "Encoded {}x{} {} → {}",
        prepared.width(),
        prepared.height(),
        format,
        path.display()
    );
    Ok(())
}
