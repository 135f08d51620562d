//! Batch conversion: many inputs, one outcome each, failures isolated.
//!
//! Inputs are processed sequentially, in the order given. Every input gets its
//! own subdirectory `{output_directory}/{input_stem}` so documents never
//! overwrite each other's pages. A failure for one input (validation, render,
//! or write) is recorded in that input's [`ConversionOutcome`] and the batch
//! moves on; nothing crosses the per-item boundary.
//!
//! [`batch_convert`] blocks until the last input has been processed and only
//! then returns the [`BatchResult`]. Callers on an interactive thread wait for
//! the whole batch.

use crate::config::{source_stem, ConversionRequest, ImageFormat};
use crate::convert::Converter;
use crate::error::Pdf2ImgError;
use crate::output::{BatchResult, ConversionOutcome};
use crate::pipeline::input::has_pdf_extension;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Convert each of `inputs` into `{output_directory}/{stem}/`.
///
/// Always returns exactly one outcome per input, in input order.
pub fn batch_convert<P: AsRef<Path>>(
    converter: &Converter,
    inputs: &[P],
    output_directory: &Path,
    format: ImageFormat,
    dpi: u32,
) -> BatchResult {
    batch_convert_with(converter, inputs, output_directory, format, dpi, |_, _, _| {})
}

/// Like [`batch_convert`], calling `on_item(done, total, &outcome)` after each
/// input (`done` is 1-based).
pub fn batch_convert_with<P, F>(
    converter: &Converter,
    inputs: &[P],
    output_directory: &Path,
    format: ImageFormat,
    dpi: u32,
    mut on_item: F,
) -> BatchResult
where
    P: AsRef<Path>,
    F: FnMut(usize, usize, &ConversionOutcome),
{
    let total = inputs.len();
    let mut outcomes = Vec::with_capacity(total);
    let mut used_dirs = HashSet::new();

    for (i, input) in inputs.iter().enumerate() {
        let input = input.as_ref();
        info!("Processing file {}/{}: {}", i + 1, total, input.display());

        let item_dir = item_output_dir(output_directory, input);
        if !used_dirs.insert(item_dir.clone()) {
            warn!(
                "{} shares output folder {} with an earlier input",
                input.display(),
                item_dir.display()
            );
        }

        let outcome = match convert_one(converter, input, &item_dir, format, dpi) {
            Ok(paths) => ConversionOutcome::success(input, paths),
            Err(e) => {
                warn!("Failed to process {}: {}", input.display(), e);
                ConversionOutcome::failed(input, e.to_string())
            }
        };

        on_item(i + 1, total, &outcome);
        outcomes.push(outcome);
    }

    let result = BatchResult::from_outcomes(outcomes);
    info!(
        "Batch complete: {} succeeded, {} failed",
        result.succeeded(),
        result.failed()
    );
    result
}

/// Per-input output directory: `{output_directory}/{input_stem}`.
pub fn item_output_dir(output_directory: &Path, input: &Path) -> PathBuf {
    output_directory.join(source_stem(input))
}

/// Expand user-supplied inputs into the list of files to convert.
///
/// A directory contributes the `*.pdf` files directly inside it (any case,
/// not recursive), sorted by path. Anything else is kept as given, so missing
/// or mistyped files still reach the batch and get a failed outcome. Repeated
/// paths are dropped, first occurrence wins.
pub fn expand_inputs<P: AsRef<Path>>(raw: &[P]) -> Result<Vec<PathBuf>, Pdf2ImgError> {
    let mut seen = HashSet::new();
    let mut inputs = Vec::new();

    for path in raw {
        let path = path.as_ref();
        if path.is_dir() {
            let entries = std::fs::read_dir(path).map_err(|e| {
                Pdf2ImgError::InvalidConfig(format!(
                    "Cannot read folder '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            let mut found: Vec<PathBuf> = entries
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry.path()),
                    Err(e) => {
                        warn!("Skipping unreadable entry in {}: {}", path.display(), e);
                        None
                    }
                })
                .filter(|p| p.is_file() && has_pdf_extension(p))
                .collect();
            found.sort();
            if found.is_empty() {
                warn!("No PDF files found in folder {}", path.display());
            }
            debug!("Folder {} contributes {} PDFs", path.display(), found.len());
            for f in found {
                if seen.insert(f.clone()) {
                    inputs.push(f);
                }
            }
        } else if seen.insert(path.to_path_buf()) {
            inputs.push(path.to_path_buf());
        }
    }

    Ok(inputs)
}

fn convert_one(
    converter: &Converter,
    input: &Path,
    item_dir: &Path,
    format: ImageFormat,
    dpi: u32,
) -> Result<Vec<PathBuf>, Pdf2ImgError> {
    let request = ConversionRequest::builder(input, item_dir)
        .format(format)
        .dpi(dpi)
        .build()?;
    converter.convert(&request, None)
}
