//! Single-document conversion.
//!
//! [`Converter::convert`] is synchronous and blocks for the whole document:
//! rasterisation is CPU-bound and pdfium is not async-safe. Run it on a
//! blocking thread (see [`crate::task::ConversionTask`]) when the caller must
//! stay responsive.
//!
//! A conversion is all-or-nothing. Pages already written when a later page
//! fails stay on disk, but the caller only ever sees the error; per-input
//! failure isolation happens one level up, in [`crate::batch`].

use crate::config::{check_dpi, ConversionRequest};
use crate::error::Pdf2ImgError;
use crate::output::DocumentInfo;
use crate::pipeline::encode;
use crate::pipeline::render::{PdfEngine, PdfiumEngine, RenderedPage};
use crate::progress::ConversionProgressCallback;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Turns one PDF into one image file per page.
///
/// Cheap to clone; clones share the engine.
#[derive(Clone)]
pub struct Converter {
    engine: Arc<dyn PdfEngine>,
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("engine", &"<dyn PdfEngine>")
            .finish()
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::pdfium()
    }
}

impl Converter {
    pub fn new(engine: Arc<dyn PdfEngine>) -> Self {
        Self { engine }
    }

    /// A converter backed by the pdfium library (see [`PdfiumEngine`]).
    pub fn pdfium() -> Self {
        Self::new(Arc::new(PdfiumEngine::new()))
    }

    /// Page count and declared metadata; `None` if the file cannot be read.
    pub fn inspect(&self, pdf_path: &Path) -> Option<DocumentInfo> {
        self.engine.inspect(pdf_path)
    }

    /// Rasterise every page of `request.source_path`.
    ///
    /// # Returns
    /// The written files, in page order, named
    /// `{prefix}_page_{NNN}.{ext}` inside `request.output_directory`.
    ///
    /// # Errors
    /// - [`Pdf2ImgError::InvalidConfig`] if the DPI is out of range
    /// - [`Pdf2ImgError::FileNotFound`] if the source is gone
    /// - [`Pdf2ImgError::OutputDirFailed`] if the directory cannot be created
    /// - any engine error (corrupt PDF, password, page render failure)
    /// - [`Pdf2ImgError::EncodeFailed`] if a page cannot be written
    pub fn convert(
        &self,
        request: &ConversionRequest,
        progress: Option<&dyn ConversionProgressCallback>,
    ) -> Result<Vec<PathBuf>, Pdf2ImgError> {
        let start = Instant::now();
        info!(
            "Starting conversion: {} ({} DPI, {})",
            request.source_path.display(),
            request.dpi,
            request.format
        );

        match self.convert_pages(request, progress) {
            Ok(paths) => {
                info!(
                    "Conversion complete: {} pages in {}ms",
                    paths.len(),
                    start.elapsed().as_millis()
                );
                Ok(paths)
            }
            Err(e) => {
                error!(
                    "Conversion failed for {}: {}",
                    request.source_path.display(),
                    e
                );
                Err(e)
            }
        }
    }

    fn convert_pages(
        &self,
        request: &ConversionRequest,
        progress: Option<&dyn ConversionProgressCallback>,
    ) -> Result<Vec<PathBuf>, Pdf2ImgError> {
        check_dpi(request.dpi)?;

        let source = &request.source_path;
        if !source.is_file() {
            return Err(Pdf2ImgError::FileNotFound {
                path: source.clone(),
            });
        }

        let out_dir = &request.output_directory;
        std::fs::create_dir_all(out_dir).map_err(|e| Pdf2ImgError::OutputDirFailed {
            path: out_dir.clone(),
            source: e,
        })?;

        let prefix = request.effective_prefix();
        let format = request.format;
        let mut written: Vec<PathBuf> = Vec::new();

        let mut sink = |page: RenderedPage| -> Result<(), Pdf2ImgError> {
            let page_num = page.index + 1;
            if page.index == 0 {
                if let Some(cb) = progress {
                    cb.on_conversion_start(page.total);
                }
            }

            let path = encode::page_output_path(out_dir, &prefix, page_num, format);
            encode::write_page(&page.image, &path, format)?;
            debug!("Saved page {}/{}: {}", page_num, page.total, path.display());

            if let Some(cb) = progress {
                cb.on_page_complete(page_num, page.total, &path);
            }
            written.push(path);
            Ok(())
        };
        let total = self.engine.render(source, request.dpi, &mut sink)?;

        if written.len() != total {
            return Err(Pdf2ImgError::Internal(format!(
                "engine reported {} pages but delivered {}",
                total,
                written.len()
            )));
        }

        if let Some(cb) = progress {
            cb.on_conversion_complete(total);
        }

        Ok(written)
    }
}

/// Read page count, title, author and size with the default pdfium engine.
///
/// Returns `None` when the file cannot be opened; the reason is logged.
pub fn inspect(pdf_path: impl AsRef<Path>) -> Option<DocumentInfo> {
    PdfiumEngine::new().inspect(pdf_path.as_ref())
}
