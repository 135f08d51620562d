//! PDF rasterisation: render every page to a `DynamicImage` via pdfium.
//!
//! ## Why a trait?
//!
//! [`PdfEngine`] is the only seam between this crate and the native pdfium
//! library. The converter, batch orchestrator and task runner are written
//! against the trait, so they can be exercised with a synthetic engine in
//! tests and on machines where libpdfium is not installed.
//!
//! ## Why a page sink instead of `Vec<DynamicImage>`?
//!
//! At 600 DPI an A4 page is ~5000 × 7000 px, about 140 MB as RGBA. Handing
//! pages to the caller one at a time keeps peak memory at one page no matter
//! how long the document is, and still delivers pages strictly in order.
//!
//! ## Resolution
//!
//! PDF geometry is in points (1/72 inch). Each page is rendered to
//! `width_pt × dpi / 72` by `height_pt × dpi / 72` pixels, so the DPI maps
//! directly onto output pixel density regardless of page size.

use crate::error::Pdf2ImgError;
use crate::output::DocumentInfo;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit pdfium library file.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// One rendered page, handed to the sink in page order.
pub struct RenderedPage {
    /// 0-based page index.
    pub index: usize,
    /// Pages in the document.
    pub total: usize,
    pub image: DynamicImage,
}

/// Receives pages as they are rendered. Returning `Err` stops rendering.
pub type PageSink<'a> = dyn FnMut(RenderedPage) -> Result<(), Pdf2ImgError> + 'a;

/// An external PDF rasterisation and metadata engine.
pub trait PdfEngine: Send + Sync {
    /// Render every page of `pdf_path` at `dpi`, in increasing page order.
    ///
    /// Returns the document's page count after the last page has been
    /// delivered. Any error (from the engine or from `sink`) aborts the
    /// remaining pages.
    fn render(&self, pdf_path: &Path, dpi: u32, sink: &mut PageSink<'_>)
        -> Result<usize, Pdf2ImgError>;

    /// Page count and declared metadata, or `None` if the file cannot be read.
    fn inspect(&self, pdf_path: &Path) -> Option<DocumentInfo>;
}

/// The production engine, backed by `pdfium-render`.
///
/// Library resolution, first match wins:
/// 1. the path given to [`PdfiumEngine::with_library`]
/// 2. `PDFIUM_LIB_PATH`
/// 3. the platform library in the working directory (`./libpdfium.so` etc.)
/// 4. the system library search path
#[derive(Debug, Clone, Default)]
pub struct PdfiumEngine {
    library_path: Option<PathBuf>,
}

impl PdfiumEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to an explicit pdfium library file.
    pub fn with_library(path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: Some(path.into()),
        }
    }

    fn bind(&self) -> Result<Pdfium, Pdf2ImgError> {
        let explicit = self
            .library_path
            .clone()
            .or_else(|| std::env::var_os(PDFIUM_LIB_PATH_ENV).map(PathBuf::from));

        let bindings = match explicit {
            Some(ref path) => Pdfium::bind_to_library(path).map_err(|e| {
                Pdf2ImgError::PdfiumBindingFailed(format!("'{}': {}", path.display(), e))
            })?,
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library())
                .map_err(|e| Pdf2ImgError::PdfiumBindingFailed(e.to_string()))?,
        };

        Ok(Pdfium::new(bindings))
    }

    fn read_info(&self, pdf_path: &Path) -> Result<DocumentInfo, Pdf2ImgError> {
        let file_size = std::fs::metadata(pdf_path)
            .map_err(|_| Pdf2ImgError::FileNotFound {
                path: pdf_path.to_path_buf(),
            })?
            .len();

        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| load_error(pdf_path, e))?;

        let metadata = document.metadata();
        let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
            metadata.get(tag).and_then(|t| {
                let v = t.value().trim().to_string();
                if v.is_empty() {
                    None
                } else {
                    Some(v)
                }
            })
        };

        Ok(DocumentInfo {
            page_count: document.pages().len() as usize,
            title: get_meta(PdfDocumentMetadataTagType::Title),
            author: get_meta(PdfDocumentMetadataTagType::Author),
            file_size,
        })
    }
}

impl PdfEngine for PdfiumEngine {
    fn render(
        &self,
        pdf_path: &Path,
        dpi: u32,
        sink: &mut PageSink<'_>,
    ) -> Result<usize, Pdf2ImgError> {
        let pdfium = self.bind()?;

        let document = pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| load_error(pdf_path, e))?;

        let pages = document.pages();
        let total = pages.len() as usize;
        info!("PDF loaded: {} pages", total);

        for (index, page) in pages.iter().enumerate() {
            let width = points_to_pixels(page.width().value, dpi);
            let height = points_to_pixels(page.height().value, dpi);
            let render_config = PdfRenderConfig::new()
                .set_target_width(width)
                .set_target_height(height);

            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                Pdf2ImgError::RasterisationFailed {
                    page: index + 1,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                index + 1,
                image.width(),
                image.height()
            );

            sink(RenderedPage {
                index,
                total,
                image,
            })?;
        }

        Ok(total)
    }

    fn inspect(&self, pdf_path: &Path) -> Option<DocumentInfo> {
        match self.read_info(pdf_path) {
            Ok(info) => Some(info),
            Err(e) => {
                warn!("Failed to read PDF info for {}: {}", pdf_path.display(), e);
                None
            }
        }
    }
}

/// Pixel length of `points` at `dpi`, never less than one pixel.
pub fn points_to_pixels(points: f32, dpi: u32) -> i32 {
    ((points * dpi as f32) / 72.0).round().max(1.0) as i32
}

fn load_error(pdf_path: &Path, e: PdfiumError) -> Pdf2ImgError {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        Pdf2ImgError::PasswordRequired {
            path: pdf_path.to_path_buf(),
        }
    } else {
        Pdf2ImgError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: err_str,
        }
    }
}
