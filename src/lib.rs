//! # pdf2img
//!
//! Convert PDF documents into one raster image per page: PNG, JPEG, BMP or
//! TIFF, at a chosen resolution.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    existence / extension / size checks (≤ 100 MiB)
//!  ├─ 2. Render   rasterise pages via pdfium, one at a time, in order
//!  ├─ 3. Encode   flatten to RGB for JPEG, write {prefix}_page_{NNN}.{ext}
//!  └─ 4. Report   progress after every page; ordered list of written files
//! ```
//!
//! Single documents go through [`Converter::convert`], optionally on a
//! background thread via [`ConversionTask`]. Many documents go through
//! [`batch_convert`], which isolates failures so one bad PDF never stops the
//! rest.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2img::{ConversionRequest, Converter, ImageFormat};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = ConversionRequest::builder("document.pdf", "output")
//!         .format(ImageFormat::Png)
//!         .dpi(200)
//!         .build()?;
//!     let report = |page: usize, total: usize| eprintln!("{page}/{total}");
//!     let files = Converter::pdfium().convert(&request, Some(&report))?;
//!     eprintln!("wrote {} images", files.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2img` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## PDFium
//!
//! Rendering needs the pdfium shared library at runtime. It is looked up via
//! `PDFIUM_LIB_PATH`, then next to the working directory, then on the system
//! library path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod task;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{batch_convert, batch_convert_with, expand_inputs};
pub use config::{
    ConversionRequest, ConversionRequestBuilder, ImageFormat, DEFAULT_DPI, MAX_DPI, MIN_DPI,
};
pub use convert::{inspect, Converter};
pub use error::{Pdf2ImgError, ValidationFailure};
pub use output::{format_file_size, BatchResult, ConversionOutcome, DocumentInfo, OutcomeStatus};
pub use pipeline::input::{validate_pdf, ValidationReport, MAX_FILE_SIZE};
pub use pipeline::render::{PdfEngine, PdfiumEngine, RenderedPage};
pub use progress::ConversionProgressCallback;
pub use task::{ConversionTask, TaskEvent};
