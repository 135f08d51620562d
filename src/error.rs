//! Error types for the pdf2img library.
//!
//! Two error types reflect two distinct moments of failure:
//!
//! * [`ValidationFailure`] — the input was rejected **before** any conversion
//!   was attempted (missing file, wrong extension, empty, too large). It is a
//!   plain value so callers can show the reason without formatting an error
//!   chain.
//!
//! * [`Pdf2ImgError`] — every error a conversion can return. A single-document
//!   conversion is all-or-nothing, so any variant aborts that document. The
//!   batch orchestrator catches these per input and records the message in a
//!   [`crate::output::ConversionOutcome`] instead of propagating.

use std::path::PathBuf;
use thiserror::Error;

/// Why an input path was rejected by [`crate::pipeline::input::validate_pdf`].
///
/// Checks run in declaration order and stop at the first failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, serde::Serialize)]
pub enum ValidationFailure {
    /// Path does not exist or is not a regular file.
    #[error("file does not exist")]
    NotAFile,

    /// Extension is not `.pdf` (case-insensitive).
    #[error("not a document of the expected type")]
    WrongExtension,

    /// Zero-byte file.
    #[error("file is empty")]
    Empty,

    /// Larger than [`crate::pipeline::input::MAX_FILE_SIZE`].
    #[error("file exceeds size limit")]
    TooLarge,
}

/// All errors returned by the pdf2img library.
#[derive(Debug, Error)]
pub enum Pdf2ImgError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input failed the pre-conversion checks.
    #[error("Invalid input '{path}': {reason}")]
    Validation {
        path: PathBuf,
        reason: ValidationFailure,
    },

    /// Source file vanished (or was never there) when conversion started.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt or the format is unsupported.
    #[error("PDF '{path}' is corrupt or unsupported: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF is encrypted; this tool does not take passwords.
    #[error("PDF '{path}' is encrypted and requires a password.")]
    PasswordRequired { path: PathBuf },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create the output directory.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The image encoder could not write a page file.
    #[error("Failed to write image '{path}': {source}")]
    EncodeFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Request parameters are out of range or unrecognised.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Place libpdfium next to the executable or in the working directory.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Install pdfium system-wide so the dynamic loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2ImgError {
    /// `true` when the error was raised before the engine was touched.
    pub fn is_validation(&self) -> bool {
        matches!(self, Pdf2ImgError::Validation { .. })
    }
}
