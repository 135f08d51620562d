//! Pipeline stages for PDF-to-image conversion.
//!
//! Each submodule implements exactly one step, so the orchestration in
//! [`crate::convert`] stays a straight line and each step is independently
//! testable.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode
//! (checks)  (pdfium)   (png/jpeg/bmp/tiff file)
//! ```
//!
//! 1. [`input`]  — existence, extension and size checks before any work
//! 2. [`render`] — rasterise pages through a [`render::PdfEngine`]
//! 3. [`encode`] — normalise the colour model and write each page file

pub mod encode;
pub mod input;
pub mod render;
