//! Progress-callback trait for per-page conversion events.
//!
//! Pass a `&dyn ConversionProgressCallback` to
//! [`crate::convert::Converter::convert`] to be told after every page file is
//! written. Any `Fn(usize, usize) + Send + Sync` closure is a callback, so the
//! common case needs no struct at all:
//!
//! ```rust,no_run
//! use pdf2img::{ConversionRequest, Converter};
//!
//! let converter = Converter::pdfium();
//! let request = ConversionRequest::builder("doc.pdf", "out").build().unwrap();
//! let report = |current: usize, total: usize| eprintln!("page {current}/{total}");
//! converter.convert(&request, Some(&report)).unwrap();
//! ```
//!
//! Callbacks run synchronously on the converting thread, between page writes.
//! A slow callback slows the conversion down by exactly its own cost.

use std::path::Path;

/// Called by the converter as it writes each page.
///
/// All methods have default no-op implementations so implementors only
/// override what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once, after the document is opened and before page 1 is written.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after page `page_num` (1-indexed) has been written to `output`.
    ///
    /// Fires exactly `total_pages` times on success, with strictly increasing
    /// `page_num` and constant `total_pages`.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, output: &Path) {
        let _ = (page_num, total_pages, output);
    }

    /// Called once after the last page has been written.
    fn on_conversion_complete(&self, total_pages: usize) {
        let _ = total_pages;
    }
}

impl<F> ConversionProgressCallback for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn on_page_complete(&self, page_num: usize, total_pages: usize, _output: &Path) {
        self(page_num, total_pages)
    }
}
