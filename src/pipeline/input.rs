//! Input validation: decide whether a path is worth handing to the engine.
//!
//! The checks are cheap (one `metadata` call, no reads) so the
//! caller can run them on every candidate file before building a request.
//! They run in a fixed order and stop at the first failure, which makes the
//! reported reason deterministic for inputs that fail several checks.

use crate::error::ValidationFailure;
use std::path::Path;
use tracing::debug;

/// Largest accepted input: 100 MiB.
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Expected document extension, compared case-insensitively.
pub const PDF_EXTENSION: &str = "pdf";

/// Validate a candidate input and return its size in bytes.
///
/// Checks, in order:
/// 1. `path` is an existing regular file
/// 2. its extension is `pdf` (any case)
/// 3. it is not empty
/// 4. it is at most [`MAX_FILE_SIZE`] bytes
pub fn validate_pdf(path: &Path) -> Result<u64, ValidationFailure> {
    let meta = match std::fs::metadata(path) {
        Ok(m) if m.is_file() => m,
        _ => return Err(ValidationFailure::NotAFile),
    };

    if !has_pdf_extension(path) {
        return Err(ValidationFailure::WrongExtension);
    }

    check_size(meta.len())?;

    debug!("Validated PDF: {} ({} bytes)", path.display(), meta.len());
    Ok(meta.len())
}

/// Size checks (3) and (4) on their own.
pub fn check_size(len: u64) -> Result<(), ValidationFailure> {
    if len == 0 {
        Err(ValidationFailure::Empty)
    } else if len > MAX_FILE_SIZE {
        Err(ValidationFailure::TooLarge)
    } else {
        Ok(())
    }
}

/// `true` if the path ends in `.pdf`, ignoring case.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(PDF_EXTENSION))
}

/// Validation result in `(is_valid, reason)` form, for display.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub reason: String,
}

impl ValidationReport {
    pub fn check(path: &Path) -> Self {
        match validate_pdf(path) {
            Ok(_) => Self {
                is_valid: true,
                reason: "file is valid".to_string(),
            },
            Err(failure) => Self {
                is_valid: false,
                reason: failure.to_string(),
            },
        }
    }
}
