//! Result types returned by inspection and batch conversion.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Document facts shown to the user before converting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    /// Declared `/Title`, if any.
    pub title: Option<String>,
    /// Declared `/Author`, if any.
    pub author: Option<String>,
    /// Raw file size in bytes.
    pub file_size: u64,
}

impl fmt::Display for DocumentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pages: {} | Title: {} | Author: {} | Size: {}",
            self.page_count,
            self.title.as_deref().unwrap_or("unknown"),
            self.author.as_deref().unwrap_or("unknown"),
            format_file_size(self.file_size)
        )
    }
}

/// Whether one batch input converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Failed,
}

/// What happened to one input of a batch.
///
/// Created once per input by [`crate::batch::batch_convert`] and read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionOutcome {
    input_path: PathBuf,
    output_paths: Vec<PathBuf>,
    status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ConversionOutcome {
    pub fn success(input_path: impl Into<PathBuf>, output_paths: Vec<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_paths,
            status: OutcomeStatus::Success,
            error: None,
        }
    }

    pub fn failed(input_path: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        Self {
            input_path: input_path.into(),
            output_paths: Vec::new(),
            status: OutcomeStatus::Failed,
            error: Some(error.into()),
        }
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// Written page images in page order. Empty for failed inputs.
    pub fn output_paths(&self) -> &[PathBuf] {
        &self.output_paths
    }

    pub fn status(&self) -> OutcomeStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Ordered outcomes of a batch, one per input, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BatchResult {
    outcomes: Vec<ConversionOutcome>,
}

impl BatchResult {
    pub(crate) fn from_outcomes(outcomes: Vec<ConversionOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[ConversionOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConversionOutcome> {
        self.outcomes.iter()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    /// Failed outcomes, in input order.
    pub fn failures(&self) -> impl Iterator<Item = &ConversionOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Total page images written across all successful inputs.
    pub fn total_images(&self) -> usize {
        self.outcomes.iter().map(|o| o.output_paths.len()).sum()
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a ConversionOutcome;
    type IntoIter = std::slice::Iter<'a, ConversionOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

/// Human-readable byte count: `"1.50 KB"`, `"12.00 MB"`.
pub fn format_file_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.2} TB")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_size_units() {
        assert_eq!(format_file_size(0), "0.00 B");
        assert_eq!(format_file_size(1023), "1023.00 B");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(100 * 1024 * 1024), "100.00 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024 * 1024), "3.00 TB");
    }

    #[test]
    fn batch_counts() {
        let batch = BatchResult::from_outcomes(vec![
            ConversionOutcome::success("a.pdf", vec!["a/a_page_001.png".into()]),
            ConversionOutcome::failed("b.pdf", "corrupt"),
            ConversionOutcome::success("c.pdf", vec![]),
        ]);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.succeeded(), 2);
        assert_eq!(batch.failed(), 1);
        assert_eq!(batch.total_images(), 1);
        let failed: Vec<_> = batch.failures().map(|o| o.input_path().to_path_buf()).collect();
        assert_eq!(failed, vec![PathBuf::from("b.pdf")]);
    }

    #[test]
    fn outcome_json_shape() {
        let ok = ConversionOutcome::success("a.pdf", vec!["out/a_page_001.png".into()]);
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["status"], "success");
        assert!(json.get("error").is_none());

        let bad = ConversionOutcome::failed("b.pdf", "file is empty");
        let json = serde_json::to_value(&bad).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "file is empty");
        assert_eq!(json["output_paths"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn info_display_marks_missing_metadata() {
        let info = DocumentInfo {
            page_count: 4,
            title: Some("Quarterly".into()),
            author: None,
            file_size: 2048,
        };
        let s = info.to_string();
        assert!(s.contains("Pages: 4"));
        assert!(s.contains("Quarterly"));
        assert!(s.contains("Author: unknown"));
        assert!(s.contains("2.00 KB"));
    }
}
