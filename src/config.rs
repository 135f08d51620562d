//! Request types for PDF-to-image conversion.
//!
//! Every conversion is described by one [`ConversionRequest`], built via its
//! [`ConversionRequestBuilder`]. `build()` runs the input validator, so a
//! request that exists has already passed the existence, type and size
//! checks. The converter still re-checks existence at start, because the file
//! can disappear between building the request and running it.

use crate::error::Pdf2ImgError;
use crate::pipeline::input;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default rendering resolution.
pub const DEFAULT_DPI: u32 = 200;
/// Lowest accepted rendering resolution.
pub const MIN_DPI: u32 = 72;
/// Highest accepted rendering resolution.
pub const MAX_DPI: u32 = 600;

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossless, keeps transparency. (default)
    #[default]
    Png,
    /// Lossy; pages are flattened to opaque RGB before encoding.
    Jpeg,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// All supported formats, in the order they are offered to users.
    pub const ALL: [ImageFormat; 4] = [
        ImageFormat::Png,
        ImageFormat::Jpeg,
        ImageFormat::Bmp,
        ImageFormat::Tiff,
    ];

    /// File extension used for page files (lower-cased format name).
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
        }
    }

    /// Encoder format understood by the `image` crate.
    pub fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
            ImageFormat::Tiff => image::ImageFormat::Tiff,
        }
    }

    /// JPEG has no alpha channel; pages must be flattened to RGB first.
    pub fn requires_rgb(self) -> bool {
        matches!(self, ImageFormat::Jpeg)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Bmp => "BMP",
            ImageFormat::Tiff => "TIFF",
        })
    }
}

impl FromStr for ImageFormat {
    type Err = Pdf2ImgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            "bmp" => Ok(ImageFormat::Bmp),
            "tiff" | "tif" => Ok(ImageFormat::Tiff),
            other => Err(Pdf2ImgError::InvalidConfig(format!(
                "Unsupported image format '{other}' (expected png, jpeg, bmp or tiff)"
            ))),
        }
    }
}

/// One single-document conversion.
///
/// # Example
/// ```rust,no_run
/// use pdf2img::{ConversionRequest, ImageFormat};
///
/// let request = ConversionRequest::builder("report.pdf", "out/")
///     .format(ImageFormat::Jpeg)
///     .dpi(300)
///     .prefix("report")
///     .build()
///     .unwrap();
/// assert_eq!(request.effective_prefix(), "report");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionRequest {
    /// The PDF to rasterise.
    pub source_path: PathBuf,

    /// Directory receiving the page images. Created if absent.
    pub output_directory: PathBuf,

    /// Output image format. Default: PNG.
    pub format: ImageFormat,

    /// Rendering resolution. Range: 72–600. Default: 200.
    ///
    /// Pixel size of each page is `points × dpi / 72` on both axes, so an A4
    /// page at 200 DPI is roughly 1654 × 2339 px.
    pub dpi: u32,

    /// Filename stem shared by all page images. `None` uses the source file
    /// stem.
    pub filename_prefix: Option<String>,
}

impl ConversionRequest {
    /// Start a builder for converting `source_path` into `output_directory`.
    pub fn builder(
        source_path: impl Into<PathBuf>,
        output_directory: impl Into<PathBuf>,
    ) -> ConversionRequestBuilder {
        ConversionRequestBuilder {
            request: ConversionRequest {
                source_path: source_path.into(),
                output_directory: output_directory.into(),
                format: ImageFormat::default(),
                dpi: DEFAULT_DPI,
                filename_prefix: None,
            },
        }
    }

    /// The prefix actually used for output filenames.
    pub fn effective_prefix(&self) -> String {
        match self.filename_prefix {
            Some(ref p) => p.clone(),
            None => source_stem(&self.source_path),
        }
    }
}

/// Builder for [`ConversionRequest`].
#[derive(Debug)]
pub struct ConversionRequestBuilder {
    request: ConversionRequest,
}

impl ConversionRequestBuilder {
    pub fn format(mut self, format: ImageFormat) -> Self {
        self.request.format = format;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.request.dpi = dpi;
        self
    }

    /// Set the filename prefix. Blank strings mean "use the source stem".
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim();
        self.request.filename_prefix = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    pub fn maybe_prefix(self, prefix: Option<String>) -> Self {
        match prefix {
            Some(p) => self.prefix(p),
            None => self,
        }
    }

    /// Build the request, validating the DPI range and the source file.
    pub fn build(self) -> Result<ConversionRequest, Pdf2ImgError> {
        check_dpi(self.request.dpi)?;
        input::validate_pdf(&self.request.source_path).map_err(|reason| {
            Pdf2ImgError::Validation {
                path: self.request.source_path.clone(),
                reason,
            }
        })?;
        Ok(self.request)
    }
}

/// Reject a resolution outside [`MIN_DPI`]..=[`MAX_DPI`].
pub fn check_dpi(dpi: u32) -> Result<(), Pdf2ImgError> {
    if (MIN_DPI..=MAX_DPI).contains(&dpi) {
        Ok(())
    } else {
        Err(Pdf2ImgError::InvalidConfig(format!(
            "DPI must be {MIN_DPI}–{MAX_DPI}, got {dpi}"
        )))
    }
}

/// File stem of `path`, or `"document"` when it has none.
pub fn source_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string())
}
