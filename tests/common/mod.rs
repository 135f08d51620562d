//! Shared helpers: a synthetic PDF engine driven by the input file's text.
//!
//! Fixture files carry a `.pdf` extension and a one-line script instead of
//! real PDF content:
//!
//! * `pages=N`           — N pages render fine
//! * `pages=N fail_at=K` — pages before K render, page K fails
//! * `corrupt`           — the document cannot be opened
//! * `panic`             — the engine panics while opening
//!
//! Pages are translucent RGBA so JPEG flattening is observable. Their pixel
//! size is a tenth of US Letter at the requested DPI.

#![allow(dead_code)]

use image::{DynamicImage, Rgba, RgbaImage};
use pdf2img::pipeline::render::{points_to_pixels, PageSink};
use pdf2img::{Converter, DocumentInfo, Pdf2ImgError, PdfEngine, RenderedPage};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

pub const PAGE_WIDTH_PT: f32 = 61.2;
pub const PAGE_HEIGHT_PT: f32 = 79.2;

#[derive(Default)]
pub struct ScriptedEngine {
    /// DPI of every `render` call, in call order.
    pub dpi_calls: Mutex<Vec<u32>>,
    /// When set, `render` waits for one message before touching the file.
    gate: Option<Mutex<mpsc::Receiver<()>>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that blocks in `render` until the returned sender fires.
    pub fn gated() -> (Self, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let engine = Self {
            dpi_calls: Mutex::new(Vec::new()),
            gate: Some(Mutex::new(rx)),
        };
        (engine, tx)
    }
}

struct Script {
    pages: usize,
    fail_at: Option<usize>,
}

fn read_script(path: &Path) -> Result<Script, Pdf2ImgError> {
    let text = std::fs::read_to_string(path).map_err(|_| Pdf2ImgError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    let text = text.trim();
    if text == "panic" {
        panic!("synthetic engine crash");
    }

    let mut pages = None;
    let mut fail_at = None;
    for word in text.split_whitespace() {
        if let Some(n) = word.strip_prefix("pages=") {
            pages = n.parse().ok();
        } else if let Some(k) = word.strip_prefix("fail_at=") {
            fail_at = k.parse().ok();
        }
    }

    match pages {
        Some(pages) => Ok(Script { pages, fail_at }),
        None => Err(Pdf2ImgError::CorruptPdf {
            path: path.to_path_buf(),
            detail: format!("unreadable header: {text:?}"),
        }),
    }
}

pub fn page_image(index: usize, dpi: u32) -> DynamicImage {
    let w = points_to_pixels(PAGE_WIDTH_PT, dpi) as u32;
    let h = points_to_pixels(PAGE_HEIGHT_PT, dpi) as u32;
    let shade = (index * 40 % 255) as u8;
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([shade, 90, 200, 160])))
}

impl PdfEngine for ScriptedEngine {
    fn render(
        &self,
        pdf_path: &Path,
        dpi: u32,
        sink: &mut PageSink<'_>,
    ) -> Result<usize, Pdf2ImgError> {
        if let Some(ref gate) = self.gate {
            let _ = gate.lock().unwrap().recv();
        }
        self.dpi_calls.lock().unwrap().push(dpi);

        let script = read_script(pdf_path)?;
        for index in 0..script.pages {
            if script.fail_at == Some(index + 1) {
                return Err(Pdf2ImgError::RasterisationFailed {
                    page: index + 1,
                    detail: "synthetic render failure".into(),
                });
            }
            sink(RenderedPage {
                index,
                total: script.pages,
                image: page_image(index, dpi),
            })?;
        }
        Ok(script.pages)
    }

    fn inspect(&self, pdf_path: &Path) -> Option<DocumentInfo> {
        let script = read_script(pdf_path).ok()?;
        Some(DocumentInfo {
            page_count: script.pages,
            title: None,
            author: None,
            file_size: std::fs::metadata(pdf_path).ok()?.len(),
        })
    }
}

pub fn converter() -> Converter {
    Converter::new(Arc::new(ScriptedEngine::new()))
}

/// Write a fixture PDF named `name` into `dir` with `script` as its content.
pub fn fixture(dir: &Path, name: &str, script: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, script).unwrap();
    path
}

/// File names (not full paths) of `paths`.
pub fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

/// Sorted file names currently inside `dir`.
pub fn dir_listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
