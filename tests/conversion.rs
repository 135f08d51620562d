//! Converter and batch behaviour against the synthetic engine.

mod common;

use common::{converter, dir_listing, fixture, names, page_image, ScriptedEngine};
use pdf2img::{
    batch_convert, ConversionProgressCallback, ConversionRequest, Converter, ImageFormat,
    OutcomeStatus, Pdf2ImgError,
};
use std::path::Path;
use std::sync::{Arc, Mutex};

fn request(src: &Path, out: &Path) -> pdf2img::ConversionRequestBuilder {
    ConversionRequest::builder(src, out)
}

// ── Single document ──────────────────────────────────────────────────────────

#[test]
fn three_page_png_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let src = fixture(dir.path(), "report.pdf", "pages=3");
    let out = dir.path().join("out");
    let req = request(&src, &out)
        .format(ImageFormat::Png)
        .dpi(200)
        .prefix("doc")
        .build()
        .unwrap();

    let calls = Mutex::new(Vec::new());
    let on_progress = |current: usize, total: usize| calls.lock().unwrap().push((current, total));
    let paths = converter().convert(&req, Some(&on_progress)).unwrap();

    assert_eq!(
        names(&paths),
        vec!["doc_page_001.png", "doc_page_002.png", "doc_page_003.png"]
    );
    assert!(paths.iter().all(|p| p.parent() == Some(out.as_path())));
    assert_eq!(*calls.lock().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);
}

#[test]
fn output_count_matches_page_count_without_gaps() {
    let dir = tempfile::tempdir().unwrap();
    for pages in [1usize, 2, 12] {
        let src = fixture(dir.path(), &format!("p{pages}.pdf"), &format!("pages={pages}"));
        let out = dir.path().join(format!("out{pages}"));
        let req = request(&src, &out).build().unwrap();

        let paths = converter().convert(&req, None).unwrap();
        assert_eq!(paths.len(), pages);
        let expected: Vec<String> = (1..=pages)
            .map(|i| format!("p{pages}_page_{i:03}.png"))
            .collect();
        assert_eq!(names(&paths), expected);
        assert_eq!(dir_listing(&out), expected);
    }
}

#[test]
fn progress_is_monotonic_with_constant_total() {
    let dir = tempfile::tempdir().unwrap();
    let src = fixture(dir.path(), "long.pdf", "pages=7");
    let req = request(&src, &dir.path().join("out")).build().unwrap();

    let calls = Mutex::new(Vec::new());
    let on_progress = |current: usize, total: usize| calls.lock().unwrap().push((current, total));
    converter().convert(&req, Some(&on_progress)).unwrap();

    let calls = calls.into_inner().unwrap();
    assert_eq!(calls.len(), 7);
    assert!(calls.iter().all(|&(_, total)| total == 7));
    let currents: Vec<usize> = calls.iter().map(|&(c, _)| c).collect();
    assert_eq!(currents, (1..=7).collect::<Vec<_>>());
}

#[test]
fn progress_fires_after_each_file_is_on_disk() {
    struct FileExists {
        checked: Mutex<Vec<bool>>,
        started: Mutex<Option<usize>>,
        finished: Mutex<Option<usize>>,
    }
    impl ConversionProgressCallback for FileExists {
        fn on_conversion_start(&self, total_pages: usize) {
            *self.started.lock().unwrap() = Some(total_pages);
        }
        fn on_page_complete(&self, _page: usize, _total: usize, output: &Path) {
            self.checked.lock().unwrap().push(output.is_file());
        }
        fn on_conversion_complete(&self, total_pages: usize) {
            *self.finished.lock().unwrap() = Some(total_pages);
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let src = fixture(dir.path(), "a.pdf", "pages=4");
    let req = request(&src, &dir.path().join("out")).build().unwrap();
    let cb = FileExists {
        checked: Mutex::new(Vec::new()),
        started: Mutex::new(None),
        finished: Mutex::new(None),
    };
    converter().convert(&req, Some(&cb)).unwrap();

    assert_eq!(*cb.checked.lock().unwrap(), vec![true; 4]);
    assert_eq!(*cb.started.lock().unwrap(), Some(4));
    assert_eq!(*cb.finished.lock().unwrap(), Some(4));
}

#[test]
fn prefix_defaults_to_source_stem() {
    let dir = tempfile::tempdir().unwrap();
    let src = fixture(dir.path(), "Quarterly Figures.PDF", "pages=2");
    let req = request(&src, &dir.path().join("out"))
        .format(ImageFormat::Bmp)
        .build()
        .unwrap();

    let paths = converter().convert(&req, None).unwrap();
    assert_eq!(
        names(&paths),
        vec!["Quarterly Figures_page_001.bmp", "Quarterly Figures_page_002.bmp"]
    );
}

#[test]
fn every_format_writes_decodable_images() {
    let dir = tempfile::tempdir().unwrap();
    let src = fixture(dir.path(), "multi.pdf", "pages=2");

    for format in ImageFormat::ALL {
        let out = dir.path().join(format.extension());
        let req = request(&src, &out).format(format).dpi(72).build().unwrap();
        let paths = converter().convert(&req, None).unwrap();

        for path in &paths {
            assert_eq!(
                path.extension().unwrap().to_str().unwrap(),
                format.extension()
            );
            let reader = image::ImageReader::open(path)
                .unwrap()
                .with_guessed_format()
                .unwrap();
            assert_eq!(reader.format(), Some(format.to_image_format()), "{path:?}");
            let img = reader.decode().expect("decodable");
            let expected = page_image(0, 72);
            assert_eq!((img.width(), img.height()), (expected.width(), expected.height()));
            if format == ImageFormat::Jpeg {
                assert!(!img.color().has_alpha(), "JPEG output carries alpha: {path:?}");
            }
        }
    }
}

#[test]
fn dpi_controls_pixel_size() {
    let dir = tempfile::tempdir().unwrap();
    let src = fixture(dir.path(), "dpi.pdf", "pages=1");
    let engine = Arc::new(ScriptedEngine::new());
    let conv = Converter::new(engine.clone());

    let low = conv
        .convert(&request(&src, &dir.path().join("low")).dpi(72).build().unwrap(), None)
        .unwrap();
    let high = conv
        .convert(&request(&src, &dir.path().join("high")).dpi(600).build().unwrap(), None)
        .unwrap();

    let low = image::open(&low[0]).unwrap();
    let high = image::open(&high[0]).unwrap();
    assert_eq!(low.width(), 61);
    assert_eq!(high.width(), 510);
    assert_eq!(*engine.dpi_calls.lock().unwrap(), vec![72, 600]);
}

#[test]
fn rerun_overwrites_same_files() {
    let dir = tempfile::tempdir().unwrap();
    let src = fixture(dir.path(), "again.pdf", "pages=3");
    let out = dir.path().join("out");
    let req = request(&src, &out).format(ImageFormat::Jpeg).build().unwrap();

    let first = converter().convert(&req, None).unwrap();
    let listing = dir_listing(&out);
    let second = converter().convert(&req, None).unwrap();

    assert_eq!(first, second);
    assert_eq!(dir_listing(&out), listing);
    assert_eq!(listing.len(), 3);
}

#[test]
fn existing_and_nested_output_dirs_are_fine() {
    let dir = tempfile::tempdir().unwrap();
    let src = fixture(dir.path(), "n.pdf", "pages=1");

    let nested = dir.path().join("a").join("b").join("c");
    let req = request(&src, &nested).build().unwrap();
    converter().convert(&req, None).unwrap();
    assert!(nested.join("n_page_001.png").is_file());

    // Directory now exists; converting again must not fail on creation.
    converter().convert(&req, None).unwrap();
}

#[test]
fn render_failure_aborts_whole_document() {
    let dir = tempfile::tempdir().unwrap();
    let src = fixture(dir.path(), "broken.pdf", "pages=5 fail_at=3");
    let req = request(&src, &dir.path().join("out")).build().unwrap();

    let calls = Mutex::new(Vec::new());
    let on_progress = |current: usize, total: usize| calls.lock().unwrap().push((current, total));
    let err = converter().convert(&req, Some(&on_progress)).unwrap_err();

    assert!(
        matches!(err, Pdf2ImgError::RasterisationFailed { page: 3, .. }),
        "got: {err}"
    );
    assert_eq!(*calls.lock().unwrap(), vec![(1, 5), (2, 5)]);
}

#[test]
fn corrupt_document_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let src = fixture(dir.path(), "corrupt.pdf", "corrupt");
    let req = request(&src, &dir.path().join("out")).build().unwrap();

    let err = converter().convert(&req, None).unwrap_err();
    assert!(matches!(err, Pdf2ImgError::CorruptPdf { .. }), "got: {err}");
}

#[test]
fn source_removed_after_validation_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let src = fixture(dir.path(), "gone.pdf", "pages=2");
    let out = dir.path().join("out");
    let req = request(&src, &out).build().unwrap();
    std::fs::remove_file(&src).unwrap();

    let err = converter().convert(&req, None).unwrap_err();
    assert!(matches!(err, Pdf2ImgError::FileNotFound { .. }), "got: {err}");
    assert!(!out.exists(), "nothing should be created for a missing source");
}

#[test]
fn out_of_range_dpi_on_mutated_request_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let src = fixture(dir.path(), "d.pdf", "pages=1");
    let mut req = request(&src, &dir.path().join("out")).build().unwrap();
    req.dpi = 10;

    let err = converter().convert(&req, None).unwrap_err();
    assert!(matches!(err, Pdf2ImgError::InvalidConfig(_)), "got: {err}");
}

#[test]
fn inspect_goes_through_engine() {
    let dir = tempfile::tempdir().unwrap();
    let src = fixture(dir.path(), "i.pdf", "pages=9");
    let info = converter().inspect(&src).expect("info");
    assert_eq!(info.page_count, 9);
    assert_eq!(info.file_size, "pages=9".len() as u64);

    let bad = fixture(dir.path(), "bad.pdf", "corrupt");
    assert!(converter().inspect(&bad).is_none());
}

// ── Batch ────────────────────────────────────────────────────────────────────

#[test]
fn batch_isolates_corrupt_input() {
    let dir = tempfile::tempdir().unwrap();
    let a = fixture(dir.path(), "validA.pdf", "pages=2");
    let b = fixture(dir.path(), "corruptB.pdf", "corrupt");
    let c = fixture(dir.path(), "validC.pdf", "pages=3");
    let out = dir.path().join("batch");

    let result = batch_convert(
        &converter(),
        &[a.clone(), b.clone(), c.clone()],
        &out,
        ImageFormat::Png,
        150,
    );

    assert_eq!(result.len(), 3);
    let o = result.outcomes();
    assert_eq!(o[0].input_path(), a.as_path());
    assert_eq!(o[1].input_path(), b.as_path());
    assert_eq!(o[2].input_path(), c.as_path());

    assert_eq!(o[0].status(), OutcomeStatus::Success);
    assert_eq!(names(o[0].output_paths()), vec!["validA_page_001.png", "validA_page_002.png"]);
    assert!(o[0].output_paths().iter().all(|p| p.starts_with(out.join("validA"))));

    assert_eq!(o[1].status(), OutcomeStatus::Failed);
    assert!(!o[1].error().unwrap().is_empty());
    assert!(o[1].output_paths().is_empty());

    assert_eq!(o[2].status(), OutcomeStatus::Success);
    assert_eq!(o[2].output_paths().len(), 3);
    assert!(o[2].output_paths().iter().all(|p| p.starts_with(out.join("validC"))));

    assert_eq!((result.succeeded(), result.failed()), (2, 1));
}

#[test]
fn batch_preserves_order_with_mixed_failures() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![
        dir.path().join("missing.pdf"),
        fixture(dir.path(), "ok1.pdf", "pages=1"),
        fixture(dir.path(), "notes.txt", "pages=1"),
        fixture(dir.path(), "empty.pdf", ""),
        fixture(dir.path(), "half.pdf", "pages=4 fail_at=2"),
        fixture(dir.path(), "ok2.pdf", "pages=2"),
    ];

    let result = batch_convert(
        &converter(),
        &inputs,
        &dir.path().join("out"),
        ImageFormat::Jpeg,
        96,
    );

    assert_eq!(result.len(), inputs.len());
    for (outcome, input) in result.iter().zip(&inputs) {
        assert_eq!(outcome.input_path(), input.as_path());
    }

    let statuses: Vec<OutcomeStatus> = result.iter().map(|o| o.status()).collect();
    use OutcomeStatus::{Failed, Success};
    assert_eq!(statuses, vec![Failed, Success, Failed, Failed, Failed, Success]);

    let errors: Vec<&str> = result.iter().filter_map(|o| o.error()).collect();
    assert!(errors[0].contains("file does not exist"));
    assert!(errors[1].contains("not a document of the expected type"));
    assert!(errors[2].contains("file is empty"));
    assert!(errors[3].contains("page 2"));
}

#[test]
fn batch_blocks_caller_until_every_input_is_done() {
    // Known limitation: the batch runs synchronously on the calling thread.
    // When it returns, every input has already been converted.
    let dir = tempfile::tempdir().unwrap();
    let inputs: Vec<_> = (0..3)
        .map(|i| fixture(dir.path(), &format!("f{i}.pdf"), "pages=2"))
        .collect();
    let out = dir.path().join("out");

    let result = batch_convert(&converter(), &inputs, &out, ImageFormat::Png, 72);

    assert_eq!(result.succeeded(), 3);
    for i in 0..3 {
        assert_eq!(
            dir_listing(&out.join(format!("f{i}"))),
            vec![format!("f{i}_page_001.png"), format!("f{i}_page_002.png")]
        );
    }
}

#[test]
fn batch_result_serialises_in_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![
        fixture(dir.path(), "x.pdf", "pages=1"),
        fixture(dir.path(), "y.pdf", "corrupt"),
    ];
    let result = batch_convert(&converter(), &inputs, &dir.path().join("o"), ImageFormat::Png, 72);

    let json = serde_json::to_value(&result).unwrap();
    let arr = json.as_array().expect("array of outcomes");
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["status"], "success");
    assert_eq!(arr[1]["status"], "failed");
    assert!(arr[1]["error"].as_str().unwrap().contains("corrupt"));
}
