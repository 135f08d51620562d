//! CLI binary for pdf2img.
//!
//! A thin shim over the library crate: maps flags to a `ConversionRequest`,
//! runs a single document on a background task with a live progress bar, or
//! runs a batch and prints a success/failure summary.

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2img::{
    batch_convert_with, expand_inputs, format_file_size, ConversionOutcome, ConversionRequest,
    ConversionTask, Converter, ImageFormat, TaskEvent, ValidationReport,
};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

fn spinner(prefix: &'static str, msg: &str) -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS),
    );
    bar.set_prefix(prefix);
    bar.set_message(msg.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Switch `bar` to the counter style once the total is known.
fn activate_bar(bar: &ProgressBar, total: usize, unit: &str, prefix: &'static str) {
    let style = ProgressStyle::with_template(&format!(
        "{{spinner:.cyan}} {{prefix:.bold}}  [{{bar:42.green/238}}] {{pos:>3}}/{{len}} {unit}  \
         ⏱ {{elapsed_precise}}  ETA {{eta_precise}}"
    ))
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("█▉▊▋▌▍▎▏  ")
    .tick_strings(TICKS);

    bar.set_length(total as u64);
    bar.set_style(style);
    bar.set_prefix(prefix);
    bar.reset_eta();
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # One document, PNG at 200 DPI into ./output
  pdf2img document.pdf

  # JPEG at 300 DPI with a custom file prefix
  pdf2img -f jpeg --dpi 300 --prefix scan document.pdf -o pages/

  # Batch: every PDF in a folder plus one extra file
  pdf2img --batch ./invoices extra.pdf -o converted/

  # Page count, title, author and size only
  pdf2img --inspect-only document.pdf

  # Machine-readable batch report
  pdf2img --json --batch ./invoices > report.json

OUTPUT LAYOUT:
  single:  {output}/{prefix}_page_001.png, _page_002.png, …
  batch:   {output}/{file stem}/{file stem}_page_001.png, …

INPUT LIMITS:
  Only .pdf files (any case), 1 byte to 100 MiB.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to an existing libpdfium
  RUST_LOG                Override log filtering (e.g. pdf2img=debug)
"#;

/// Convert PDF documents to PNG, JPEG, BMP or TIFF page images.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2img",
    version,
    about = "Convert PDF documents to page images (PNG/JPEG/BMP/TIFF)",
    long_about = "Rasterise every page of one or more PDF documents into image files. \
A single document is converted on a background worker with a live progress bar; \
several documents (or a folder) are converted one after another into per-document \
subfolders, and failures are reported without stopping the batch.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF files or folders (a folder contributes the PDFs directly inside it).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory.
    #[arg(short, long, env = "PDF2IMG_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Output image format.
    #[arg(short, long, env = "PDF2IMG_FORMAT", value_enum, default_value = "png")]
    format: FormatArg,

    /// Rendering DPI (72–600).
    #[arg(long, env = "PDF2IMG_DPI", default_value_t = pdf2img::DEFAULT_DPI,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Filename prefix for page images (single mode). Default: the PDF's file stem.
    #[arg(long, env = "PDF2IMG_PREFIX")]
    prefix: Option<String>,

    /// Force batch mode even for a single input.
    #[arg(long, env = "PDF2IMG_BATCH")]
    batch: bool,

    /// Print validation result and document info only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Print results as JSON on stdout.
    #[arg(long, env = "PDF2IMG_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2IMG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level logs.
    #[arg(short, long, env = "PDF2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2IMG_QUIET")]
    quiet: bool,

    /// Append-only operational log file.
    #[arg(long, env = "PDF2IMG_LOG_FILE", default_value = "pdf2img.log")]
    log_file: PathBuf,

    /// Do not write the log file.
    #[arg(long, env = "PDF2IMG_NO_LOG_FILE")]
    no_log_file: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Png,
    #[value(alias = "jpg")]
    Jpeg,
    Bmp,
    #[value(alias = "tif")]
    Tiff,
}

impl From<FormatArg> for ImageFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Png => ImageFormat::Png,
            FormatArg::Jpeg => ImageFormat::Jpeg,
            FormatArg::Bmp => ImageFormat::Bmp,
            FormatArg::Tiff => ImageFormat::Tiff,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The progress bar provides all the feedback that matters on stderr; the
    // log file still records INFO so the run history is complete.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    init_logging(&cli, show_progress)?;

    let inputs = expand_inputs(&cli.inputs).context("Failed to collect input files")?;
    if inputs.is_empty() {
        bail!("No PDF files to convert");
    }

    let converter = Converter::pdfium();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        return inspect_inputs(&converter, &inputs, cli.json);
    }

    std::fs::create_dir_all(&cli.output_dir).with_context(|| {
        format!("Failed to create output directory {:?}", cli.output_dir)
    })?;

    let batch_mode = cli.batch || inputs.len() > 1 || cli.inputs.iter().any(|p| p.is_dir());
    if batch_mode {
        run_batch(&cli, &converter, &inputs, show_progress)
    } else {
        run_single(&cli, converter, &inputs[0], show_progress).await
    }
}

/// One process-wide subscriber: stderr plus the append-only log file.
fn init_logging(cli: &Cli, show_progress: bool) -> Result<()> {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)));

    let file_layer = if cli.no_log_file {
        None
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&cli.log_file)
            .with_context(|| format!("Failed to open log file {:?}", cli.log_file))?;
        let file_level = if cli.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(file_level),
        )
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(())
}

fn inspect_inputs(converter: &Converter, inputs: &[PathBuf], json: bool) -> Result<()> {
    let mut reports = Vec::with_capacity(inputs.len());

    for path in inputs {
        let validation = ValidationReport::check(path);
        let info = if validation.is_valid {
            converter.inspect(path)
        } else {
            None
        };

        if json {
            reports.push(serde_json::json!({
                "path": path,
                "validation": validation,
                "info": info,
            }));
            continue;
        }

        println!("File:         {}", path.display());
        if !validation.is_valid {
            println!("Invalid:      {}", validation.reason);
            continue;
        }
        match info {
            Some(info) => {
                println!("Pages:        {}", info.page_count);
                println!("Title:        {}", info.title.as_deref().unwrap_or("unknown"));
                println!("Author:       {}", info.author.as_deref().unwrap_or("unknown"));
                println!("Size:         {}", format_file_size(info.file_size));
            }
            None => println!("Info:         unable to read PDF information"),
        }
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&reports).context("Failed to serialise report")?
        );
    }
    Ok(())
}

async fn run_single(
    cli: &Cli,
    converter: Converter,
    input: &Path,
    show_progress: bool,
) -> Result<()> {
    let request = ConversionRequest::builder(input, &cli.output_dir)
        .format(cli.format.into())
        .dpi(cli.dpi)
        .maybe_prefix(cli.prefix.clone())
        .build()
        .context("Cannot convert")?;

    let started = Instant::now();
    info!("Starting conversion of {}", input.display());
    let mut task = ConversionTask::spawn(converter, request);

    let bar = show_progress.then(|| spinner("Preparing", "Opening PDF…"));

    let result = loop {
        match task.next_event().await {
            Some(TaskEvent::Progress { current, total }) => {
                info!("Progress: {}/{} pages", current, total);
                if let Some(ref bar) = bar {
                    if current == 1 {
                        activate_bar(bar, total, "pages", "Converting");
                    }
                    bar.set_position(current as u64);
                }
            }
            Some(TaskEvent::Completed(paths)) => break Ok(paths),
            Some(TaskEvent::Failed(message)) => break Err(message),
            None => break Err("conversion task ended without a result".to_string()),
        }
    };

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    match result {
        Ok(paths) => {
            info!("Conversion finished: {} images", paths.len());
            if cli.json {
                let report = serde_json::json!({
                    "input": input,
                    "output_paths": paths,
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("Failed to serialise output")?
                );
            } else if !cli.quiet {
                eprintln!(
                    "{} {} images written in {:.1}s  →  {}",
                    green("✔"),
                    bold(&paths.len().to_string()),
                    started.elapsed().as_secs_f64(),
                    bold(&cli.output_dir.display().to_string()),
                );
            }
            Ok(())
        }
        Err(message) => bail!("Conversion failed:\n{message}"),
    }
}

fn run_batch(
    cli: &Cli,
    converter: &Converter,
    inputs: &[PathBuf],
    show_progress: bool,
) -> Result<()> {
    if cli.prefix.is_some() {
        eprintln!(
            "{} --prefix is ignored in batch mode; each file uses its own name",
            cyan("⚠")
        );
    }

    let bar = show_progress.then(|| {
        let bar = spinner("Batch", "");
        activate_bar(&bar, inputs.len(), "files", "Batch");
        bar
    });

    // The batch runs to completion on this thread; nothing else is serviced
    // until it returns.
    let result = tokio::task::block_in_place(|| {
        batch_convert_with(
            converter,
            inputs,
            &cli.output_dir,
            cli.format.into(),
            cli.dpi,
            |_done, _total, outcome| {
                if let Some(ref bar) = bar {
                    bar.println(outcome_line(outcome));
                    bar.inc(1);
                }
            },
        )
    });

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialise batch result")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{} Batch complete: {} succeeded, {} failed  ({} images)",
            if result.failed() == 0 {
                green("✔")
            } else if result.succeeded() == 0 {
                red("✘")
            } else {
                cyan("⚠")
            },
            bold(&result.succeeded().to_string()),
            red(&result.failed().to_string()),
            result.total_images(),
        );
        if result.failed() > 0 {
            eprintln!("Failed files:");
            for outcome in result.failures() {
                eprintln!(
                    "  {} {}  {}",
                    red("✗"),
                    outcome.input_path().display(),
                    dim(outcome.error().unwrap_or("unknown error")),
                );
            }
        }
    }

    info!(
        "Batch finished: {} succeeded, {} failed",
        result.succeeded(),
        result.failed()
    );

    if result.failed() > 0 {
        bail!("{} of {} files failed", result.failed(), result.len());
    }
    Ok(())
}

fn outcome_line(outcome: &ConversionOutcome) -> String {
    let name = outcome.input_path().display().to_string();
    match outcome.error() {
        None => format!(
            "  {} {}  {}",
            green("✓"),
            name,
            dim(&format!("{} pages", outcome.output_paths().len()))
        ),
        Some(err) => {
            // Truncate very long error messages to keep output tidy.
            let msg = match err.char_indices().nth(80) {
                Some((cut, _)) => format!("{}\u{2026}", &err[..cut]),
                None => err.to_string(),
            };
            format!("  {} {}  {}", red("✗"), name, red(&msg))
        }
    }
}
