//! CLI binary for pdf-ocr.
//!
//! A thin shim over the library crate: maps positionals and flags to an
//! [`Operation`] plus a `ConversionConfig`, runs it, and prints exactly one
//! JSON line on stdout. Logs and the progress bar go to stderr.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use pdf_ocr::{
    convert, ConversionConfig, ConversionProgressCallback, ConversionReport, Operation,
    PdfOcrError, ProgressCallback,
};
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Renders a progress bar on stderr plus one line per recognised page.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_conversion_start
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:40.green/238}] {pos:>3}/{len} pages  ETA {eta}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Recognising");
        self.bar.reset_eta();
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, text_len: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{text_len:>6} bytes")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(error.lines().next().unwrap_or(error)),
        ));
        self.bar.abandon();
    }

    fn on_conversion_complete(&self, _total_pages: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"OPERATIONS:
  pdf_to_word   Recognise every page and save a .docx, one paragraph per page
  pdf_to_text   Recognise every page and save UTF-8 text, pages separated by a blank line

EXAMPLES:
  pdf-ocr pdf_to_text scan.pdf scan.txt
  pdf-ocr pdf_to_word scan.pdf scan.docx
  pdf-ocr --lang eng+deu --progress pdf_to_text scan.pdf out.txt

  Options go before the operation. Anything after the operation is read as
  a path, so a file named -scan.pdf needs no quoting.

OUTPUT:
  Exactly one JSON line on stdout:
    {"success":true,"message":"PDF converted to text successfully"}
    {"success":false,"error":"..."}
  With --error-codes a stable "code" field is added to failures.

  --help and --version print to stderr and the JSON line is still emitted.

EXIT STATUS:
  1 for missing or malformed arguments, 0 otherwise.
  With --strict-exit every failure exits with 1.

ENVIRONMENT VARIABLES:
  PDF_OCR_LANG            Tesseract language(s), e.g. eng or eng+fra
  PDF_OCR_DPI             Rendering DPI
  PDF_OCR_TESSERACT_CMD   Tesseract executable
  PDF_OCR_PASSWORD        Password for encrypted PDFs
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Log filter, overrides -v / -q
"#;

/// Recognise the text of scanned PDFs and save it as Word or plain text.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-ocr",
    version,
    about = "Recognise the text of scanned PDFs and save it as Word or plain text",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP,
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// Operation: pdf_to_word or pdf_to_text.
    operation: Option<String>,

    /// Scanned PDF to read.
    #[arg(allow_hyphen_values = true)]
    input: Option<PathBuf>,

    /// File to write; replaced if it exists.
    #[arg(allow_hyphen_values = true)]
    output: Option<PathBuf>,

    /// Surplus positional values are ignored.
    #[arg(hide = true, allow_hyphen_values = true)]
    extra: Vec<String>,

    /// Print help to stderr.
    #[arg(short = 'h', long)]
    help: bool,

    /// Print version to stderr.
    #[arg(short = 'V', long)]
    version: bool,

    /// Tesseract language code(s), joined with '+'.
    #[arg(long = "lang", env = "PDF_OCR_LANG", default_value = pdf_ocr::config::DEFAULT_LANGUAGE)]
    language: String,

    /// Rendering DPI (72–600).
    #[arg(long, env = "PDF_OCR_DPI", default_value_t = pdf_ocr::config::DEFAULT_DPI,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Tesseract executable name or path.
    #[arg(long, env = "PDF_OCR_TESSERACT_CMD", default_value = "tesseract")]
    tesseract_cmd: String,

    /// Tesseract page segmentation mode (0–13).
    #[arg(long, env = "PDF_OCR_PSM", value_parser = clap::value_parser!(u8).range(0..=13))]
    psm: Option<u8>,

    /// Path to the pdfium library (file or directory).
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Password for encrypted PDFs.
    #[arg(long, env = "PDF_OCR_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Show a progress bar on stderr.
    #[arg(long, env = "PDF_OCR_PROGRESS")]
    progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF_OCR_VERBOSE")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, env = "PDF_OCR_QUIET")]
    quiet: bool,

    /// Exit with status 1 whenever the conversion fails.
    #[arg(long, env = "PDF_OCR_STRICT_EXIT")]
    strict_exit: bool,

    /// Add a stable "code" field to failure reports.
    #[arg(long, env = "PDF_OCR_ERROR_CODES")]
    error_codes: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args: Vec<OsString> = std::env::args_os().collect();
    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(e) => {
            let err = parse_failure(&e, args.get(1..).unwrap_or_default());
            println!("{}", ConversionReport::failure(&err).to_json());
            return ExitCode::FAILURE;
        }
    };

    // Help and version never replace the JSON line on stdout.
    if cli.help {
        eprintln!("{}", Cli::command().render_long_help());
    }
    if cli.version {
        eprintln!("pdf-ocr {}", env!("CARGO_PKG_VERSION"));
    }

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Run + report ─────────────────────────────────────────────────────
    let outcome = run(&cli).await;
    let report = match &outcome {
        Ok(operation) => ConversionReport::success(operation.success_message()),
        Err(e) if cli.error_codes => ConversionReport::failure(e).with_code(e),
        Err(e) => ConversionReport::failure(e),
    };
    println!("{}", report.to_json());

    match outcome {
        Err(e) if e.is_argument_error() || cli.strict_exit => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

/// Dispatch on the operation name, then convert.
async fn run(cli: &Cli) -> Result<Operation, PdfOcrError> {
    let (Some(op_name), Some(input), Some(output)) = (&cli.operation, &cli.input, &cli.output)
    else {
        return Err(PdfOcrError::InsufficientArguments);
    };

    // The operation is checked before the input path is looked at.
    let operation: Operation = op_name.parse()?;

    let progress = if cli.progress && !cli.quiet {
        let cb: ProgressCallback = CliProgressCallback::new();
        Some(cb)
    } else {
        None
    };
    let config = build_config(cli, progress)
        .map_err(|e| PdfOcrError::InvalidArguments(format!("{e:#}")))?;

    let output = convert(operation, input, output, &config).await?;
    tracing::info!(
        "{} pages → {} ({} bytes, {}ms)",
        output.stats.processed_pages,
        output.output_path.display(),
        output.stats.output_bytes,
        output.stats.total_duration_ms
    );
    Ok(operation)
}

/// Turn a clap failure into the reported error. Fewer than three positional
/// values is always "Insufficient arguments", whatever else went wrong.
fn parse_failure(e: &clap::Error, args: &[OsString]) -> PdfOcrError {
    if count_positionals(args) < 3 {
        return PdfOcrError::InsufficientArguments;
    }
    let rendered = e.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    PdfOcrError::InvalidArguments(first.trim_start_matches("error: ").trim().to_string())
}

/// Count positional values in `args` (program name excluded).
///
/// Mirrors the parser: options are only recognised up to and right after the
/// operation, long options that take a value consume the next argument, and
/// everything after `--` is positional.
fn count_positionals(args: &[OsString]) -> usize {
    let cmd = Cli::command();
    let takes_value = |name: &str| {
        cmd.get_arguments()
            .any(|a| a.get_long() == Some(name) && a.get_action().takes_values())
    };
    let is_short = |c: char| cmd.get_arguments().any(|a| a.get_short() == Some(c));

    let mut count = 0;
    let mut iter = args.iter().map(|a| a.to_string_lossy());
    while let Some(arg) = iter.next() {
        if arg == "--" {
            count += iter.by_ref().count();
            break;
        }
        if count >= 2 || arg == "-" || !arg.starts_with('-') {
            count += 1;
            continue;
        }
        if let Some(long) = arg.strip_prefix("--") {
            if !long.contains('=') && takes_value(long) {
                iter.next();
            }
            continue;
        }
        // After the operation a short cluster with any unknown letter is a path.
        if count == 1 && !arg[1..].chars().all(is_short) {
            count += 1;
        }
    }
    count
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .language(cli.language.clone())
        .tesseract_cmd(cli.tesseract_cmd.clone());

    if let Some(psm) = cli.psm {
        builder = builder.page_seg_mode(psm);
    }
    if let Some(ref path) = cli.pdfium_lib_path {
        builder = builder.pdfium_lib_path(path.clone());
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
