//! # pdf-ocr
//!
//! Recognise the text of scanned PDF documents and save it as a Word document
//! or a plain text file.
//!
//! Scanned PDFs carry page images, not text, so extraction tools come back
//! empty. This crate rasterises each page with pdfium, hands the image to an
//! OCR engine (tesseract by default) and assembles the recognised text in
//! page order.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     check the file exists and starts with %PDF
//!  ├─ 2. Render    rasterise one page at a time via pdfium (spawn_blocking)
//!  ├─ 3. Encode    PNG bytes, piped straight into the engine
//!  ├─ 4. OCR       tesseract (or any injected Recognizer)
//!  ├─ 5. Clean     strip the engine's trailing page terminator
//!  └─ 6. Output    .docx (one paragraph per page) or .txt, written atomically
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_ocr::{convert, ConversionConfig, Operation};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder().language("eng").build()?;
//!     let output = convert(Operation::PdfToText, "scan.pdf", "scan.txt", &config).await?;
//!     eprintln!("{} pages in {}ms",
//!         output.stats.processed_pages,
//!         output.stats.total_duration_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-ocr` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf-ocr = { version = "0.1", default-features = false }
//! ```
//!
//! ## Runtime Requirements
//!
//! A pdfium shared library (located through the config, `PDFIUM_LIB_PATH` or
//! the system library path) and, unless a custom [`Recognizer`] is injected,
//! a `tesseract` executable with the requested language data installed.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_from_bytes, convert_sync, inspect, Operation};
pub use error::{ErrorCategory, PdfOcrError};
pub use output::{
    ConversionOutput, ConversionReport, ConversionStats, DocumentMetadata, OutputFormat, PageText,
};
pub use pipeline::ocr::{Recognizer, TesseractRecognizer};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
