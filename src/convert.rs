//! Conversion entry points.
//!
//! [`convert`] runs one operation end to end: validate the input, render and
//! recognise every page in order, assemble the artifact and write
//! it. Pages are processed strictly one after another on a single blocking
//! worker; pdfium and the engine subprocess are both blocking APIs.

use crate::config::ConversionConfig;
use crate::error::PdfOcrError;
use crate::output::{ConversionOutput, ConversionStats, DocumentMetadata, OutputFormat};
use crate::pipeline::{assemble, input, ocr, render};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info};

/// The operations the tool knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Scanned PDF → `.docx`, one page per paragraph.
    PdfToWord,
    /// Scanned PDF → UTF-8 text, pages separated by a blank line.
    PdfToText,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::PdfToWord => "pdf_to_word",
            Operation::PdfToText => "pdf_to_text",
        }
    }

    pub fn output_format(self) -> OutputFormat {
        match self {
            Operation::PdfToWord => OutputFormat::Docx,
            Operation::PdfToText => OutputFormat::Text,
        }
    }

    /// Message reported on success.
    pub fn success_message(self) -> &'static str {
        match self {
            Operation::PdfToWord => "PDF converted to Word successfully",
            Operation::PdfToText => "PDF converted to text successfully",
        }
    }
}

impl FromStr for Operation {
    type Err = PdfOcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf_to_word" => Ok(Operation::PdfToWord),
            "pdf_to_text" => Ok(Operation::PdfToText),
            other => Err(PdfOcrError::UnknownOperation {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run `operation` on the PDF at `input_path`, writing the result to `output_path`.
///
/// Any existing file at `output_path` is replaced.
///
/// # Errors
/// The first failure aborts the run: unreadable or invalid input, a page that
/// cannot be rendered or recognised, or an output path that cannot be written.
pub async fn convert(
    operation: Operation,
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, PdfOcrError> {
    let total_start = Instant::now();
    let output_path = output_path.as_ref();
    info!(
        "Starting {}: {} → {}",
        operation,
        input_path.as_ref().display(),
        output_path.display()
    );

    // ── Step 1: Validate input ───────────────────────────────────────────
    let pdf_path = input::resolve_local(input_path.as_ref())?;

    // ── Step 2: Render + recognise, one page at a time ───────────────────
    let recognizer = ocr::resolve_recognizer(config);
    let cfg = config.clone();
    let (metadata, recognised) = tokio::task::spawn_blocking(move || {
        recognizer.check_available()?;
        debug!("Recognizer '{}' ready", recognizer.name());

        render::with_pages(&pdf_path, &cfg, |metadata, total, pages| {
            let recognised = assemble::recognise_pages(
                pages,
                total,
                recognizer.as_ref(),
                cfg.progress_callback.as_ref(),
            )?;
            Ok((metadata.clone(), recognised))
        })
    })
    .await
    .map_err(|e| PdfOcrError::Internal(format!("OCR task panicked: {}", e)))??;

    // ── Step 3: Assemble + write ─────────────────────────────────────────
    let format = operation.output_format();
    let bytes = assemble::assemble(format, &recognised.pages, &metadata)?;
    assemble::write_output(output_path, &bytes).await?;

    let stats = ConversionStats {
        total_pages: metadata.page_count,
        processed_pages: recognised.pages.len(),
        render_duration_ms: recognised.render_duration.as_millis() as u64,
        ocr_duration_ms: recognised.ocr_duration.as_millis() as u64,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        output_bytes: bytes.len() as u64,
    };

    info!(
        "Conversion complete: {}/{} pages, {}ms total",
        stats.processed_pages, stats.total_pages, stats.total_duration_ms
    );

    Ok(ConversionOutput {
        output_path: output_path.to_path_buf(),
        format,
        pages: recognised.pages,
        metadata,
        stats,
    })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary current-thread tokio runtime internally.
pub fn convert_sync(
    operation: Operation,
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, PdfOcrError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| PdfOcrError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(operation, input_path, output_path, config))
}

/// Convert PDF bytes held in memory.
///
/// The bytes are spilled to a managed temp file which is removed when this
/// call returns, whether it succeeds or not.
///
/// # Example
/// ```rust,no_run
/// use pdf_ocr::{convert_from_bytes, ConversionConfig, Operation};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes: Vec<u8> = std::fs::read("scan.pdf")?;
/// let config = ConversionConfig::default();
/// let output = convert_from_bytes(Operation::PdfToText, &bytes, "scan.txt", &config).await?;
/// println!("{} pages", output.stats.processed_pages);
/// # Ok(())
/// # }
/// ```
pub async fn convert_from_bytes(
    operation: Operation,
    bytes: &[u8],
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, PdfOcrError> {
    let mut tmp = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| PdfOcrError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| PdfOcrError::Internal(format!("tempfile write: {e}")))?;
    tmp.flush()
        .map_err(|e| PdfOcrError::Internal(format!("tempfile flush: {e}")))?;
    // `tmp` is dropped (and the file deleted) when `convert` returns
    convert(operation, tmp.path(), output_path, config).await
}

/// Read PDF metadata without rendering or recognising anything.
///
/// Does not require an OCR engine.
pub async fn inspect(
    input_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<DocumentMetadata, PdfOcrError> {
    let pdf_path = input::resolve_local(input_path.as_ref())?;
    let cfg = config.clone();
    tokio::task::spawn_blocking(move || render::extract_metadata(&pdf_path, &cfg))
        .await
        .map_err(|e| PdfOcrError::Internal(format!("Metadata task panicked: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_names_round_trip() {
        for op in [Operation::PdfToWord, Operation::PdfToText] {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let err = "foo".parse::<Operation>().unwrap_err();
        assert!(matches!(err, PdfOcrError::UnknownOperation { ref name } if name == "foo"));
        assert_eq!(err.to_string(), "Unknown operation");
        // Names are case-sensitive.
        assert!("PDF_TO_TEXT".parse::<Operation>().is_err());
    }

    #[test]
    fn operations_map_to_formats_and_messages() {
        assert_eq!(Operation::PdfToWord.output_format(), OutputFormat::Docx);
        assert_eq!(Operation::PdfToText.output_format(), OutputFormat::Text);
        assert_eq!(
            Operation::PdfToWord.success_message(),
            "PDF converted to Word successfully"
        );
        assert_eq!(
            Operation::PdfToText.success_message(),
            "PDF converted to text successfully"
        );
    }

    #[tokio::test]
    async fn missing_input_fails_before_any_engine_runs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let config = ConversionConfig::builder()
            .tesseract_cmd("/definitely/not/tesseract")
            .build()
            .unwrap();

        let err = convert(Operation::PdfToText, "/no/such/scan.pdf", &out, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, PdfOcrError::FileNotFound { .. }));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn unavailable_engine_is_reported_before_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.docx");
        let config = ConversionConfig::builder()
            .tesseract_cmd("/definitely/not/tesseract")
            .build()
            .unwrap();

        let err = convert_from_bytes(Operation::PdfToWord, b"%PDF-1.4\n%%EOF\n", &out, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, PdfOcrError::EngineUnavailable { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn convert_sync_reports_not_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.pdf");
        std::fs::write(&input, b"plain text, not a pdf").unwrap();

        let err = convert_sync(
            Operation::PdfToText,
            &input,
            dir.path().join("out.txt"),
            &ConversionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PdfOcrError::NotAPdf { .. }));
    }
}
