//! Error types for the pdf-ocr library.
//!
//! Every failure is fatal: a page that cannot be rendered or recognised aborts
//! the whole run, so there is a single error type, [`PdfOcrError`]. Each
//! variant belongs to an [`ErrorCategory`], a stable machine-readable code
//! that callers can match on instead of parsing the message text.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf-ocr library and binary.
#[derive(Debug, Error)]
pub enum PdfOcrError {
    // ── Argument errors ───────────────────────────────────────────────────
    /// Fewer than three positional arguments were supplied.
    #[error("Insufficient arguments")]
    InsufficientArguments,

    /// Any other malformed command line.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The operation name is not one of the supported operations.
    #[error("Unknown operation")]
    UnknownOperation { name: String },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Render errors ─────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install libpdfium for your platform, then either:\n\
  • place it on the system library search path, or\n\
  • set PDFIUM_LIB_PATH=/path/to/libpdfium (file or directory).\n"
    )]
    PdfiumBindingFailed(String),

    // ── Recognition errors ────────────────────────────────────────────────
    /// The OCR engine binary could not be started.
    #[error("OCR engine '{engine}' is not available: {detail}\nInstall tesseract or set PDF_OCR_TESSERACT_CMD.")]
    EngineUnavailable { engine: String, detail: String },

    /// The configured recognition language has no trained data installed.
    #[error("OCR language '{language}' is not installed.\nInstalled languages: {installed}")]
    LanguageNotInstalled { language: String, installed: String },

    /// The engine ran but failed on a page image.
    #[error("Text recognition failed for page {page}: {detail}")]
    RecognitionFailed { page: usize, detail: String },

    /// A rendered page could not be encoded for the engine.
    #[error("Image encoding failed for page {page}: {source}")]
    ImageEncodingFailed {
        page: usize,
        #[source]
        source: image::ImageError,
    },

    // ── Write errors ──────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The Word document package could not be assembled.
    #[error("Failed to build Word document: {0}")]
    DocumentBuildFailed(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PdfOcrError {
    /// Stable category of this error, independent of the message text.
    pub fn category(&self) -> ErrorCategory {
        use PdfOcrError::*;
        match self {
            InsufficientArguments | InvalidArguments(_) => ErrorCategory::Argument,
            UnknownOperation { .. } => ErrorCategory::UnknownOperation,
            FileNotFound { .. } | PermissionDenied { .. } | NotAPdf { .. } => ErrorCategory::Input,
            CorruptPdf { .. }
            | PasswordRequired { .. }
            | WrongPassword { .. }
            | RasterisationFailed { .. }
            | PdfiumBindingFailed(_) => ErrorCategory::Render,
            EngineUnavailable { .. }
            | LanguageNotInstalled { .. }
            | RecognitionFailed { .. }
            | ImageEncodingFailed { .. } => ErrorCategory::Recognition,
            OutputWriteFailed { .. } | DocumentBuildFailed(_) => ErrorCategory::Write,
            InvalidConfig(_) => ErrorCategory::Config,
            Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Whether the command line itself was at fault.
    pub fn is_argument_error(&self) -> bool {
        self.category() == ErrorCategory::Argument
    }
}

/// Machine-readable error classes, serialised as snake_case codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Argument,
    UnknownOperation,
    Input,
    Render,
    Recognition,
    Write,
    Config,
    Internal,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Argument => "argument",
            ErrorCategory::UnknownOperation => "unknown_operation",
            ErrorCategory::Input => "input",
            ErrorCategory::Render => "render",
            ErrorCategory::Recognition => "recognition",
            ErrorCategory::Write => "write",
            ErrorCategory::Config => "config",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
