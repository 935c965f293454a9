//! Output types: per-page text, document metadata, run statistics and the
//! JSON result object printed by the binary.

use crate::error::PdfOcrError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Recognised text of one page, after cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// 1-indexed page number in the source PDF.
    pub page_num: usize,
    pub text: String,
}

/// Document-level metadata read from the PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

/// The kind of artifact written to the output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// UTF-8 text, pages separated by a blank line.
    Text,
    /// Office Open XML word-processing document, one page per paragraph.
    Docx,
}

/// Timing and size figures for a finished conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages in the source document.
    pub total_pages: usize,
    /// Pages rendered and recognised.
    pub processed_pages: usize,
    pub render_duration_ms: u64,
    pub ocr_duration_ms: u64,
    pub total_duration_ms: u64,
    /// Size of the written artifact.
    pub output_bytes: u64,
}

/// Everything a successful conversion produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub output_path: PathBuf,
    pub format: OutputFormat,
    pub pages: Vec<PageText>,
    pub metadata: DocumentMetadata,
    pub stats: ConversionStats,
}

/// The single JSON object reported for a run.
///
/// Serialises as `{"success":true,"message":"…"}` or
/// `{"success":false,"error":"…"}`; `code` is only present when requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReport {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ConversionReport {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
            code: None,
        }
    }

    pub fn failure(err: &PdfOcrError) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(err.to_string()),
            code: None,
        }
    }

    /// Attach the stable error category of `err`.
    pub fn with_code(mut self, err: &PdfOcrError) -> Self {
        self.code = Some(err.category().as_str().to_string());
        self
    }

    /// Serialise to a single JSON line.
    pub fn to_json(&self) -> String {
        // A struct of bools and strings cannot fail to serialise.
        serde_json::to_string(self).unwrap_or_else(|_| {
            String::from(r#"{"success":false,"error":"Internal error: report serialisation"}"#)
        })
    }
}
