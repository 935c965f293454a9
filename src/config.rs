//! Configuration types for PDF OCR conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The OCR language, the engine binary and
//! the pdfium location are ordinary fields here rather than process-wide
//! defaults, so two conversions in one process can use different settings.

use crate::error::PdfOcrError;
use crate::pipeline::ocr::Recognizer;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default rendering resolution for scanned pages.
pub const DEFAULT_DPI: u32 = 300;

/// Default tesseract language code.
pub const DEFAULT_LANGUAGE: &str = "eng";

/// Configuration for a PDF OCR conversion.
///
/// # Example
/// ```rust
/// use pdf_ocr::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .dpi(300)
///     .language("eng+deu")
///     .build()
///     .unwrap();
/// assert_eq!(config.language, "eng+deu");
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–600. Default: 300.
    ///
    /// Tesseract is trained on text around 300 DPI; lower values lose small
    /// print, higher values mostly cost time.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 10 000.
    ///
    /// A cap independent of DPI so an oversized page (posters, engineering
    /// drawings) cannot allocate an unbounded bitmap.
    pub max_rendered_pixels: u32,

    /// Tesseract language code(s), e.g. `"eng"` or `"eng+fra"`. Default: `"eng"`.
    pub language: String,

    /// Tesseract executable name or path. Default: `"tesseract"`.
    pub tesseract_cmd: String,

    /// Tesseract page segmentation mode (`--psm`). `None` keeps the engine default.
    pub page_seg_mode: Option<u8>,

    /// Explicit pdfium library location (file or directory).
    /// If None, `PDFIUM_LIB_PATH` and then the system library path are tried.
    pub pdfium_lib_path: Option<PathBuf>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Pre-constructed recognizer. Takes precedence over the tesseract settings.
    pub recognizer: Option<Arc<dyn Recognizer>>,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            max_rendered_pixels: 10_000,
            language: DEFAULT_LANGUAGE.to_string(),
            tesseract_cmd: "tesseract".to_string(),
            page_seg_mode: None,
            pdfium_lib_path: None,
            password: None,
            recognizer: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("language", &self.language)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .field("page_seg_mode", &self.page_seg_mode)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "recognizer",
                &self.recognizer.as_ref().map(|r| r.name().to_string()),
            )
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = language.into();
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    pub fn page_seg_mode(mut self, psm: u8) -> Self {
        self.config.page_seg_mode = Some(psm);
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn recognizer(mut self, recognizer: Arc<dyn Recognizer>) -> Self {
        self.config.recognizer = Some(recognizer);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, PdfOcrError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(PdfOcrError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if !is_valid_language(&c.language) {
            return Err(PdfOcrError::InvalidConfig(format!(
                "Invalid OCR language '{}': expected codes like 'eng' or 'eng+fra'",
                c.language
            )));
        }
        if c.tesseract_cmd.trim().is_empty() {
            return Err(PdfOcrError::InvalidConfig(
                "Tesseract command must not be empty".into(),
            ));
        }
        if let Some(psm) = c.page_seg_mode {
            if psm > 13 {
                return Err(PdfOcrError::InvalidConfig(format!(
                    "Page segmentation mode must be 0–13, got {psm}"
                )));
            }
        }
        Ok(self.config)
    }
}

/// Tesseract language codes are `+`-joined tokens of ASCII letters, digits and `_`.
fn is_valid_language(language: &str) -> bool {
    !language.is_empty()
        && language.split('+').all(|code| {
            !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_scanning_profile() {
        let c = ConversionConfig::default();
        assert_eq!(c.dpi, 300);
        assert_eq!(c.language, "eng");
        assert_eq!(c.tesseract_cmd, "tesseract");
        assert!(c.recognizer.is_none());
    }

    #[test]
    fn builder_rejects_out_of_range_dpi() {
        assert!(ConversionConfig::builder().dpi(50).build().is_err());
        assert!(ConversionConfig::builder().dpi(601).build().is_err());
        assert!(ConversionConfig::builder().dpi(72).build().is_ok());
    }

    #[test]
    fn builder_validates_language_codes() {
        assert!(ConversionConfig::builder().language("eng+fra").build().is_ok());
        assert!(ConversionConfig::builder().language("chi_sim").build().is_ok());
        assert!(ConversionConfig::builder().language("").build().is_err());
        assert!(ConversionConfig::builder().language("eng+").build().is_err());
        assert!(ConversionConfig::builder().language("en g").build().is_err());
    }

    #[test]
    fn builder_validates_psm() {
        assert!(ConversionConfig::builder().page_seg_mode(6).build().is_ok());
        assert!(ConversionConfig::builder().page_seg_mode(14).build().is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let c = ConversionConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
