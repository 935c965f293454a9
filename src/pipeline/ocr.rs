//! Text recognition: the [`Recognizer`] seam and its tesseract implementation.
//!
//! The tesseract CLI reads the image from stdin and writes the text to stdout
//! (`tesseract stdin stdout`), so a page never touches the filesystem on its
//! way to the engine. The PNG is written from a helper thread while the main
//! thread drains stdout/stderr; writing first and reading afterwards can
//! deadlock once the child fills its stderr pipe.

use crate::config::ConversionConfig;
use crate::error::PdfOcrError;
use crate::pipeline::encode;
use crate::pipeline::render::PageImage;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::{debug, warn};

/// Turns one rendered page into text.
///
/// Implementations must be `Send + Sync`: the page loop runs on a blocking
/// worker thread.
pub trait Recognizer: Send + Sync {
    /// Short engine name used in logs and errors.
    fn name(&self) -> &str;

    /// Verify the engine can run with the configured settings.
    ///
    /// Called once before the first page is rendered.
    fn check_available(&self) -> Result<(), PdfOcrError> {
        Ok(())
    }

    /// Recognise the text of a single page.
    fn recognize(&self, page: &PageImage) -> Result<String, PdfOcrError>;
}

/// Drives the `tesseract` command-line engine.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    command: String,
    language: String,
    page_seg_mode: Option<u8>,
}

impl TesseractRecognizer {
    pub fn new(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
            page_seg_mode: None,
        }
    }

    pub fn from_config(config: &ConversionConfig) -> Self {
        Self {
            command: config.tesseract_cmd.clone(),
            language: config.language.clone(),
            page_seg_mode: config.page_seg_mode,
        }
    }

    pub fn with_page_seg_mode(mut self, psm: u8) -> Self {
        self.page_seg_mode = Some(psm);
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    fn args(&self, dpi: u32) -> Vec<String> {
        let mut args = vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.language.clone(),
            "--dpi".to_string(),
            dpi.to_string(),
        ];
        if let Some(psm) = self.page_seg_mode {
            args.push("--psm".to_string());
            args.push(psm.to_string());
        }
        args
    }

    fn unavailable(&self, e: std::io::Error) -> PdfOcrError {
        PdfOcrError::EngineUnavailable {
            engine: self.command.clone(),
            detail: e.to_string(),
        }
    }
}

impl Recognizer for TesseractRecognizer {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn check_available(&self) -> Result<(), PdfOcrError> {
        let output = Command::new(&self.command)
            .arg("--list-langs")
            .output()
            .map_err(|e| self.unavailable(e))?;

        // Older releases print the list on stderr.
        let listing = format!(
            "{}\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        let installed = parse_installed_languages(&listing);
        debug!("tesseract languages: {:?}", installed);

        if let Some(missing) = missing_language(&self.language, &installed) {
            return Err(PdfOcrError::LanguageNotInstalled {
                language: missing.to_string(),
                installed: installed.join(", "),
            });
        }
        Ok(())
    }

    fn recognize(&self, page: &PageImage) -> Result<String, PdfOcrError> {
        let page_num = page.page_num();
        let png = encode::encode_png(&page.image).map_err(|source| {
            PdfOcrError::ImageEncodingFailed {
                page: page_num,
                source,
            }
        })?;

        let mut child = Command::new(&self.command)
            .args(self.args(page.dpi))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.unavailable(e))?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            PdfOcrError::Internal("tesseract stdin was not captured".to_string())
        })?;
        let writer = std::thread::spawn(move || stdin.write_all(&png));

        let output = child
            .wait_with_output()
            .map_err(|e| PdfOcrError::RecognitionFailed {
                page: page_num,
                detail: e.to_string(),
            })?;

        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                // The engine closed stdin early; its exit status tells why.
                warn!("Page {}: writing image to tesseract failed: {}", page_num, e);
            }
            Err(_) => {
                return Err(PdfOcrError::Internal(
                    "tesseract stdin writer panicked".to_string(),
                ))
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PdfOcrError::RecognitionFailed {
                page: page_num,
                detail: format!("{} ({})", stderr.trim(), output.status),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| PdfOcrError::RecognitionFailed {
            page: page_num,
            detail: format!("engine produced invalid UTF-8: {e}"),
        })
    }
}

/// Pick the configured recognizer, falling back to tesseract.
pub fn resolve_recognizer(config: &ConversionConfig) -> Arc<dyn Recognizer> {
    match config.recognizer {
        Some(ref recognizer) => Arc::clone(recognizer),
        None => Arc::new(TesseractRecognizer::from_config(config)),
    }
}

/// Parse `tesseract --list-langs` output into language codes.
fn parse_installed_languages(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.contains(' ') && !l.ends_with(':'))
        .map(str::to_string)
        .collect()
}

/// First `+`-joined component of `language` missing from `installed`.
fn missing_language<'a>(language: &'a str, installed: &[String]) -> Option<&'a str> {
    language
        .split('+')
        .find(|code| !installed.iter().any(|i| i == code))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_LANGS: &str = "List of available languages in \"/usr/share/tesseract-ocr/5/tessdata/\" (3):\neng\nosd\nfra\n";

    #[test]
    fn parses_list_langs_output() {
        assert_eq!(
            parse_installed_languages(LIST_LANGS),
            vec!["eng", "osd", "fra"]
        );
    }

    #[test]
    fn detects_missing_language_component() {
        let installed = parse_installed_languages(LIST_LANGS);
        assert_eq!(missing_language("eng", &installed), None);
        assert_eq!(missing_language("eng+fra", &installed), None);
        assert_eq!(missing_language("eng+deu", &installed), Some("deu"));
    }

    #[test]
    fn args_carry_language_dpi_and_psm() {
        let t = TesseractRecognizer::new("tesseract", "eng").with_page_seg_mode(6);
        assert_eq!(
            t.args(300),
            vec!["stdin", "stdout", "-l", "eng", "--dpi", "300", "--psm", "6"]
        );
        let plain = TesseractRecognizer::new("tesseract", "fra");
        assert!(!plain.args(150).contains(&"--psm".to_string()));
    }

    #[test]
    fn missing_binary_is_engine_unavailable() {
        let t = TesseractRecognizer::new("/definitely/not/tesseract", "eng");
        assert!(matches!(
            t.check_available().unwrap_err(),
            PdfOcrError::EngineUnavailable { .. }
        ));

        let page = PageImage {
            index: 0,
            image: image::DynamicImage::new_luma8(4, 4),
            dpi: 300,
        };
        assert!(matches!(
            t.recognize(&page).unwrap_err(),
            PdfOcrError::EngineUnavailable { .. }
        ));
    }

    #[test]
    fn injected_recognizer_takes_precedence() {
        struct Fixed;
        impl Recognizer for Fixed {
            fn name(&self) -> &str {
                "fixed"
            }
            fn recognize(&self, _page: &PageImage) -> Result<String, PdfOcrError> {
                Ok("text".into())
            }
        }

        let config = ConversionConfig::builder()
            .recognizer(Arc::new(Fixed))
            .build()
            .unwrap();
        assert_eq!(resolve_recognizer(&config).name(), "fixed");
        assert_eq!(
            resolve_recognizer(&ConversionConfig::default()).name(),
            "tesseract"
        );
    }
}
