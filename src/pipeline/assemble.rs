//! Assembly: recognise the lazily rendered pages in order, then turn the
//! page texts into the output artifact and write it.

use crate::error::PdfOcrError;
use crate::output::{DocumentMetadata, OutputFormat, PageText};
use crate::pipeline::docx::DocxDocument;
use crate::pipeline::ocr::Recognizer;
use crate::pipeline::postprocess;
use crate::pipeline::render::PageImage;
use crate::progress::ProgressCallback;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Separator between pages in text mode: one blank line.
pub const TEXT_PAGE_SEPARATOR: &str = "\n\n";

/// Page texts plus the time spent in each stage.
#[derive(Debug, Default)]
pub struct RecognisedPages {
    pub pages: Vec<PageText>,
    pub render_duration: Duration,
    pub ocr_duration: Duration,
}

/// Pull pages one at a time, recognise each and clean its text.
///
/// The first failure, from either rendering or recognition, aborts the run.
/// Each page image is dropped before the next one is rendered.
pub fn recognise_pages<I>(
    mut pages: I,
    total: usize,
    recognizer: &dyn Recognizer,
    progress: Option<&ProgressCallback>,
) -> Result<RecognisedPages, PdfOcrError>
where
    I: Iterator<Item = Result<PageImage, PdfOcrError>>,
{
    let mut out = RecognisedPages {
        pages: Vec::with_capacity(total),
        ..Default::default()
    };

    if let Some(cb) = progress {
        cb.on_conversion_start(total);
    }

    loop {
        let render_start = Instant::now();
        let page = match pages.next() {
            None => break,
            Some(page) => page,
        };
        out.render_duration += render_start.elapsed();

        let page = match page {
            Ok(page) => page,
            Err(e) => {
                if let Some(cb) = progress {
                    cb.on_page_error(out.pages.len() + 1, total, &e.to_string());
                }
                return Err(e);
            }
        };
        let page_num = page.page_num();

        if let Some(cb) = progress {
            cb.on_page_start(page_num, total);
        }

        let ocr_start = Instant::now();
        let raw = match recognizer.recognize(&page) {
            Ok(raw) => raw,
            Err(e) => {
                if let Some(cb) = progress {
                    cb.on_page_error(page_num, total, &e.to_string());
                }
                return Err(e);
            }
        };
        out.ocr_duration += ocr_start.elapsed();
        drop(page);

        let text = postprocess::clean_page_text(&raw);
        debug!("Page {} → {} bytes of text", page_num, text.len());

        if let Some(cb) = progress {
            cb.on_page_complete(page_num, total, text.len());
        }
        out.pages.push(PageText { page_num, text });
    }

    if let Some(cb) = progress {
        cb.on_conversion_complete(out.pages.len());
    }
    info!(
        "Recognised {} pages (render {}ms, ocr {}ms)",
        out.pages.len(),
        out.render_duration.as_millis(),
        out.ocr_duration.as_millis()
    );

    Ok(out)
}

/// Join page texts with a blank line between consecutive pages.
pub fn assemble_text(pages: &[PageText]) -> String {
    pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(TEXT_PAGE_SEPARATOR)
}

/// Build a `.docx` package with one paragraph per page.
pub fn assemble_docx(
    pages: &[PageText],
    metadata: &DocumentMetadata,
) -> Result<Vec<u8>, PdfOcrError> {
    let mut doc = DocxDocument::new().with_metadata(metadata);
    for page in pages {
        doc.push_page(&page.text);
    }
    doc.to_bytes()
}

/// Render the artifact for `format` as bytes.
pub fn assemble(
    format: OutputFormat,
    pages: &[PageText],
    metadata: &DocumentMetadata,
) -> Result<Vec<u8>, PdfOcrError> {
    match format {
        OutputFormat::Text => Ok(assemble_text(pages).into_bytes()),
        OutputFormat::Docx => assemble_docx(pages, metadata),
    }
}

/// Write `bytes` to `path`, replacing any existing file.
///
/// Writes go to a sibling `.tmp` file which is then renamed over `path`, so a
/// reader never sees a half-written artifact. The `.tmp` file is removed when
/// either step fails.
pub async fn write_output(path: &Path, bytes: &[u8]) -> Result<(), PdfOcrError> {
    let write_err = |source| PdfOcrError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    if let Err(e) = tokio::fs::write(tmp_path, bytes).await {
        let _ = tokio::fs::remove_file(tmp_path).await;
        return Err(write_err(e));
    }
    if let Err(e) = tokio::fs::rename(tmp_path, path).await {
        let _ = tokio::fs::remove_file(tmp_path).await;
        return Err(write_err(e));
    }

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
