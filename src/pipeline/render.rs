//! PDF rasterisation: render every page to a `DynamicImage` via pdfium.
//!
//! Rendering is lazy. [`with_pages`] opens the document once and hands the
//! caller an iterator that renders a page only when it is pulled, so at most
//! one page bitmap is alive at a time. The iterator borrows the open document,
//! which is why it is lent to a closure instead of being returned.
//!
//! All functions here are blocking; async callers run them inside
//! `tokio::task::spawn_blocking`.

use crate::config::ConversionConfig;
use crate::error::PdfOcrError;
use crate::output::DocumentMetadata;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// PDF user-space units per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// One rasterised page, alive only until it has been recognised.
pub struct PageImage {
    /// 0-based page index in the source document.
    pub index: usize,
    pub image: DynamicImage,
    /// Resolution the page was rendered at.
    pub dpi: u32,
}

impl PageImage {
    /// 1-based page number.
    pub fn page_num(&self) -> usize {
        self.index + 1
    }
}

/// Lazy, single-pass sequence of rendered pages.
pub type PageIter<'a> = dyn Iterator<Item = Result<PageImage, PdfOcrError>> + 'a;

/// Bind to a pdfium library.
///
/// Resolution order: the explicit path (file or directory), then
/// `PDFIUM_LIB_PATH`, then the system library search path.
pub fn bind_pdfium(explicit: Option<&Path>) -> Result<Pdfium, PdfOcrError> {
    let candidate = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

    let bindings = match candidate {
        Some(path) => {
            let lib = library_file(&path);
            debug!("Binding pdfium from {}", lib.display());
            Pdfium::bind_to_library(&lib).map_err(|e| {
                PdfOcrError::PdfiumBindingFailed(format!("{}: {}", lib.display(), e))
            })?
        }
        None => Pdfium::bind_to_system_library()
            .map_err(|e| PdfOcrError::PdfiumBindingFailed(e.to_string()))?,
    };

    Ok(Pdfium::new(bindings))
}

/// Directories are expanded to the platform library file inside them.
fn library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}

/// Open `pdf_path` and lend `f` the document metadata, the page count and a
/// lazy iterator over every page in document order.
pub fn with_pages<T, F>(pdf_path: &Path, config: &ConversionConfig, f: F) -> Result<T, PdfOcrError>
where
    F: FnOnce(&DocumentMetadata, usize, &mut PageIter<'_>) -> Result<T, PdfOcrError>,
{
    let pdfium = bind_pdfium(config.pdfium_lib_path.as_deref())?;
    let password = config.password.as_deref();

    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| classify_load_error(pdf_path, password.is_some(), format!("{:?}", e)))?;

    let metadata = read_metadata(&document);
    info!("PDF loaded: {} pages", metadata.page_count);

    let dpi = config.dpi;
    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(dpi as f32 / POINTS_PER_INCH)
        .set_maximum_width(config.max_rendered_pixels as i32)
        .set_maximum_height(config.max_rendered_pixels as i32);

    let total = metadata.page_count;
    let pages = document.pages();
    let mut iter = (0..total).map(|idx| render_page(pages, idx, &render_config, dpi));

    f(&metadata, total, &mut iter)
}

/// Read document metadata without rendering anything.
pub fn extract_metadata(
    pdf_path: &Path,
    config: &ConversionConfig,
) -> Result<DocumentMetadata, PdfOcrError> {
    let pdfium = bind_pdfium(config.pdfium_lib_path.as_deref())?;
    let password = config.password.as_deref();

    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| classify_load_error(pdf_path, password.is_some(), format!("{:?}", e)))?;

    Ok(read_metadata(&document))
}

fn render_page(
    pages: &PdfPages<'_>,
    idx: usize,
    render_config: &PdfRenderConfig,
    dpi: u32,
) -> Result<PageImage, PdfOcrError> {
    let page = pages
        .get(idx as u16)
        .map_err(|e| PdfOcrError::RasterisationFailed {
            page: idx + 1,
            detail: format!("{:?}", e),
        })?;

    let bitmap = page
        .render_with_config(render_config)
        .map_err(|e| PdfOcrError::RasterisationFailed {
            page: idx + 1,
            detail: format!("{:?}", e),
        })?;

    let image = bitmap.as_image();
    debug!(
        "Rendered page {} → {}x{} px",
        idx + 1,
        image.width(),
        image.height()
    );

    Ok(PageImage {
        index: idx,
        image,
        dpi,
    })
}

fn read_metadata(document: &PdfDocument<'_>) -> DocumentMetadata {
    let metadata = document.metadata();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().trim().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        page_count: document.pages().len() as usize,
        pdf_version: format!("{:?}", document.version()),
    }
}

/// Map a pdfium load failure onto the matching error variant.
fn classify_load_error(path: &Path, password_given: bool, detail: String) -> PdfOcrError {
    if detail.contains("Password") || detail.contains("password") {
        if password_given {
            PdfOcrError::WrongPassword {
                path: path.to_path_buf(),
            }
        } else {
            PdfOcrError::PasswordRequired {
                path: path.to_path_buf(),
            }
        }
    } else {
        PdfOcrError::CorruptPdf {
            path: path.to_path_buf(),
            detail,
        }
    }
}
