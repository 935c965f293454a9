//! Pipeline stages for PDF OCR conversion.
//!
//! Each submodule implements one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ ocr ──▶ postprocess ──▶ assemble
//! (path)    (pdfium)   (PNG)    (tesseract) (cleanup)    (text | docx)
//! ```
//!
//! 1. [`input`]: validate the user-supplied path and PDF magic bytes
//! 2. [`render`]: lazily rasterise every page at the configured DPI
//! 3. [`encode`]: PNG-encode a page image for the engine
//! 4. [`ocr`]: the [`ocr::Recognizer`] seam and the tesseract driver
//! 5. [`postprocess`]: deterministic cleanup of raw OCR text
//! 6. [`assemble`]: the ordered page loop, artifact assembly and the write
//!
//! [`docx`] holds the WordprocessingML package writer used by `assemble`.

pub mod assemble;
pub mod docx;
pub mod encode;
pub mod input;
pub mod ocr;
pub mod postprocess;
pub mod render;
