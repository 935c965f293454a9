//! Input validation: make sure the user-supplied path is a readable PDF.
//!
//! The `%PDF` magic bytes are checked before pdfium or the OCR engine is
//! touched, so a wrong path or a stray image file yields a precise error
//! instead of a pdfium parse failure. It also means the common mistakes are
//! reported even on hosts where neither engine is installed.

use crate::error::PdfOcrError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate a local input path, returning it unchanged on success.
pub fn resolve_local(path: &Path) -> Result<PathBuf, PdfOcrError> {
    let path = path.to_path_buf();

    if !path.exists() {
        return Err(PdfOcrError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            match f.read_exact(&mut magic) {
                Ok(()) if &magic == b"%PDF" => {}
                Ok(()) => return Err(PdfOcrError::NotAPdf { path, magic }),
                // Shorter than four bytes: cannot be a PDF either.
                Err(_) => return Err(PdfOcrError::NotAPdf { path, magic }),
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PdfOcrError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(PdfOcrError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported() {
        let err = resolve_local(Path::new("/definitely/not/a/real/file.pdf")).unwrap_err();
        assert!(matches!(err, PdfOcrError::FileNotFound { .. }));
    }

    #[test]
    fn non_pdf_is_rejected_with_magic() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("scan.png");
        std::fs::write(&p, b"\x89PNG\r\n\x1a\n").unwrap();
        match resolve_local(&p).unwrap_err() {
            PdfOcrError::NotAPdf { magic, .. } => assert_eq!(&magic, b"\x89PNG"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn tiny_file_is_not_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("empty.pdf");
        std::fs::write(&p, b"%P").unwrap();
        assert!(matches!(
            resolve_local(&p).unwrap_err(),
            PdfOcrError::NotAPdf { .. }
        ));
    }

    #[test]
    fn pdf_magic_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("doc.pdf");
        std::fs::write(&p, b"%PDF-1.4\n%%EOF\n").unwrap();
        assert_eq!(resolve_local(&p).unwrap(), p);
    }
}
