//! Post-processing: remove engine artefacts from raw OCR page text.
//!
//! Tesseract ends every page with a newline and a form feed. Those bytes are
//! a page terminator, not page content, and would otherwise double up with
//! the separator the assembler puts between pages. Nothing else is touched:
//! spacing, indentation, blank lines and every recognised character are
//! passed through exactly as the engine produced them.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so the terminator rule only sees `\n`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply the cleanup rules to the text of one page.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Strip the trailing page terminator (newlines and form feeds at the end)
pub fn clean_page_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    strip_page_terminator(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Page terminator ──────────────────────────────────────────────────

static RE_PAGE_TERMINATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\n\x0C]+\z").unwrap());

fn strip_page_terminator(input: &str) -> String {
    RE_PAGE_TERMINATOR.replace(input, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_tesseract_page_output() {
        assert_eq!(clean_page_text("HELLO WORLD\n\u{000C}"), "HELLO WORLD");
        assert_eq!(clean_page_text("HELLO WORLD\r\n\u{000C}"), "HELLO WORLD");
    }

    #[test]
    fn test_blank_page_is_empty() {
        assert_eq!(clean_page_text("\u{000C}"), "");
        assert_eq!(clean_page_text(""), "");
    }

    #[test]
    fn test_page_content_is_untouched() {
        let raw = "    indented  line   \n\n\n\nSecond\u{00AD}paragraph\u{200B}\n\u{000C}";
        assert_eq!(
            clean_page_text(raw),
            "    indented  line   \n\n\n\nSecond\u{00AD}paragraph\u{200B}"
        );
    }

    #[test]
    fn test_only_trailing_form_feeds_are_stripped() {
        assert_eq!(clean_page_text("\nA\u{000C}B\n\u{000C}"), "\nA\u{000C}B");
    }
}
