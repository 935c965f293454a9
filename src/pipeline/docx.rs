//! Minimal WordprocessingML (`.docx`) package writer.
//!
//! A `.docx` file is a zip archive of XML parts. Only the parts Word needs to
//! open a plain document are written: content types, package relationships,
//! `word/document.xml` and the core/extended property parts.
//!
//! Each page becomes one `<w:p>` paragraph. Pages after the first start with a
//! `<w:br w:type="page"/>` run inside that same paragraph, so the paragraph
//! count always equals the page count.

use crate::error::PdfOcrError;
use crate::output::DocumentMetadata;
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#;

const DOCUMENT_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

// US Letter, one-inch margins (twentieths of a point).
const DOCUMENT_CLOSE: &str = r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr></w:body></w:document>"#;

const PAGE_BREAK_RUN: &str = r#"<w:r><w:br w:type="page"/></w:r>"#;

/// One paragraph of the document body.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Paragraph {
    text: String,
    page_break_before: bool,
}

/// An in-memory Word document, one paragraph per source page.
#[derive(Debug, Default)]
pub struct DocxDocument {
    paragraphs: Vec<Paragraph>,
    title: Option<String>,
    author: Option<String>,
    subject: Option<String>,
}

impl DocxDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Carry the PDF's descriptive metadata into the core properties.
    pub fn with_metadata(mut self, metadata: &DocumentMetadata) -> Self {
        self.title = metadata.title.clone();
        self.author = metadata.author.clone();
        self.subject = metadata.subject.clone();
        self
    }

    /// Append a page. Every page but the first starts on a new page.
    pub fn push_page(&mut self, text: &str) {
        let page_break_before = !self.paragraphs.is_empty();
        self.paragraphs.push(Paragraph {
            text: text.to_string(),
            page_break_before,
        });
    }

    pub fn page_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// Render `word/document.xml`.
    pub fn document_xml(&self) -> String {
        let mut xml = String::from(DOCUMENT_OPEN);
        for p in &self.paragraphs {
            xml.push_str("<w:p>");
            if p.page_break_before {
                xml.push_str(PAGE_BREAK_RUN);
            }
            push_text_run(&mut xml, &p.text);
            xml.push_str("</w:p>");
        }
        xml.push_str(DOCUMENT_CLOSE);
        xml
    }

    fn core_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
        );
        for (tag, value) in [
            ("dc:title", &self.title),
            ("dc:creator", &self.author),
            ("dc:subject", &self.subject),
        ] {
            if let Some(v) = value {
                xml.push_str(&format!("<{tag}>{}</{tag}>", escape(&xml_safe(v))));
            }
        }
        xml.push_str("</cp:coreProperties>");
        xml
    }

    fn app_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>{}</Application><Pages>{}</Pages></Properties>"#,
            concat!("pdf-ocr/", env!("CARGO_PKG_VERSION")),
            self.paragraphs.len()
        )
    }

    /// Serialise the whole package into `.docx` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PdfOcrError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", PACKAGE_RELS.to_string()),
            ("word/document.xml", self.document_xml()),
            ("docProps/core.xml", self.core_xml()),
            ("docProps/app.xml", self.app_xml()),
        ];

        for (name, body) in parts {
            zip.start_file(name, options)
                .map_err(|e| PdfOcrError::DocumentBuildFailed(format!("{name}: {e}")))?;
            zip.write_all(body.as_bytes())
                .map_err(|e| PdfOcrError::DocumentBuildFailed(format!("{name}: {e}")))?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| PdfOcrError::DocumentBuildFailed(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

/// Emit one run holding `text`; newlines become `<w:br/>`, tabs `<w:tab/>`.
fn push_text_run(xml: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    xml.push_str("<w:r>");
    for (i, line) in xml_safe(text).split('\n').enumerate() {
        if i > 0 {
            xml.push_str("<w:br/>");
        }
        for (j, segment) in line.split('\t').enumerate() {
            if j > 0 {
                xml.push_str("<w:tab/>");
            }
            if !segment.is_empty() {
                xml.push_str(r#"<w:t xml:space="preserve">"#);
                xml.push_str(&escape(segment));
                xml.push_str("</w:t>");
            }
        }
    }
    xml.push_str("</w:r>");
}

/// Drop characters XML 1.0 cannot carry (C0 controls other than tab/newline).
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| c == '\t' || c == '\n' || !c.is_control())
        .filter(|&c| c != '\u{FFFE}' && c != '\u{FFFF}')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
        let mut part = archive.by_name(name).expect("part present");
        let mut s = String::new();
        part.read_to_string(&mut s).unwrap();
        s
    }

    #[test]
    fn one_paragraph_per_page_with_breaks_between() {
        let mut doc = DocxDocument::new();
        doc.push_page("first page");
        doc.push_page("second page");
        doc.push_page("third page");

        let xml = doc.document_xml();
        assert_eq!(xml.matches("<w:p>").count(), 3);
        assert_eq!(xml.matches(r#"<w:br w:type="page"/>"#).count(), 2);

        let first = xml.find("first page").unwrap();
        let second = xml.find("second page").unwrap();
        let third = xml.find("third page").unwrap();
        assert!(first < second && second < third);

        // No break ahead of the first page.
        let first_break = xml.find(r#"w:type="page""#).unwrap();
        assert!(first < first_break);
    }

    #[test]
    fn newlines_and_tabs_become_elements() {
        let mut doc = DocxDocument::new();
        doc.push_page("line one\nline\ttwo");
        let xml = doc.document_xml();
        assert!(xml.contains(r#"<w:t xml:space="preserve">line one</w:t><w:br/>"#));
        assert!(xml.contains("<w:tab/>"));
    }

    #[test]
    fn text_is_escaped_and_control_chars_dropped() {
        let mut doc = DocxDocument::new();
        doc.push_page("a < b & c\u{000C}\u{0007}");
        let xml = doc.document_xml();
        assert!(xml.contains("a &lt; b &amp; c"));
        assert!(!xml.contains('\u{000C}'));
        assert!(!xml.contains('\u{0007}'));
    }

    #[test]
    fn empty_page_still_yields_a_paragraph() {
        let mut doc = DocxDocument::new();
        doc.push_page("");
        doc.push_page("");
        let xml = doc.document_xml();
        assert_eq!(xml.matches("<w:p>").count(), 2);
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn package_contains_required_parts() {
        let metadata = DocumentMetadata {
            title: Some("Annual <Report>".into()),
            author: Some("Scanner".into()),
            page_count: 1,
            ..Default::default()
        };
        let mut doc = DocxDocument::new().with_metadata(&metadata);
        doc.push_page("HELLO WORLD");
        let bytes = doc.to_bytes().unwrap();

        assert!(read_part(&bytes, "[Content_Types].xml").contains("wordprocessingml.document.main+xml"));
        assert!(read_part(&bytes, "_rels/.rels").contains("word/document.xml"));
        assert!(read_part(&bytes, "word/document.xml").contains("HELLO WORLD"));

        let core = read_part(&bytes, "docProps/core.xml");
        assert!(core.contains("<dc:title>Annual &lt;Report&gt;</dc:title>"));
        assert!(core.contains("<dc:creator>Scanner</dc:creator>"));
        assert!(!core.contains("dc:subject"));

        assert!(read_part(&bytes, "docProps/app.xml").contains("<Pages>1</Pages>"));
    }
}
