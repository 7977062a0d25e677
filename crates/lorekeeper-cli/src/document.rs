//! Plain-text extraction from manuscript files (.txt, .docx).

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use std::path::Path;
use thiserror::Error;

/// Maximum decompressed size of `word/document.xml` (zip-bomb protection).
const MAX_DOCUMENT_XML_BYTES: u64 = 64 * 1024 * 1024;

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// UTF-8 text
    PlainText,
    /// Office Open XML word-processing document
    Docx,
}

impl DocumentFormat {
    /// Format implied by a file extension (case-insensitive).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "txt" | "text" | "md" => Some(DocumentFormat::PlainText),
            "docx" => Some(DocumentFormat::Docx),
            _ => None,
        }
    }
}

/// Document reading errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Extension not recognized
    #[error("Unsupported format: {0}")]
    Unsupported(String),

    /// Content does not match the declared format
    #[error("Corrupt document: {0}")]
    Corrupt(String),

    /// File could not be read
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),
}

/// Read a manuscript from disk, choosing the format by extension.
pub fn read_document(path: &Path) -> Result<String, DocumentError> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let format = DocumentFormat::from_extension(extension).ok_or_else(|| {
        DocumentError::Unsupported(format!("'{}' (expected .txt or .docx)", path.display()))
    })?;
    let bytes = std::fs::read(path)?;
    extract_plain_text(&bytes, format)
}

/// Convert raw bytes of the given format into plain text.
pub fn extract_plain_text(bytes: &[u8], format: DocumentFormat) -> Result<String, DocumentError> {
    match format {
        DocumentFormat::PlainText => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| DocumentError::Corrupt(format!("not valid UTF-8: {}", e)))?;
            Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
        }
        DocumentFormat::Docx => extract_docx(bytes),
    }
}

fn extract_docx(bytes: &[u8]) -> Result<String, DocumentError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DocumentError::Corrupt(e.to_string()))?;
    let entry = archive
        .by_name("word/document.xml")
        .map_err(|_| DocumentError::Corrupt("word/document.xml not found".to_string()))?;

    let mut xml = Vec::new();
    entry
        .take(MAX_DOCUMENT_XML_BYTES)
        .read_to_end(&mut xml)
        .map_err(|e| DocumentError::Corrupt(e.to_string()))?;
    if xml.len() as u64 >= MAX_DOCUMENT_XML_BYTES {
        return Err(DocumentError::Corrupt(
            "word/document.xml exceeds size limit".to_string(),
        ));
    }
    paragraphs_from_xml(&xml)
}

/// Collect `w:t` runs; `w:p` paragraphs are separated by a blank line.
fn paragraphs_from_xml(xml: &[u8]) -> Result<String, DocumentError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"p" => current.clear(),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => current.push('\t'),
                b"br" => current.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| DocumentError::Corrupt(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocumentError::Corrupt(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docx(body: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            let xml = format!(
                "<?xml version=\"1.0\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>{}</w:body></w:document>",
                body
            );
            zip.write_all(xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_plain_text_strips_bom() {
        let text = extract_plain_text("\u{feff}Chapter 1".as_bytes(), DocumentFormat::PlainText)
            .unwrap();
        assert_eq!(text, "Chapter 1");
    }

    #[test]
    fn test_docx_paragraphs_pack_like_plain_text() {
        let paragraph = "The keeper climbed the stairs and lit the lamp again.";
        let body = format!("<w:p><w:r><w:t>{paragraph}</w:t></w:r></w:p>").repeat(3);
        let text = extract_plain_text(&docx(&body), DocumentFormat::Docx).unwrap();

        let chunks = lorekeeper_extractor::segment(&text, 100);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.text == paragraph));
    }

    #[test]
    fn test_invalid_utf8_is_corrupt() {
        let result = extract_plain_text(&[0xff, 0xfe, 0x00], DocumentFormat::PlainText);
        assert!(matches!(result, Err(DocumentError::Corrupt(_))));
    }

    #[test]
    fn test_docx_paragraphs_and_runs() {
        let bytes = docx(
            "<w:p><w:r><w:t>Chapter 1</w:t></w:r></w:p>\
             <w:p><w:r><w:t xml:space=\"preserve\">The keeper </w:t></w:r><w:r><w:t>climbed &amp; waited.</w:t></w:r></w:p>",
        );
        let text = extract_plain_text(&bytes, DocumentFormat::Docx).unwrap();
        assert_eq!(text, "Chapter 1\n\nThe keeper climbed & waited.");
    }

    #[test]
    fn test_docx_without_document_xml() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            zip.start_file("other.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"<x/>").unwrap();
            zip.finish().unwrap();
        }
        let result = extract_plain_text(&buf, DocumentFormat::Docx);
        assert!(matches!(result, Err(DocumentError::Corrupt(_))));
    }

    #[test]
    fn test_not_a_zip_is_corrupt() {
        let result = extract_plain_text(b"plain words", DocumentFormat::Docx);
        assert!(matches!(result, Err(DocumentError::Corrupt(_))));
    }

    #[test]
    fn test_read_document_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("novel.TXT");
        std::fs::write(&txt, "Once upon a time").unwrap();
        assert_eq!(read_document(&txt).unwrap(), "Once upon a time");

        let docx_path = dir.path().join("novel.docx");
        std::fs::write(&docx_path, docx("<w:p><w:r><w:t>Hello</w:t></w:r></w:p>")).unwrap();
        assert_eq!(read_document(&docx_path).unwrap(), "Hello");

        let pdf = dir.path().join("novel.pdf");
        std::fs::write(&pdf, "%PDF").unwrap();
        assert!(matches!(read_document(&pdf), Err(DocumentError::Unsupported(_))));
    }
}
