//! DOCX text: the `w:t` runs of `word/document.xml`, one line per non-empty paragraph.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Ceiling on the inflated size of `word/document.xml`.
const MAX_DOCUMENT_XML_BYTES: u64 = 32 * 1024 * 1024;

pub fn extract(bytes: &[u8]) -> Result<String, ExtractionError> {
    extract_limited(bytes, MAX_DOCUMENT_XML_BYTES)
}

fn extract_limited(bytes: &[u8], limit: u64) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::Unreadable(format!("not a DOCX file: {e}")))?;

    let part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::Unreadable(format!("missing {DOCUMENT_PART}: {e}")))?;

    // The declared size can lie, so the read itself is capped too.
    if part.size() > limit {
        return Err(too_large(limit));
    }
    let mut raw = Vec::new();
    part.take(limit + 1)
        .read_to_end(&mut raw)
        .map_err(|e| ExtractionError::Unreadable(e.to_string()))?;
    if raw.len() as u64 > limit {
        return Err(too_large(limit));
    }
    let xml = String::from_utf8(raw)
        .map_err(|e| ExtractionError::Unreadable(format!("document XML is not UTF-8: {e}")))?;

    paragraphs_from_xml(&xml).map(|paragraphs| paragraphs.join("\n"))
}

fn too_large(limit: u64) -> ExtractionError {
    ExtractionError::Unreadable(format!(
        "{DOCUMENT_PART} expands beyond {} MB",
        limit / (1024 * 1024)
    ))
}

fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ExtractionError::Unreadable(format!("malformed document XML: {e}")))?;
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => current.clear(),
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" => current.push(' '),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| ExtractionError::Unreadable(e.to_string()))?;
                current.push_str(&text);
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    if !current.trim().is_empty() {
                        paragraphs.push(current.trim().to_string());
                    }
                    current.clear();
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use super::*;

    /// Builds a minimal DOCX container around the given `w:body` content.
    pub(crate) fn build_docx(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::FileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer.start_file(DOCUMENT_PART, options).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_runs_joined_within_paragraph() {
        let bytes = build_docx(
            "<w:p><w:r><w:t>Senior </w:t></w:r><w:r><w:t xml:space=\"preserve\">Engineer</w:t></w:r></w:p>",
        );
        assert_eq!(extract(&bytes).unwrap(), "Senior Engineer");
    }

    #[test]
    fn test_empty_paragraphs_skipped() {
        let bytes = build_docx(
            "<w:p><w:r><w:t>One</w:t></w:r></w:p><w:p/><w:p><w:r><w:t> </w:t></w:r></w:p><w:p><w:r><w:t>Two</w:t></w:r></w:p>",
        );
        assert_eq!(extract(&bytes).unwrap(), "One\nTwo");
    }

    #[test]
    fn test_entities_unescaped_and_tabs_kept() {
        let bytes = build_docx(
            "<w:p><w:r><w:t>R&amp;D</w:t><w:tab/><w:t>2020</w:t></w:r></w:p>",
        );
        assert_eq!(extract(&bytes).unwrap(), "R&D\t2020");
    }

    #[test]
    fn test_document_part_over_limit_rejected() {
        let paragraph = format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", "a".repeat(4096));
        let bytes = build_docx(&paragraph);

        let err = extract_limited(&bytes, 1024).unwrap_err();
        assert!(matches!(err, ExtractionError::Unreadable(ref m) if m.contains("expands beyond")));
        assert_eq!(extract_limited(&bytes, 64 * 1024).unwrap().len(), 4096);
    }

    #[test]
    fn test_deflated_bomb_stops_at_limit() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        writer.start_file(DOCUMENT_PART, options).unwrap();
        let chunk = vec![b' '; 1024 * 1024];
        for _ in 0..4 {
            writer.write_all(&chunk).unwrap();
        }
        let bytes = writer.finish().unwrap().into_inner();
        assert!(bytes.len() < 64 * 1024);

        let err = extract_limited(&bytes, 1024 * 1024).unwrap_err();
        assert!(matches!(err, ExtractionError::Unreadable(ref m) if m.contains("expands beyond 1 MB")));
    }

    #[test]
    fn test_non_zip_bytes_rejected() {
        let err = extract(b"\xD0\xCF\x11\xE0legacy word file").unwrap_err();
        assert!(matches!(err, ExtractionError::Unreadable(_)));
    }

    #[test]
    fn test_zip_without_document_part_rejected() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::FileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer.start_file("other.txt", options).unwrap();
        writer.write_all(b"hello").unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        let err = extract(&bytes).unwrap_err();
        assert!(err.to_string().contains("word/document.xml"));
    }
}
