//! PPTX text extraction: slides are XML parts inside a zip archive.
//! Text lives in `<a:t>` elements; slides are ordered by their numeric
//! suffix, not by archive position.

use std::io::Read;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::types::{ExtractedText, ExtractionWarning, SourceDocument};
use super::ExtractionError;

/// Extract slide text in slide order, one blank line between slides.
/// A slide that fails to read or parse contributes an empty unit plus a
/// warning instead of failing the document.
pub fn extract(doc: &SourceDocument) -> Result<ExtractedText, ExtractionError> {
    let cursor = std::io::Cursor::new(doc.bytes.as_slice());
    let mut archive =
        zip::ZipArchive::new(cursor).map_err(|e| ExtractionError::PptxParsing(e.to_string()))?;

    let mut slide_names: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
        .map(str::to_string)
        .collect();

    slide_names.sort_by_key(|name| slide_number(name));

    let mut warnings = Vec::new();
    let mut units: Vec<String> = Vec::new();

    for (i, slide_name) in slide_names.iter().enumerate() {
        let mut xml = String::new();
        let read_ok = archive
            .by_name(slide_name)
            .ok()
            .and_then(|mut f| f.read_to_string(&mut xml).ok())
            .is_some();

        if !read_ok {
            warnings.push(ExtractionWarning::UnitUnreadable {
                unit: i + 1,
                reason: format!("cannot read {slide_name}"),
            });
            units.push(String::new());
            continue;
        }

        units.push(slide_text(&xml));
    }

    let content = units.join("\n\n");

    tracing::debug!(
        document_id = %doc.id,
        slides = units.len(),
        text_length = content.len(),
        "PPTX slides extracted"
    );

    Ok(ExtractedText {
        document_id: doc.id.clone(),
        content,
        warnings,
    })
}

fn slide_number(name: &str) -> u32 {
    name.trim_start_matches("ppt/slides/slide")
        .trim_end_matches(".xml")
        .parse()
        .unwrap_or(0)
}

/// Pull text out of a slide's DrawingML: `<a:t>` holds the runs, `</a:p>`
/// ends a paragraph.
fn slide_text(xml: &str) -> String {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => {
                in_text = true;
            }
            Ok(Event::Text(e)) if in_text => {
                if let Ok(text) = e.unescape() {
                    current.push_str(&text);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => {
                    in_text = false;
                    current.push(' ');
                }
                b"p" => {
                    let line = current.trim().to_string();
                    if !line.is_empty() {
                        lines.push(line);
                    }
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        lines.push(tail.to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::types::DocumentFormat;
    use std::io::Write;

    pub(crate) fn make_test_pptx(slides: &[&str]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let cursor = std::io::Cursor::new(&mut buf);
            let mut zip = zip::ZipWriter::new(cursor);
            let options = zip::write::SimpleFileOptions::default();
            for (i, body) in slides.iter().enumerate() {
                zip.start_file(format!("ppt/slides/slide{}.xml", i + 1), options)
                    .unwrap();
                let xml = format!(
                    r#"<?xml version="1.0"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:txBody><a:p><a:r><a:t>{body}</a:t></a:r></a:p></p:txBody></p:sld>"#
                );
                zip.write_all(xml.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buf
    }

    fn pptx_doc(bytes: Vec<u8>) -> SourceDocument {
        SourceDocument::new("deck.pptx", DocumentFormat::Slides, bytes)
    }

    #[test]
    fn extracts_slides_in_numeric_order() {
        let bytes = make_test_pptx(&["First slide", "Second slide", "Third slide"]);
        let extracted = extract(&pptx_doc(bytes)).unwrap();
        let first = extracted.content.find("First slide").unwrap();
        let second = extracted.content.find("Second slide").unwrap();
        let third = extracted.content.find("Third slide").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn slides_are_separated_by_blank_line() {
        let bytes = make_test_pptx(&["alpha", "beta"]);
        let extracted = extract(&pptx_doc(bytes)).unwrap();
        assert_eq!(extracted.content, "alpha\n\nbeta");
    }

    #[test]
    fn pptx_without_slides_yields_empty_content() {
        let mut buf = Vec::new();
        {
            let cursor = std::io::Cursor::new(&mut buf);
            let mut zip = zip::ZipWriter::new(cursor);
            zip.start_file("docProps/core.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"<x/>").unwrap();
            zip.finish().unwrap();
        }
        let extracted = extract(&pptx_doc(buf)).unwrap();
        assert!(extracted.content.is_empty());
    }

    #[test]
    fn corrupt_archive_returns_parsing_error() {
        let result = extract(&pptx_doc(b"not a zip".to_vec()));
        assert!(matches!(result, Err(ExtractionError::PptxParsing(_))));
    }

    #[test]
    fn xml_entities_are_unescaped() {
        let bytes = make_test_pptx(&["R&amp;D review"]);
        let extracted = extract(&pptx_doc(bytes)).unwrap();
        assert!(extracted.content.contains("R&D review"));
    }
}
