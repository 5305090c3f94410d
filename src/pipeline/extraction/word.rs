//! DOCX text extraction via docx-rs.

use super::types::{ExtractedText, SourceDocument};
use super::ExtractionError;

/// Extract paragraph text in document order, one blank line between
/// paragraphs. Tables and embedded objects are skipped — this pipeline does
/// linear text only.
pub fn extract(doc: &SourceDocument) -> Result<ExtractedText, ExtractionError> {
    let parsed = docx_rs::read_docx(&doc.bytes)
        .map_err(|e| ExtractionError::DocxParsing(e.to_string()))?;

    let mut units: Vec<String> = Vec::new();
    for child in parsed.document.children {
        if let docx_rs::DocumentChild::Paragraph(p) = child {
            let mut paragraph = String::new();
            for child in p.children {
                if let docx_rs::ParagraphChild::Run(run) = child {
                    for child in run.children {
                        if let docx_rs::RunChild::Text(t) = child {
                            paragraph.push_str(&t.text);
                        }
                    }
                }
            }
            if !paragraph.trim().is_empty() {
                units.push(paragraph);
            }
        }
    }

    let content = units.join("\n\n");

    tracing::debug!(
        document_id = %doc.id,
        paragraphs = units.len(),
        text_length = content.len(),
        "DOCX paragraphs extracted"
    );

    Ok(ExtractedText {
        document_id: doc.id.clone(),
        content,
        warnings: vec![],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::types::DocumentFormat;

    #[test]
    fn invalid_docx_returns_parsing_error() {
        let doc = SourceDocument::new("memo.docx", DocumentFormat::Word, b"garbage".to_vec());
        assert!(matches!(extract(&doc), Err(ExtractionError::DocxParsing(_))));
    }

    #[test]
    fn empty_zip_is_not_a_docx() {
        // A valid empty zip archive: end-of-central-directory record only.
        let empty_zip = vec![
            0x50, 0x4B, 0x05, 0x06, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        let doc = SourceDocument::new("memo.docx", DocumentFormat::Word, empty_zip);
        assert!(extract(&doc).is_err());
    }
}
