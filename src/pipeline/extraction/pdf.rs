//! PDF text extraction using the pdf-extract crate.
//! Handles digital PDFs with embedded text layers; scanned PDFs come out
//! empty and are reported through warnings, not errors.

use super::types::{ExtractedText, ExtractionWarning, SourceDocument};
use super::ExtractionError;

/// Extract the text layer of every page, in document order.
///
/// Pages are joined with a single blank line. A page with no extractable
/// text contributes an empty unit and an `EmptyContent`-style warning.
pub fn extract(doc: &SourceDocument) -> Result<ExtractedText, ExtractionError> {
    let page_texts = pdf_extract::extract_text_from_mem_by_pages(&doc.bytes)
        .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;

    let mut warnings = Vec::new();
    let units: Vec<String> = page_texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            if text.trim().is_empty() {
                warnings.push(ExtractionWarning::UnitUnreadable {
                    unit: i + 1,
                    reason: "page has no extractable text".to_string(),
                });
                String::new()
            } else {
                text
            }
        })
        .collect();

    let content = units.join("\n\n");

    tracing::debug!(
        document_id = %doc.id,
        pages = units.len(),
        text_length = content.len(),
        "PDF text layer extracted"
    );

    Ok(ExtractedText {
        document_id: doc.id.clone(),
        content,
        warnings,
    })
}
