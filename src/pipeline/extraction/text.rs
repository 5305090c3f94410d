//! Plain-text extraction with encoding resolution.

use super::encoding;
use super::types::{ExtractedText, ExtractionWarning, SourceDocument};
use super::ExtractionError;

/// Decode a plain-text document, recording any encoding fallback as a
/// warning. Decoding is best-effort and never fails.
pub fn extract(doc: &SourceDocument) -> Result<ExtractedText, ExtractionError> {
    let decoded = encoding::resolve(&doc.bytes);

    let mut warnings = Vec::new();
    if decoded.lossy || decoded.encoding != "utf-8" {
        warnings.push(ExtractionWarning::EncodingFallback {
            encoding: decoded.encoding.clone(),
            lossy: decoded.lossy,
        });
    }

    tracing::debug!(
        document_id = %doc.id,
        encoding = %decoded.encoding,
        lossy = decoded.lossy,
        text_length = decoded.text.len(),
        "plain text decoded"
    );

    Ok(ExtractedText {
        document_id: doc.id.clone(),
        content: decoded.text,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::types::DocumentFormat;

    fn text_doc(bytes: Vec<u8>) -> SourceDocument {
        SourceDocument::new("notes.txt", DocumentFormat::Text, bytes)
    }

    #[test]
    fn utf8_input_has_no_warnings() {
        let extracted = extract(&text_doc("plain notes".as_bytes().to_vec())).unwrap();
        assert_eq!(extracted.content, "plain notes");
        assert!(extracted.warnings.is_empty());
    }

    #[test]
    fn latin1_input_records_fallback_warning() {
        let extracted = extract(&text_doc(vec![b'c', b'a', b'f', 0xE9])).unwrap();
        assert_eq!(extracted.content, "café");
        assert!(matches!(
            extracted.warnings.as_slice(),
            [ExtractionWarning::EncodingFallback { lossy: false, .. }]
        ));
    }
}
