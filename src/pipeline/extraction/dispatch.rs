//! Format dispatch: one extractor per declared format tag.

use super::types::{DocumentFormat, ExtractedText, OcrEngine, SourceDocument};
use super::{image, pdf, slides, text, word, ExtractionError};

/// Facade over the per-format extractors.
///
/// Dispatch is keyed on the declared format tag only; there is no content
/// sniffing past the tag. Image input requires a configured OCR engine.
pub struct FormatExtractor {
    ocr: Option<Box<dyn OcrEngine>>,
    ocr_language: String,
}

impl FormatExtractor {
    pub fn new(ocr: Option<Box<dyn OcrEngine>>, ocr_language: impl Into<String>) -> Self {
        Self {
            ocr,
            ocr_language: ocr_language.into(),
        }
    }

    /// No OCR engine: image documents fail per-document with `OcrUnavailable`.
    pub fn without_ocr() -> Self {
        Self::new(None, crate::config::DEFAULT_OCR_LANGUAGE)
    }

    pub fn extract(&self, doc: &SourceDocument) -> Result<ExtractedText, ExtractionError> {
        match doc.format {
            DocumentFormat::Pdf => pdf::extract(doc),
            DocumentFormat::Word => word::extract(doc),
            DocumentFormat::Slides => slides::extract(doc),
            DocumentFormat::Image => {
                let engine = self.ocr.as_deref().ok_or(ExtractionError::OcrUnavailable)?;
                image::extract(doc, engine, &self.ocr_language)
            }
            DocumentFormat::Text => text::extract(doc),
            // A topic is already text; nothing to extract.
            DocumentFormat::Topic => Ok(ExtractedText::new(
                &doc.id,
                String::from_utf8_lossy(&doc.bytes).into_owned(),
            )),
        }
    }
}
