//! Image OCR extraction.
//!
//! The OCR engine is an external collaborator behind the `OcrEngine` trait.
//! Low-confidence results are returned with a warning, never silently
//! dropped — downstream redaction still needs to see the text.

use super::types::{ExtractedText, ExtractionWarning, OcrEngine, SourceDocument};
use super::ExtractionError;

/// Confidence below this is reported as a warning.
const LOW_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Run the configured OCR engine over an image document.
///
/// A blank image (engine returns no text) yields empty content plus an
/// `EmptyContent` warning, not a failure.
pub fn extract(
    doc: &SourceDocument,
    engine: &dyn OcrEngine,
    lang: &str,
) -> Result<ExtractedText, ExtractionError> {
    let ocr = engine.ocr_image(&doc.bytes, lang)?;

    let mut warnings = Vec::new();
    if ocr.text.trim().is_empty() {
        warnings.push(ExtractionWarning::EmptyContent);
    }
    if let Some(confidence) = ocr.confidence {
        if confidence < LOW_CONFIDENCE_THRESHOLD {
            warnings.push(ExtractionWarning::LowOcrConfidence { confidence });
        }
    }

    tracing::debug!(
        document_id = %doc.id,
        text_length = ocr.text.len(),
        confidence = ?ocr.confidence,
        "OCR extraction complete"
    );

    Ok(ExtractedText {
        document_id: doc.id.clone(),
        content: ocr.text,
        warnings,
    })
}

/// Bundled Tesseract OCR engine, only built with the `ocr` feature.
#[cfg(feature = "ocr")]
pub struct BundledTesseract {
    tessdata_dir: std::path::PathBuf,
}

#[cfg(feature = "ocr")]
impl BundledTesseract {
    pub fn new(tessdata_dir: &std::path::Path) -> Result<Self, ExtractionError> {
        if !tessdata_dir.join("eng.traineddata").exists() {
            return Err(ExtractionError::OcrInit(format!(
                "no eng.traineddata under {}",
                tessdata_dir.display()
            )));
        }
        Ok(Self {
            tessdata_dir: tessdata_dir.to_path_buf(),
        })
    }
}

#[cfg(feature = "ocr")]
impl OcrEngine for BundledTesseract {
    fn ocr_image(
        &self,
        image_bytes: &[u8],
        lang: &str,
    ) -> Result<super::types::OcrText, ExtractionError> {
        let tessdata = self
            .tessdata_dir
            .to_str()
            .ok_or_else(|| ExtractionError::OcrInit("invalid tessdata path".into()))?;

        let tess = tesseract::Tesseract::new(Some(tessdata), Some(lang))
            .map_err(|e| ExtractionError::OcrInit(format!("{e:?}")))?;

        let mut tess = tess
            .set_image_from_mem(image_bytes)
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))?;

        let text = tess
            .get_text()
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))?;

        let confidence = tess.mean_text_conf().max(0) as f32 / 100.0;

        Ok(super::types::OcrText {
            text,
            confidence: Some(confidence),
        })
    }
}
