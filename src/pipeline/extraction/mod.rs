//! Multi-format text extraction.
//!
//! One extractor per declared format tag, dispatched in `dispatch.rs`.
//! Extractors concatenate structural units (pages/paragraphs/slides) in
//! document order with a single blank-line delimiter; a unit that fails to
//! parse contributes an empty string and a warning rather than aborting
//! the document.

pub mod dispatch;
pub mod encoding;
pub mod image;
pub mod pdf;
pub mod sanitize;
pub mod slides;
pub mod text;
pub mod types;
pub mod word;

pub use dispatch::FormatExtractor;
#[cfg(feature = "ocr")]
pub use image::BundledTesseract;
pub use sanitize::sanitize_extracted_text;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported format for extraction")]
    UnsupportedFormat,

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("DOCX parsing failed: {0}")]
    DocxParsing(String),

    #[error("PPTX parsing failed: {0}")]
    PptxParsing(String),

    #[error("OCR engine initialization failed: {0}")]
    OcrInit(String),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("No OCR engine configured for image input")]
    OcrUnavailable,
}
