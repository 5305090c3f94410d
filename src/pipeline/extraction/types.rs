use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Immutable handle to a document discovered for ingestion.
///
/// The format tag is declared at discovery time (from the file extension)
/// and drives extractor dispatch — extractors never re-sniff content.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Path string for files, the raw topic string for topic mode.
    pub id: String,
    pub format: DocumentFormat,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(id: impl Into<String>, format: DocumentFormat, bytes: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            format,
            bytes,
        }
    }

    /// A topic query carries its text as the payload; no file is read.
    pub fn topic(text: &str) -> Self {
        Self {
            id: format!("topic:{text}"),
            format: DocumentFormat::Topic,
            bytes: text.as_bytes().to_vec(),
        }
    }
}

/// Closed set of supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Word,
    Slides,
    Image,
    Text,
    Topic,
}

impl DocumentFormat {
    /// Map a lowercase file extension to a format tag.
    /// Returns None for extensions the pipeline does not ingest.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Word),
            "pptx" => Some(Self::Slides),
            "png" | "jpg" | "jpeg" => Some(Self::Image),
            "txt" | "md" => Some(Self::Text),
            _ => None,
        }
    }

    /// Resolve a path's extension to a format tag, or `UnsupportedFormat`
    /// when the file is not one the pipeline ingests.
    pub fn from_path(path: &std::path::Path) -> Result<Self, ExtractionError> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| Self::from_extension(&e.to_ascii_lowercase()))
            .ok_or(ExtractionError::UnsupportedFormat)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Word => "docx",
            Self::Slides => "pptx",
            Self::Image => "image",
            Self::Text => "text",
            Self::Topic => "topic",
        }
    }
}

/// Plain text produced from one SourceDocument. 1:1, never shared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedText {
    pub document_id: String,
    pub content: String,
    /// Non-fatal extraction problems, surfaced in verbose mode.
    pub warnings: Vec<ExtractionWarning>,
}

impl ExtractedText {
    pub fn new(document_id: &str, content: String) -> Self {
        Self {
            document_id: document_id.to_string(),
            content,
            warnings: vec![],
        }
    }
}

/// Non-fatal problems encountered while extracting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ExtractionWarning {
    /// A structural unit (page/paragraph/slide) could not be parsed and
    /// contributed an empty string instead of aborting the document.
    UnitUnreadable { unit: usize, reason: String },
    /// OCR engine reported low confidence; text is kept, not dropped.
    LowOcrConfidence { confidence: f32 },
    /// No text found in the unit (e.g. a blank image).
    EmptyContent,
    /// Decoding needed a non-UTF-8 fallback or lossy replacement.
    EncodingFallback { encoding: String, lossy: bool },
}

impl std::fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnitUnreadable { unit, reason } => {
                write!(f, "unit {unit} unreadable: {reason}")
            }
            Self::LowOcrConfidence { confidence } => {
                write!(f, "low OCR confidence ({confidence:.2})")
            }
            Self::EmptyContent => write!(f, "no text content found"),
            Self::EncodingFallback { encoding, lossy } => {
                if *lossy {
                    write!(f, "lossy decode as {encoding}")
                } else {
                    write!(f, "decoded as {encoding}")
                }
            }
        }
    }
}

/// Raw OCR output from the engine.
#[derive(Debug, Clone)]
pub struct OcrText {
    pub text: String,
    /// Mean confidence in [0, 1] if the engine surfaces one.
    pub confidence: Option<f32>,
}

/// OCR engine abstraction (allows mocking for tests).
pub trait OcrEngine: Send + Sync {
    fn ocr_image(&self, image_bytes: &[u8], lang: &str) -> Result<OcrText, ExtractionError>;
}
