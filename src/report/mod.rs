//! Briefing synthesis and rendering.
//!
//! The summarizer receives only redacted text. The LLM is an external
//! collaborator behind `LlmClient` with a finite retry policy and an
//! explicit terminal fallback; rendering produces PDF bytes via printpdf.

pub mod pdf;
pub mod prompt;
pub mod summarizer;
pub mod types;

pub use summarizer::{LlmClient, OllamaClient, ReportSynthesizer};
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Cannot reach Ollama at {0}")]
    OllamaConnection(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Ollama returned status {status}: {body}")]
    OllamaStatus { status: u16, body: String },

    #[error("Malformed LLM response: {0}")]
    MalformedResponse(String),

    #[error("PDF rendering failed: {0}")]
    PdfRender(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
