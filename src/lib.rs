//! Prepbrief: document ingestion, PII redaction, and briefing synthesis.
//!
//! The pipeline runs Extract → Redact per document, hands the combined
//! sanitized text to a local LLM for section-structured synthesis, and
//! renders the result as a PDF. Raw document text never crosses a process
//! boundary; only redacted content reaches the model.

pub mod cli;
pub mod config;
pub mod pipeline;
pub mod report;

pub use pipeline::{CancelFlag, IngestError, IngestionOrchestrator, IngestionResult};
pub use report::{ReportError, ReportSynthesizer, StructuredReport};
