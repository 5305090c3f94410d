//! Document ingestion pipeline: extraction → sanitation → redaction,
//! orchestrated per document set.
//!
//! Nothing produced here crosses the process boundary until it has passed
//! through the redaction pipeline; the orchestrator is the only caller
//! that hands text downstream.

pub mod extraction;
pub mod orchestrator;
pub mod redaction;

pub use orchestrator::{
    discover_documents, CancelFlag, DocumentEntry, DocumentOutcome, IngestError,
    IngestionOrchestrator, IngestionResult, NullProgress, ProgressSink,
};
