//! Layered PII redaction.
//!
//! Two detector layers run over extracted text before anything leaves the
//! process: regex patterns for structured PII (`patterns`), then a
//! named-entity collaborator for unstructured PII (`entities`). The
//! pipeline (`pipeline`) merges both, resolves overlaps in favor of the
//! pattern layer, and substitutes category-tagged placeholders.
//!
//! Detection is best-effort and layered; it does not guarantee total PII
//! recall. Residual risk: entities the NER model misses, structured data
//! in shapes the pattern table does not cover.

pub mod entities;
pub mod patterns;
pub mod pipeline;
pub mod types;

pub use pipeline::RedactionPipeline;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedactionError {
    #[error("Invalid custom pattern '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("Entity recognizer unreachable: {0}")]
    EngineUnavailable(String),

    #[error("Entity recognizer returned an invalid response: {0}")]
    EngineResponse(String),
}
