//! Command-line surface and the end-to-end run.
//!
//! Two modes: document mode walks a directory through Extract → Redact →
//! Summarize → Render, topic mode skips ingestion entirely and asks the
//! model to research the topic directly.

use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

use crate::config;
use crate::pipeline::extraction::FormatExtractor;
use crate::pipeline::redaction::{
    entities::HttpNerClient, EntityRecognizer, RedactionError, RedactionPipeline, RedactionPolicy,
};
use crate::pipeline::{CancelFlag, DocumentOutcome, IngestError, IngestionOrchestrator};
use crate::report::{pdf::render_pdf, OllamaClient, ReportError, ReportSynthesizer};

/// Generate a technical meeting brief from a document set or a topic.
#[derive(Parser, Debug)]
#[command(name = "prepbrief", version, about, long_about = None)]
pub struct Cli {
    /// Directory (or single document) of source material
    /// (pdf, docx, pptx, png/jpg, txt, md)
    #[arg(short, long, required_unless_present = "topic", conflicts_with = "topic")]
    pub path: Option<PathBuf>,

    /// Research a topic directly instead of reading documents
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Output PDF path [default: meeting_brief.pdf in the current directory]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Ollama endpoint
    #[arg(long, default_value_t = config::env_or("PREPBRIEF_OLLAMA_URL", config::DEFAULT_OLLAMA_URL))]
    pub ollama_url: String,

    /// Model to ask of Ollama
    #[arg(long, default_value_t = config::env_or("PREPBRIEF_MODEL", config::DEFAULT_MODEL))]
    pub model: String,

    /// NER sidecar endpoint for entity-based redaction
    #[arg(long, default_value_t = config::env_or("PREPBRIEF_NER_URL", config::DEFAULT_NER_URL))]
    pub ner_url: String,

    /// Discard entity spans below this confidence
    #[arg(long, default_value_t = config::DEFAULT_ENTITY_CONFIDENCE)]
    pub entity_confidence: f32,

    /// Pattern-only redaction: never contact the NER sidecar
    #[arg(long)]
    pub no_entities: bool,

    /// Truncate combined content past this many bytes before summarizing
    #[arg(long, default_value_t = config::DEFAULT_MAX_CONTENT_LENGTH)]
    pub max_content_length: usize,

    /// Tesseract data directory; enables OCR for image documents
    #[cfg(feature = "ocr")]
    #[arg(long)]
    pub tessdata: Option<PathBuf>,

    /// Print per-document outcomes and extraction warnings
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolved output path: the flag if given, otherwise
    /// `meeting_brief.pdf` under the default output directory.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| config::default_output_dir().join("meeting_brief.pdf"))
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Redaction(#[from] RedactionError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Extraction(#[from] crate::pipeline::extraction::ExtractionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Progress bar over the ingestion run. Receives counts and document ids,
/// never content.
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl crate::pipeline::ProgressSink for BarProgress {
    fn begin(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                .expect("valid progress template"),
        );
        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
    }

    fn document_done(&self, completed: usize, document_id: &str, success: bool) {
        self.bar.set_position(completed as u64);
        let status = if success { "ok" } else { "failed" };
        self.bar.set_message(format!("{document_id}: {status}"));
    }
}

pub fn run(cli: Cli) -> Result<(), AppError> {
    tracing::info!("{} v{} starting", config::APP_NAME, config::APP_VERSION);

    let synthesizer = ReportSynthesizer::new(Box::new(OllamaClient::new(
        &cli.ollama_url,
        &cli.model,
        config::OLLAMA_TIMEOUT_SECS,
    )));

    let report = match (&cli.path, &cli.topic) {
        (_, Some(topic)) => {
            tracing::info!(topic = %topic, "topic mode, skipping ingestion");
            synthesizer.generate_from_topic(topic)
        }
        (Some(path), None) => {
            let result = ingest(&cli, path)?;

            if cli.verbose {
                print_outcomes(&result);
            }

            let sources: Vec<String> = result
                .entries
                .iter()
                .filter(|e| e.is_success())
                .map(|e| e.document_id.clone())
                .collect();
            let content = result.combined_content(cli.max_content_length);
            synthesizer.generate_from_content(&content, sources)
        }
        // clap enforces exactly one of --path / --topic.
        (None, None) => unreachable!("argument parsing requires a path or a topic"),
    };

    let output = cli.output_path();
    let bytes = render_pdf(&report)?;
    std::fs::write(&output, &bytes)?;

    println!("Brief written to {}", output.display());
    Ok(())
}

fn ingest(cli: &Cli, path: &std::path::Path) -> Result<crate::IngestionResult, AppError> {
    let policy = RedactionPolicy {
        entity_confidence_threshold: cli.entity_confidence,
        ..RedactionPolicy::default()
    };

    let recognizer: Option<Box<dyn EntityRecognizer>> = if cli.no_entities {
        None
    } else {
        Some(Box::new(HttpNerClient::new(
            &cli.ner_url,
            config::NER_TIMEOUT_SECS,
        )))
    };

    let redactor = RedactionPipeline::new(&policy, recognizer)?;
    let orchestrator = IngestionOrchestrator::new(build_extractor(cli)?, redactor);

    let result = orchestrator.process_all(path, &BarProgress::new(), &CancelFlag::new())?;
    println!(
        "Processed {} document(s): {} succeeded, {} failed",
        result.entries.len(),
        result.success_count(),
        result.failure_count()
    );
    Ok(result)
}

#[cfg(feature = "ocr")]
fn build_extractor(cli: &Cli) -> Result<FormatExtractor, AppError> {
    match &cli.tessdata {
        Some(dir) => {
            let engine = crate::pipeline::extraction::BundledTesseract::new(dir)?;
            Ok(FormatExtractor::new(
                Some(Box::new(engine)),
                config::env_or("PREPBRIEF_OCR_LANG", config::DEFAULT_OCR_LANGUAGE),
            ))
        }
        None => Ok(FormatExtractor::without_ocr()),
    }
}

#[cfg(not(feature = "ocr"))]
fn build_extractor(_cli: &Cli) -> Result<FormatExtractor, AppError> {
    Ok(FormatExtractor::without_ocr())
}

fn print_outcomes(result: &crate::IngestionResult) {
    for entry in &result.entries {
        match &entry.outcome {
            DocumentOutcome::Redacted(record) => {
                println!(
                    "  {} [{}]: {} item(s) redacted{}",
                    entry.document_id,
                    entry.format.as_str(),
                    record.total_removed(),
                    if record.reduced_confidence {
                        " (pattern-only, reduced confidence)"
                    } else {
                        ""
                    }
                );
                for (category, count) in &record.counts {
                    println!("      {category}: {count}");
                }
            }
            DocumentOutcome::Failed { reason } => {
                println!("  {} [{}]: FAILED: {reason}", entry.document_id, entry.format.as_str());
            }
        }
        for warning in &entry.warnings {
            println!("      warning: {warning}");
        }
    }
}
