//! Ingestion orchestrator: discovery → extract → redact per document.
//!
//! Documents are processed sequentially in discovery order; each document
//! is independent, and per-document failures never abort the set. The run
//! as a whole fails only when zero documents yield a redaction record.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;
use walkdir::WalkDir;

use super::extraction::{
    sanitize_extracted_text, DocumentFormat, ExtractionError, FormatExtractor, SourceDocument,
};
use super::redaction::{RedactionPipeline, RedactionRecord};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No supported documents found under {0}")]
    NoDocuments(PathBuf),

    #[error("Cannot ingest {path}: {source}")]
    UnsupportedFile {
        path: PathBuf,
        #[source]
        source: ExtractionError,
    },

    #[error("All {0} documents failed; nothing to summarize")]
    AllDocumentsFailed(usize),
}

/// Per-document outcome inside an ingestion result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum DocumentOutcome {
    Redacted(RedactionRecord),
    Failed { reason: String },
}

/// One entry per discovered document, in discovery order.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentEntry {
    pub document_id: String,
    pub format: DocumentFormat,
    #[serde(flatten)]
    pub outcome: DocumentOutcome,
    /// Extraction warnings, surfaced in verbose mode.
    pub warnings: Vec<String>,
}

impl DocumentEntry {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, DocumentOutcome::Redacted(_))
    }
}

/// Aggregate handed whole to the downstream summarizer.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionResult {
    pub run_id: Uuid,
    pub entries: Vec<DocumentEntry>,
}

impl IngestionResult {
    pub fn success_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.entries.len() - self.success_count()
    }

    /// Combined sanitized text for the summarizer, one block per document,
    /// truncated at a word boundary past `max_len`.
    pub fn combined_content(&self, max_len: usize) -> String {
        let blocks: Vec<String> = self
            .entries
            .iter()
            .filter_map(|e| match &e.outcome {
                DocumentOutcome::Redacted(record) => Some(format!(
                    "Document: {}\nContent: {}",
                    e.document_id, record.sanitized_text
                )),
                DocumentOutcome::Failed { .. } => None,
            })
            .collect();
        truncate_at_word_boundary(&blocks.join("\n\n"), max_len)
    }
}

/// Side-channel for progress reporting. Receives counts, never content.
pub trait ProgressSink {
    fn begin(&self, total: usize);
    fn document_done(&self, completed: usize, document_id: &str, success: bool);
}

/// Sink that ignores everything.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn begin(&self, _total: usize) {}
    fn document_done(&self, _completed: usize, _document_id: &str, _success: bool) {}
}

/// Coarse cancellation: stops documents that have not started yet.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Drives Extract → Redact across a document set.
pub struct IngestionOrchestrator {
    extractor: FormatExtractor,
    redactor: RedactionPipeline,
}

impl IngestionOrchestrator {
    pub fn new(extractor: FormatExtractor, redactor: RedactionPipeline) -> Self {
        Self {
            extractor,
            redactor,
        }
    }

    /// Discover and process every supported document under `root`.
    ///
    /// Partial success is the default outcome; the run fails only when no
    /// document at all produced a redaction record.
    pub fn process_all(
        &self,
        root: &Path,
        progress: &dyn ProgressSink,
        cancel: &CancelFlag,
    ) -> Result<IngestionResult, IngestError> {
        let discovered = discover_documents(root)?;
        if discovered.is_empty() {
            return Err(IngestError::NoDocuments(root.to_path_buf()));
        }

        let run_id = Uuid::new_v4();
        tracing::info!(
            run_id = %run_id,
            documents = discovered.len(),
            root = %root.display(),
            "ingestion run starting"
        );
        progress.begin(discovered.len());

        let mut entries = Vec::with_capacity(discovered.len());
        for (i, (path, format)) in discovered.iter().enumerate() {
            let document_id = path.display().to_string();

            let entry = if cancel.is_cancelled() {
                tracing::info!(document_id = %document_id, "cancelled before start");
                DocumentEntry {
                    document_id: document_id.clone(),
                    format: *format,
                    outcome: DocumentOutcome::Failed {
                        reason: "cancelled before start".to_string(),
                    },
                    warnings: vec![],
                }
            } else {
                self.process_one(path, *format, &document_id)
            };

            progress.document_done(i + 1, &document_id, entry.is_success());
            entries.push(entry);
        }

        let result = IngestionResult { run_id, entries };
        if result.success_count() == 0 {
            return Err(IngestError::AllDocumentsFailed(result.entries.len()));
        }

        tracing::info!(
            run_id = %run_id,
            succeeded = result.success_count(),
            failed = result.failure_count(),
            "ingestion run complete"
        );
        Ok(result)
    }

    fn process_one(&self, path: &Path, format: DocumentFormat, document_id: &str) -> DocumentEntry {
        match self.extract_and_redact(path, format, document_id) {
            Ok((record, warnings)) => DocumentEntry {
                document_id: document_id.to_string(),
                format,
                outcome: DocumentOutcome::Redacted(record),
                warnings,
            },
            Err(e) => {
                tracing::warn!(
                    document_id = %document_id,
                    error = %e,
                    "document failed, continuing with the rest"
                );
                DocumentEntry {
                    document_id: document_id.to_string(),
                    format,
                    outcome: DocumentOutcome::Failed {
                        reason: e.to_string(),
                    },
                    warnings: vec![],
                }
            }
        }
    }

    fn extract_and_redact(
        &self,
        path: &Path,
        format: DocumentFormat,
        document_id: &str,
    ) -> Result<(RedactionRecord, Vec<String>), ExtractionError> {
        let bytes = std::fs::read(path)?;
        let doc = SourceDocument::new(document_id, format, bytes);

        let extracted = self.extractor.extract(&doc)?;
        let warnings: Vec<String> = extracted.warnings.iter().map(|w| w.to_string()).collect();

        let clean = sanitize_extracted_text(&extracted.content);
        let record = self.redactor.redact(&clean);

        tracing::debug!(
            document_id = %document_id,
            removed = record.total_removed(),
            reduced_confidence = record.reduced_confidence,
            "document redacted"
        );
        Ok((record, warnings))
    }
}

/// Walk `root`, mapping extensions to format tags. Sorted by path so
/// discovery order is stable regardless of filesystem iteration order.
///
/// A single-file root must itself be a supported format; inside a
/// directory walk, unsupported files are skipped silently.
pub fn discover_documents(root: &Path) -> Result<Vec<(PathBuf, DocumentFormat)>, IngestError> {
    if root.is_file() {
        let format =
            DocumentFormat::from_path(root).map_err(|source| IngestError::UnsupportedFile {
                path: root.to_path_buf(),
                source,
            })?;
        return Ok(vec![(root.to_path_buf(), format)]);
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            IngestError::Io(e.into_io_error().unwrap_or_else(|| {
                std::io::Error::other("walkdir error without io cause")
            }))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if let Some(format) = DocumentFormat::from_extension(&ext.to_ascii_lowercase()) {
            found.push((path, format));
        }
    }
    found.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(found)
}

fn truncate_at_word_boundary(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut cut = max;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let truncated = &text[..cut];
    match truncated.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 => truncated[..pos].to_string(),
        _ => truncated.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::redaction::RedactionPolicy;
    use std::sync::Mutex;

    fn orchestrator() -> IngestionOrchestrator {
        IngestionOrchestrator::new(
            FormatExtractor::without_ocr(),
            RedactionPipeline::new(&RedactionPolicy::default(), None).unwrap(),
        )
    }

    fn write(dir: &Path, name: &str, bytes: &[u8]) {
        std::fs::write(dir.join(name), bytes).unwrap();
    }

    #[test]
    fn partial_failure_never_aborts_the_set() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.txt", b"alpha notes, mail a@b.co");
        write(dir.path(), "b.txt", b"beta notes");
        write(dir.path(), "c.txt", b"gamma notes");
        // Corrupt PDF: extraction fails for this document only.
        write(dir.path(), "broken.pdf", b"not a pdf");

        let result = orchestrator()
            .process_all(dir.path(), &NullProgress, &CancelFlag::new())
            .unwrap();

        assert_eq!(result.entries.len(), 4);
        assert_eq!(result.success_count(), 3);
        assert_eq!(result.failure_count(), 1);
        let failed = result.entries.iter().find(|e| !e.is_success()).unwrap();
        assert!(failed.document_id.ends_with("broken.pdf"));
    }

    #[test]
    fn entries_follow_discovery_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "zeta.txt", b"z");
        write(dir.path(), "alpha.txt", b"a");
        write(dir.path(), "mid.txt", b"m");

        let result = orchestrator()
            .process_all(dir.path(), &NullProgress, &CancelFlag::new())
            .unwrap();

        let ids: Vec<&str> = result
            .entries
            .iter()
            .map(|e| e.document_id.as_str())
            .collect();
        assert!(ids[0].ends_with("alpha.txt"));
        assert!(ids[1].ends_with("mid.txt"));
        assert!(ids[2].ends_with("zeta.txt"));
    }

    #[test]
    fn unsupported_extensions_are_not_discovered() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "notes.txt", b"keep");
        write(dir.path(), "binary.exe", b"skip");
        write(dir.path(), "noext", b"skip");

        let discovered = discover_documents(dir.path()).unwrap();
        assert_eq!(discovered.len(), 1);
        assert_eq!(discovered[0].1, DocumentFormat::Text);
    }

    #[test]
    fn single_file_root_is_ingested_directly() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "solo.txt", b"only document, mail a@b.co");

        let result = orchestrator()
            .process_all(&dir.path().join("solo.txt"), &NullProgress, &CancelFlag::new())
            .unwrap();

        assert_eq!(result.entries.len(), 1);
        assert!(result.entries[0].is_success());
    }

    #[test]
    fn unsupported_single_file_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "binary.exe", b"\x7fELF");

        let result = orchestrator().process_all(
            &dir.path().join("binary.exe"),
            &NullProgress,
            &CancelFlag::new(),
        );
        assert!(matches!(
            result,
            Err(IngestError::UnsupportedFile {
                source: ExtractionError::UnsupportedFormat,
                ..
            })
        ));
    }

    #[test]
    fn empty_directory_fails_with_no_documents() {
        let dir = tempfile::tempdir().unwrap();
        let result = orchestrator().process_all(dir.path(), &NullProgress, &CancelFlag::new());
        assert!(matches!(result, Err(IngestError::NoDocuments(_))));
    }

    #[test]
    fn all_failures_fail_the_whole_run() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "one.pdf", b"junk");
        write(dir.path(), "two.pdf", b"junk");

        let result = orchestrator().process_all(dir.path(), &NullProgress, &CancelFlag::new());
        assert!(matches!(result, Err(IngestError::AllDocumentsFailed(2))));
    }

    #[test]
    fn sanitized_content_feeds_the_summary_block() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.txt", b"reach me: me@example.com");

        let result = orchestrator()
            .process_all(dir.path(), &NullProgress, &CancelFlag::new())
            .unwrap();

        let combined = result.combined_content(10_000);
        assert!(combined.contains("[REDACTED:EMAIL]"));
        assert!(!combined.contains("me@example.com"));
        assert!(combined.contains("Document:"));
    }

    #[test]
    fn combined_content_truncates_at_word_boundary() {
        let text = "one two three four";
        assert_eq!(truncate_at_word_boundary(text, 9), "one two");
        assert_eq!(truncate_at_word_boundary(text, 100), text);
    }

    #[test]
    fn cancel_marks_unstarted_documents() {
        struct CancelAfterFirst {
            flag: CancelFlag,
            seen: Mutex<usize>,
        }
        impl ProgressSink for CancelAfterFirst {
            fn begin(&self, _total: usize) {}
            fn document_done(&self, _completed: usize, _id: &str, _success: bool) {
                let mut seen = self.seen.lock().unwrap();
                *seen += 1;
                if *seen == 1 {
                    self.flag.cancel();
                }
            }
        }

        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.txt", b"first");
        write(dir.path(), "b.txt", b"second");
        write(dir.path(), "c.txt", b"third");

        let cancel = CancelFlag::new();
        let sink = CancelAfterFirst {
            flag: cancel.clone(),
            seen: Mutex::new(0),
        };

        let result = orchestrator()
            .process_all(dir.path(), &sink, &cancel)
            .unwrap();

        assert_eq!(result.success_count(), 1);
        assert_eq!(result.failure_count(), 2);
        for entry in &result.entries[1..] {
            match &entry.outcome {
                DocumentOutcome::Failed { reason } => {
                    assert_eq!(reason, "cancelled before start")
                }
                _ => panic!("expected cancelled entry"),
            }
        }
    }

    #[test]
    fn progress_sink_receives_counts_only() {
        struct CountingSink {
            total: Mutex<usize>,
            done: Mutex<Vec<usize>>,
        }
        impl ProgressSink for CountingSink {
            fn begin(&self, total: usize) {
                *self.total.lock().unwrap() = total;
            }
            fn document_done(&self, completed: usize, _id: &str, _success: bool) {
                self.done.lock().unwrap().push(completed);
            }
        }

        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.txt", b"x");
        write(dir.path(), "b.txt", b"y");

        let sink = CountingSink {
            total: Mutex::new(0),
            done: Mutex::new(vec![]),
        };
        orchestrator()
            .process_all(dir.path(), &sink, &CancelFlag::new())
            .unwrap();

        assert_eq!(*sink.total.lock().unwrap(), 2);
        assert_eq!(*sink.done.lock().unwrap(), vec![1, 2]);
    }
}
