//! NER-based detection of unstructured PII.
//!
//! The recognizer is an external collaborator (an HTTP sidecar in
//! production) behind the `EntityRecognizer` trait. Spans come back with
//! byte offsets into the exact text sent; anything that fails boundary
//! validation is dropped rather than trusted.

use serde::{Deserialize, Serialize};

use super::types::{
    DetectorSource, EntityRecognizer, EntitySpan, PiiCategory, PiiMatch, RedactionPolicy,
};
use super::RedactionError;

/// Entity detector: allowlist + confidence filter over a recognizer.
pub struct EntityRedactor {
    recognizer: Box<dyn EntityRecognizer>,
    allowlist: Vec<PiiCategory>,
    confidence_threshold: f32,
}

impl EntityRedactor {
    pub fn new(recognizer: Box<dyn EntityRecognizer>, policy: &RedactionPolicy) -> Self {
        let allowlist = PiiCategory::entity_categories()
            .into_iter()
            .filter(|c| policy.enabled_categories.contains(c))
            .collect();
        Self {
            recognizer,
            allowlist,
            confidence_threshold: policy.entity_confidence_threshold,
        }
    }

    /// Detect entity spans in document order.
    ///
    /// Spans outside the allowlist, below the confidence threshold, or with
    /// invalid byte offsets are discarded. An unreachable recognizer
    /// surfaces as an error so the pipeline can degrade to pattern-only.
    pub fn detect(&self, text: &str) -> Result<Vec<PiiMatch>, RedactionError> {
        if self.allowlist.is_empty() {
            return Ok(vec![]);
        }

        let spans = self.recognizer.recognize(text)?;

        let mut matches: Vec<PiiMatch> = Vec::new();
        for span in spans {
            let Some(category) = label_to_category(&span.label) else {
                continue;
            };
            if !self.allowlist.contains(&category) {
                continue;
            }
            if span.score < self.confidence_threshold {
                tracing::debug!(
                    label = %span.label,
                    score = span.score,
                    "entity span below confidence threshold, discarded"
                );
                continue;
            }
            if !valid_span(text, span.start, span.end) {
                tracing::warn!(
                    start = span.start,
                    end = span.end,
                    "entity span has invalid offsets, discarded"
                );
                continue;
            }
            matches.push(PiiMatch {
                category,
                start: span.start,
                end: span.end,
                text: text[span.start..span.end].to_string(),
                source: DetectorSource::Entity,
                confidence: Some(span.score),
            });
        }

        matches.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        Ok(matches)
    }
}

fn label_to_category(label: &str) -> Option<PiiCategory> {
    match label.to_ascii_uppercase().as_str() {
        "PERSON" | "PER" => Some(PiiCategory::Person),
        "LOCATION" | "LOC" | "GPE" => Some(PiiCategory::Location),
        "ORGANIZATION" | "ORG" => Some(PiiCategory::Organization),
        _ => None,
    }
}

fn valid_span(text: &str, start: usize, end: usize) -> bool {
    start < end && end <= text.len() && text.is_char_boundary(start) && text.is_char_boundary(end)
}

// ---------------------------------------------------------------------------
// HTTP sidecar client
// ---------------------------------------------------------------------------

/// Request body for the sidecar's /analyze endpoint.
#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
    labels: &'a [&'a str],
}

/// One span in the sidecar response.
#[derive(Deserialize)]
struct AnalyzeSpan {
    label: String,
    start: usize,
    end: usize,
    #[serde(default)]
    text: String,
    score: f32,
}

/// HTTP client for a local NER sidecar service.
///
/// The model behind the sidecar is loaded once per process and treated as
/// read-only; this client is safe to share across documents.
pub struct HttpNerClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpNerClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }
}

impl EntityRecognizer for HttpNerClient {
    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, RedactionError> {
        let url = format!("{}/analyze", self.base_url);
        let body = AnalyzeRequest {
            text,
            labels: &["PERSON", "ORGANIZATION", "LOCATION"],
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                RedactionError::EngineUnavailable(self.base_url.clone())
            } else if e.is_timeout() {
                RedactionError::EngineUnavailable(format!(
                    "timed out after {}s",
                    self.timeout_secs
                ))
            } else {
                RedactionError::EngineUnavailable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RedactionError::EngineResponse(format!(
                "HTTP {status} from NER sidecar"
            )));
        }

        let spans: Vec<AnalyzeSpan> = response
            .json()
            .map_err(|e| RedactionError::EngineResponse(e.to_string()))?;

        Ok(spans
            .into_iter()
            .map(|s| EntitySpan {
                label: s.label,
                start: s.start,
                end: s.end,
                text: s.text,
                score: s.score,
            })
            .collect())
    }
}
