//! Redaction pipeline: pattern pass, entity pass, overlap resolution,
//! placeholder substitution.
//!
//! Pattern matches win on overlap — structured detectors are treated as
//! higher precision than the statistical entity layer. Replacement walks
//! right-to-left over byte offsets so earlier substitutions never
//! invalidate later ones. Placeholders are excluded from re-detection,
//! which makes redaction idempotent.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::entities::EntityRedactor;
use super::patterns::PatternRedactor;
use super::types::{
    DetectorSource, EntityRecognizer, PiiMatch, RedactionPolicy, RedactionRecord,
};
use super::RedactionError;

/// Spans already substituted by a previous redaction pass.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[REDACTED:[A-Z0-9_]+\]").expect("placeholder regex"));

/// Composes both detector layers under one policy.
///
/// Without a recognizer (or when the recognizer is unreachable) the
/// pipeline degrades to pattern-only and flags the record as
/// `reduced_confidence` — it still redacts what it can.
pub struct RedactionPipeline {
    patterns: PatternRedactor,
    entities: Option<EntityRedactor>,
}

impl RedactionPipeline {
    pub fn new(
        policy: &RedactionPolicy,
        recognizer: Option<Box<dyn EntityRecognizer>>,
    ) -> Result<Self, RedactionError> {
        let patterns = PatternRedactor::from_policy(policy)?;
        let entities = recognizer.map(|r| EntityRedactor::new(r, policy));
        Ok(Self { patterns, entities })
    }

    /// Redact one document's text. Infallible: detector failures degrade,
    /// they never lose the document.
    pub fn redact(&self, text: &str) -> RedactionRecord {
        let placeholders = placeholder_spans(text);

        let pattern_matches = exclude_placeholder_overlaps(self.patterns.detect(text), &placeholders);

        let mut reduced_confidence = false;
        let entity_matches = match &self.entities {
            Some(detector) => match detector.detect(text) {
                Ok(matches) => exclude_placeholder_overlaps(matches, &placeholders),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "entity recognizer unavailable, continuing pattern-only"
                    );
                    reduced_confidence = true;
                    vec![]
                }
            },
            None => {
                reduced_confidence = true;
                vec![]
            }
        };

        let resolved = resolve_overlaps(pattern_matches, entity_matches);
        let sanitized_text = substitute(text, &resolved);

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for m in &resolved {
            *counts.entry(m.category.tag()).or_insert(0) += 1;
        }

        tracing::debug!(
            removed = resolved.len(),
            reduced_confidence,
            "redaction complete"
        );

        RedactionRecord {
            sanitized_text,
            matches: resolved,
            counts,
            reduced_confidence,
        }
    }
}

fn placeholder_spans(text: &str) -> Vec<(usize, usize)> {
    PLACEHOLDER_RE
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect()
}

fn exclude_placeholder_overlaps(
    matches: Vec<PiiMatch>,
    placeholders: &[(usize, usize)],
) -> Vec<PiiMatch> {
    matches
        .into_iter()
        .filter(|m| {
            !placeholders
                .iter()
                .any(|&(start, end)| m.start < end && start < m.end)
        })
        .collect()
}

/// Merge both layers into one non-overlapping, document-ordered sequence.
///
/// Pattern matches are admitted first (earlier start, then longer span
/// wins among themselves); entity spans are admitted highest confidence
/// first, and any span overlapping something already admitted is dropped.
fn resolve_overlaps(pattern: Vec<PiiMatch>, mut entity: Vec<PiiMatch>) -> Vec<PiiMatch> {
    let mut resolved: Vec<PiiMatch> = Vec::new();

    for m in pattern {
        if !resolved.iter().any(|kept| kept.overlaps(&m)) {
            resolved.push(m);
        }
    }

    entity.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.start.cmp(&b.start))
    });
    for m in entity {
        if !resolved.iter().any(|kept| kept.overlaps(&m)) {
            resolved.push(m);
        }
    }

    resolved.sort_by(|a, b| a.start.cmp(&b.start));
    resolved
}

/// Replace every resolved span with its category placeholder, right to left.
fn substitute(text: &str, resolved: &[PiiMatch]) -> String {
    let mut sanitized = text.to_string();
    for m in resolved.iter().rev() {
        sanitized.replace_range(m.start..m.end, &m.category.placeholder());
    }
    sanitized
}
