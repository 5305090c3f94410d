//! Regex-based detection of structured PII.
//!
//! Detection is deterministic: the same text and pattern set always yield
//! the same matches, in document order.

use regex::RegexBuilder;

use super::types::{DetectorSource, PiiCategory, PiiMatch, RedactionPolicy};
use super::RedactionError;

/// Built-in category → pattern table. Custom patterns stack on top.
const BUILTIN_PATTERNS: &[(PiiCategory, &str)] = &[
    (
        PiiCategory::Email,
        r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
    ),
    // Separator-tolerant 3-3-4 digit sequence.
    (PiiCategory::Phone, r"\b\d{3}[-.\s]?\d{3}[-.\s]?\d{4}\b"),
    (PiiCategory::Ssn, r"\b\d{3}-\d{2}-\d{4}\b"),
    (
        PiiCategory::CreditCard,
        r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b",
    ),
];

/// Compiled pattern set for one policy. Compiled once, read-only afterwards;
/// safe to share across documents.
pub struct PatternRedactor {
    patterns: Vec<(PiiCategory, regex::Regex)>,
}

impl PatternRedactor {
    /// Compile the built-in table (filtered by enabled categories) plus the
    /// policy's custom patterns.
    pub fn from_policy(policy: &RedactionPolicy) -> Result<Self, RedactionError> {
        let mut patterns = Vec::new();

        for (category, source) in BUILTIN_PATTERNS {
            if !policy.enabled_categories.contains(category) {
                continue;
            }
            // Built-in sources are tested; compilation cannot fail.
            let regex = RegexBuilder::new(source)
                .case_insensitive(!policy.case_sensitive)
                .build()
                .map_err(|e| RedactionError::InvalidPattern {
                    name: category.tag(),
                    source: e,
                })?;
            patterns.push((category.clone(), regex));
        }

        // Custom patterns are opt-in by being configured at all.
        for (name, source) in &policy.custom_patterns {
            let category = PiiCategory::Custom(name.clone());
            let regex = RegexBuilder::new(source)
                .case_insensitive(!policy.case_sensitive)
                .build()
                .map_err(|e| RedactionError::InvalidPattern {
                    name: name.clone(),
                    source: e,
                })?;
            patterns.push((category, regex));
        }

        Ok(Self { patterns })
    }

    /// Scan per category, then merge into one document-order sequence.
    pub fn detect(&self, text: &str) -> Vec<PiiMatch> {
        let mut matches: Vec<PiiMatch> = Vec::new();
        for (category, regex) in &self.patterns {
            for m in regex.find_iter(text) {
                matches.push(PiiMatch {
                    category: category.clone(),
                    start: m.start(),
                    end: m.end(),
                    text: m.as_str().to_string(),
                    source: DetectorSource::Pattern,
                    confidence: None,
                });
            }
        }
        matches.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        matches
    }
}
