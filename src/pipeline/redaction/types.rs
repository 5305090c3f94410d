use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::RedactionError;

/// PII category a detector can flag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiCategory {
    Email,
    Phone,
    Ssn,
    CreditCard,
    Person,
    Location,
    Organization,
    /// Caller-supplied pattern, keyed by its configured name.
    Custom(String),
}

impl PiiCategory {
    /// Uppercase tag used inside placeholders, e.g. `EMAIL` or `PERSON`.
    pub fn tag(&self) -> String {
        match self {
            Self::Email => "EMAIL".to_string(),
            Self::Phone => "PHONE".to_string(),
            Self::Ssn => "SSN".to_string(),
            Self::CreditCard => "CREDIT_CARD".to_string(),
            Self::Person => "PERSON".to_string(),
            Self::Location => "LOCATION".to_string(),
            Self::Organization => "ORGANIZATION".to_string(),
            Self::Custom(name) => name
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
                .collect(),
        }
    }

    /// The placeholder substituted for a redacted span.
    pub fn placeholder(&self) -> String {
        format!("[REDACTED:{}]", self.tag())
    }

    /// Built-in pattern-detected categories.
    pub fn pattern_categories() -> [Self; 4] {
        [Self::Email, Self::Phone, Self::Ssn, Self::CreditCard]
    }

    /// Entity-detected categories (the NER allowlist).
    pub fn entity_categories() -> [Self; 3] {
        [Self::Person, Self::Location, Self::Organization]
    }
}

/// Which detector produced a match. Pattern matches are treated as higher
/// precision and win on overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorSource {
    Pattern,
    Entity,
}

/// A detected PII span. Offsets are byte offsets into the extracted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiiMatch {
    pub category: PiiCategory,
    pub start: usize,
    pub end: usize,
    /// The matched substring — retained only inside the local audit trail.
    pub text: String,
    pub source: DetectorSource,
    /// Populated by the entity detector only.
    pub confidence: Option<f32>,
}

impl PiiMatch {
    pub fn overlaps(&self, other: &PiiMatch) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// One span returned by the NER collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySpan {
    pub label: String,
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub score: f32,
}

/// Named-entity recognition collaborator.
///
/// The production implementation is an HTTP sidecar; tests use fixed mocks.
/// The recognizer owns byte offsets into the exact text it was sent.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, RedactionError>;
}

/// Redaction policy: which categories to scrub and how aggressively.
#[derive(Debug, Clone)]
pub struct RedactionPolicy {
    pub enabled_categories: BTreeSet<PiiCategory>,
    /// name → regex source; compiled on top of the built-in table.
    pub custom_patterns: BTreeMap<String, String>,
    /// Entity spans below this confidence are discarded.
    pub entity_confidence_threshold: f32,
    /// When false (the default) patterns compile case-insensitively.
    pub case_sensitive: bool,
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        let mut enabled: BTreeSet<PiiCategory> =
            PiiCategory::pattern_categories().into_iter().collect();
        enabled.extend(PiiCategory::entity_categories());
        Self {
            enabled_categories: enabled,
            custom_patterns: BTreeMap::new(),
            entity_confidence_threshold: crate::config::DEFAULT_ENTITY_CONFIDENCE,
            case_sensitive: false,
        }
    }
}

/// Output of the redaction pipeline. Immutable once produced; the matched
/// substrings inside `matches` exist for local verification only and are
/// never exported past the process boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionRecord {
    pub sanitized_text: String,
    /// Matches actually removed, in document order.
    pub matches: Vec<PiiMatch>,
    /// Removal count per category tag.
    pub counts: BTreeMap<String, usize>,
    /// True when the entity detector was unavailable and only pattern
    /// redaction ran.
    pub reduced_confidence: bool,
}

impl RedactionRecord {
    pub fn total_removed(&self) -> usize {
        self.matches.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_category_tagged() {
        assert_eq!(PiiCategory::Email.placeholder(), "[REDACTED:EMAIL]");
        assert_eq!(PiiCategory::CreditCard.placeholder(), "[REDACTED:CREDIT_CARD]");
    }

    #[test]
    fn custom_category_tag_is_sanitized_uppercase() {
        let cat = PiiCategory::Custom("employee-id".to_string());
        assert_eq!(cat.placeholder(), "[REDACTED:EMPLOYEE_ID]");
    }

    #[test]
    fn overlap_detection() {
        let a = PiiMatch {
            category: PiiCategory::Phone,
            start: 10,
            end: 22,
            text: "555-123-4567".into(),
            source: DetectorSource::Pattern,
            confidence: None,
        };
        let mut b = a.clone();
        b.start = 20;
        b.end = 30;
        assert!(a.overlaps(&b));
        b.start = 22;
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn default_policy_enables_all_builtin_categories() {
        let policy = RedactionPolicy::default();
        assert!(policy.enabled_categories.contains(&PiiCategory::Email));
        assert!(policy.enabled_categories.contains(&PiiCategory::Person));
        assert!(!policy.case_sensitive);
    }
}
