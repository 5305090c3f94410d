use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Section titles in render order. The summarizer is asked for exactly
/// these; anything else it returns is ignored.
pub const SECTION_ORDER: &[&str] = &[
    "Executive Summary",
    "Topic Overview",
    "Technology Stack Analysis",
    "Architecture Overview",
    "Advantages and Benefits",
    "Limitations and Challenges",
    "Alternative Solutions",
    "Competitive Analysis",
    "Key Recommendations",
    "Action Items and Next Steps",
];

/// Body of one report section: prose or a bullet list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionBody {
    Text(String),
    Bullets(Vec<String>),
}

impl SectionBody {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(t) => t.trim().is_empty(),
            Self::Bullets(items) => items.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub body: SectionBody,
}

/// Where the briefing content came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ReportSource {
    Documents {
        total_documents: usize,
        source_documents: Vec<String>,
    },
    Topic {
        topic: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub source: ReportSource,
}

/// The synthesized briefing, ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredReport {
    pub title: String,
    pub sections: Vec<ReportSection>,
    pub metadata: ReportMetadata,
}

impl StructuredReport {
    pub fn section(&self, title: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.title == title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_order_has_ten_sections() {
        assert_eq!(SECTION_ORDER.len(), 10);
        assert_eq!(SECTION_ORDER[0], "Executive Summary");
    }

    #[test]
    fn section_body_empty_checks() {
        assert!(SectionBody::Text("  ".into()).is_empty());
        assert!(SectionBody::Bullets(vec![]).is_empty());
        assert!(!SectionBody::Text("content".into()).is_empty());
    }

    #[test]
    fn section_body_deserializes_string_or_array() {
        let text: SectionBody = serde_json::from_str(r#""prose""#).unwrap();
        assert_eq!(text, SectionBody::Text("prose".into()));
        let bullets: SectionBody = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(bullets, SectionBody::Bullets(vec!["a".into(), "b".into()]));
    }
}
