//! PDF rendering via printpdf. A4 portrait, built-in Helvetica fonts,
//! simple y-cursor layout with word wrapping and page breaks.

use std::io::BufWriter;

use printpdf::*;

use super::types::{ReportSource, SectionBody, StructuredReport};
use super::ReportError;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const TOP_MM: f32 = 280.0;
const BOTTOM_MM: f32 = 20.0;
const WRAP_COLUMNS: usize = 90;

/// Render a structured report to PDF bytes.
pub fn render_pdf(report: &StructuredReport) -> Result<Vec<u8>, ReportError> {
    let (doc, page1, layer1) =
        PdfDocument::new(&report.title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::PdfRender(format!("font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::PdfRender(format!("font error: {e}")))?;

    let mut layer = doc.get_page(page1).get_layer(layer1);
    let mut y = Mm(TOP_MM);

    // Title block
    layer.use_text(&report.title, 16.0, Mm(20.0), y, &bold);
    y -= Mm(8.0);
    layer.use_text(
        format!(
            "Generated: {}",
            report.metadata.generated_at.format("%B %d, %Y %H:%M UTC")
        ),
        9.0,
        Mm(20.0),
        y,
        &font,
    );
    y -= Mm(5.0);

    let source_line = match &report.metadata.source {
        ReportSource::Documents {
            total_documents, ..
        } => format!("Based on {total_documents} source document(s)"),
        ReportSource::Topic { topic } => format!("Topic: {topic}"),
    };
    layer.use_text(&source_line, 9.0, Mm(20.0), y, &font);
    y -= Mm(12.0);

    for section in &report.sections {
        // Keep the heading with at least one content line.
        if y < Mm(BOTTOM_MM + 15.0) {
            let (page, new_layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(new_layer);
            y = Mm(TOP_MM);
        }

        layer.use_text(&section.title, 12.0, Mm(20.0), y, &bold);
        y -= Mm(6.0);

        let lines = section_lines(&section.body);
        for line in lines {
            if y < Mm(BOTTOM_MM) {
                let (page, new_layer) =
                    doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
                layer = doc.get_page(page).get_layer(new_layer);
                y = Mm(TOP_MM);
            }
            layer.use_text(&line, 10.0, Mm(25.0), y, &font);
            y -= Mm(5.0);
        }
        y -= Mm(6.0);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::PdfRender(format!("save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ReportError::PdfRender(format!("buffer error: {e}")))
}

fn section_lines(body: &SectionBody) -> Vec<String> {
    match body {
        SectionBody::Text(text) => text
            .split("\n\n")
            .flat_map(|paragraph| wrap_text(paragraph.trim(), WRAP_COLUMNS))
            .collect(),
        SectionBody::Bullets(items) => items
            .iter()
            .flat_map(|item| {
                let mut lines = wrap_text(item, WRAP_COLUMNS - 2);
                for (i, line) in lines.iter_mut().enumerate() {
                    let prefix = if i == 0 { "\u{2022} " } else { "  " };
                    *line = format!("{prefix}{line}");
                }
                lines
            })
            .collect(),
    }
}

/// Greedy word wrap to a column width; words longer than the width get a
/// line of their own.
fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= columns {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::types::{ReportMetadata, ReportSection};
    use chrono::Utc;

    fn sample_report(section_count: usize) -> StructuredReport {
        let sections = (0..section_count)
            .map(|i| ReportSection {
                title: format!("Section {i}"),
                body: SectionBody::Text("word ".repeat(200)),
            })
            .collect();
        StructuredReport {
            title: "Engineering Meeting Brief".to_string(),
            sections,
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                source: ReportSource::Topic {
                    topic: "testing".to_string(),
                },
            },
        }
    }

    #[test]
    fn renders_nonempty_pdf_bytes() {
        let bytes = render_pdf(&sample_report(2)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn long_reports_span_multiple_pages_without_error() {
        let bytes = render_pdf(&sample_report(12)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn wrap_respects_column_width() {
        let lines = wrap_text("alpha beta gamma delta epsilon", 11);
        assert_eq!(lines, vec!["alpha beta", "gamma delta", "epsilon"]);
        for line in &lines {
            assert!(line.chars().count() <= 11);
        }
    }

    #[test]
    fn wrap_handles_overlong_words() {
        let lines = wrap_text("a supercalifragilisticexpialidocious b", 10);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn bullets_are_prefixed() {
        let lines = section_lines(&SectionBody::Bullets(vec!["first item".into()]));
        assert!(lines[0].starts_with("\u{2022} "));
    }
}
