/// Sanitize extracted text before it enters redaction.
/// Strips control and invisible Unicode characters, trims each line, and
/// collapses runs of blank lines.
pub fn sanitize_extracted_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| is_visible(*c))
        .collect::<String>()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_visible(c: char) -> bool {
    if c == '\n' || c == '\t' {
        return true;
    }
    if c.is_control() {
        return false;
    }
    // Zero-width and directional-formatting characters survive many
    // extractors and confuse both regexes and the NER sidecar.
    !matches!(
        c,
        '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{2069}'
            | '\u{FEFF}'
            | '\u{00AD}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_null_bytes() {
        let clean = sanitize_extracted_text("agenda\x00item");
        assert!(!clean.contains('\x00'));
        assert!(clean.contains("agendaitem"));
    }

    #[test]
    fn strips_control_characters_keeps_content() {
        let clean = sanitize_extracted_text("Q3 numbers\x01\x02\nroadmap 2025");
        assert!(!clean.contains('\x01'));
        assert!(clean.contains("Q3 numbers"));
        assert!(clean.contains("roadmap 2025"));
    }

    #[test]
    fn strips_zero_width_characters() {
        let clean = sanitize_extracted_text("he\u{200B}llo\u{FEFF} world");
        assert_eq!(clean, "hello world");
    }

    #[test]
    fn collapses_blank_lines_and_trims() {
        let clean = sanitize_extracted_text("  one  \n\n\n two \n\n three ");
        assert_eq!(clean, "one\ntwo\nthree");
    }

    #[test]
    fn empty_input_returns_empty() {
        assert_eq!(sanitize_extracted_text(""), "");
        assert_eq!(sanitize_extracted_text("\x00\x01"), "");
    }

    #[test]
    fn preserves_accented_text_and_punctuation() {
        let clean = sanitize_extracted_text("Réunion: budget (2025), 50% done.");
        assert_eq!(clean, "Réunion: budget (2025), 50% done.");
    }
}
