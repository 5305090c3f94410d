//! Encoding resolution for loosely-typed text sources.
//!
//! Strict UTF-8 first, then windows-1252, then lossy UTF-8 with
//! replacement characters — decoding never fails, the input is arbitrary
//! by definition. windows-1252 is the only single-byte fallback: it
//! supersets ISO-8859-1/-15 for every byte outside 0x80-0x9F, and that
//! range is rejected below for all of them alike.

use encoding_rs::WINDOWS_1252;

/// Outcome of a decode attempt.
#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    /// Name of the encoding that produced the text ("utf-8", "windows-1252", ...).
    pub encoding: String,
    /// True when the text came from the lossy fallback and may contain
    /// replacement characters.
    pub lossy: bool,
}

/// Decode arbitrary bytes into text, best-effort.
pub fn resolve(bytes: &[u8]) -> DecodedText {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return DecodedText {
            text: text.to_string(),
            encoding: "utf-8".to_string(),
            lossy: false,
        };
    }

    if let Some(cow) = WINDOWS_1252.decode_without_bom_handling_and_without_replacement(bytes) {
        // The WHATWG table maps 0x80-0x9F to C1 controls instead of
        // erroring; treat those as substitution failures so genuinely
        // binary input still reaches the lossy fallback.
        if !cow.chars().any(|c| ('\u{0080}'..='\u{009F}').contains(&c)) {
            tracing::debug!(
                encoding = WINDOWS_1252.name(),
                "non-UTF-8 input decoded via fallback"
            );
            return DecodedText {
                text: cow.into_owned(),
                encoding: WINDOWS_1252.name().to_ascii_lowercase(),
                lossy: false,
            };
        }
    }

    tracing::warn!(
        len = bytes.len(),
        "no encoding decoded cleanly, falling back to lossy UTF-8"
    );
    DecodedText {
        text: String::from_utf8_lossy(bytes).into_owned(),
        encoding: "utf-8".to_string(),
        lossy: true,
    }
}
