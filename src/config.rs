use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Prepbrief";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default Ollama endpoint for report synthesis.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default NER sidecar endpoint for entity-based redaction.
pub const DEFAULT_NER_URL: &str = "http://localhost:8765";

/// Default model asked of Ollama when none is given on the CLI.
pub const DEFAULT_MODEL: &str = "llama3.1";

/// Entity spans below this confidence are discarded (conservative default).
pub const DEFAULT_ENTITY_CONFIDENCE: f32 = 0.6;

/// Combined sanitized text handed to the summarizer is truncated past this.
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 60_000;

/// Default OCR language passed to the engine.
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

/// HTTP timeout for the NER sidecar, in seconds.
pub const NER_TIMEOUT_SECS: u64 = 30;

/// HTTP timeout for Ollama generation, in seconds.
pub const OLLAMA_TIMEOUT_SECS: u64 = 300;

/// Default log filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    "prepbrief=info".to_string()
}

/// Read an env-var override, falling back to the given default.
pub fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

/// Default output directory for generated briefs: current dir, or home
/// when the current dir cannot be determined.
pub fn default_output_dir() -> PathBuf {
    std::env::current_dir()
        .or_else(|_| dirs::home_dir().ok_or(std::io::Error::other("no home dir")))
        .unwrap_or_else(|_| PathBuf::from("."))
}
