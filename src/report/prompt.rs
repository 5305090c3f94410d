//! Prompt construction for the briefing summarizer.

use super::types::SECTION_ORDER;

pub const SYSTEM_PROMPT: &str = "You are a technical analyst preparing briefing documents \
for engineering meetings. Always respond with valid JSON.";

/// Build the user prompt for document-based or topic-based briefings.
/// `content` has already passed redaction; this module never sees raw text.
pub fn build_prompt(content: Option<&str>, topic: Option<&str>) -> String {
    let mut prompt = match (content, topic) {
        (_, Some(topic)) => {
            format!("Create a comprehensive technical briefing about: {topic}")
        }
        (Some(content), None) => format!(
            "Based on the following content, create a comprehensive technical briefing:\n\n{content}"
        ),
        (None, None) => "Create a comprehensive technical briefing.".to_string(),
    };

    prompt.push_str("\n\nProvide a detailed report with the following sections:\n");
    for (i, title) in SECTION_ORDER.iter().enumerate() {
        prompt.push_str(&format!("{}. {title}\n", i + 1));
    }
    prompt.push_str(
        "\nFormat the response as a valid JSON object with these sections as keys. \
         Each section should contain relevant content as a string or array of strings.",
    );
    prompt
}
