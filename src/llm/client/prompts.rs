//! Default LLM prompts for document summarization.

/// Default prompt for summarizing a scanned resolution.
pub const DEFAULT_SUMMARY_PROMPT: &str = r#"Your task is to extract the key information from the municipal resolution below, provided as plain OCR text, and return it as a brief text that is a complete and accurate summary of what is being resolved.

Ignore page labels and OCR noise. Do not invent facts that are not in the text.

## Resolution text:
{content}"#;
