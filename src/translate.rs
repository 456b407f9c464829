//! Translation of finished summaries. Never used inside summarization itself.

use crate::backend::OpenAiClient;
use crate::error::TranslateError;

const TRANSLATOR_PROMPT: &str =
    "You are a professional translator. Translate the user content faithfully into the target language.";

pub trait Translator {
    fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslateError>;
}

/// Chat-completion translator, deterministic (temperature 0).
pub struct OpenAiTranslator {
    client: OpenAiClient,
}

impl OpenAiTranslator {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

impl Translator for OpenAiTranslator {
    fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslateError> {
        let target = target_language.trim();
        if target.is_empty() {
            return Err(TranslateError::EmptyTarget);
        }
        let content = translation_request(text, target);
        let translated = self.client.chat(TRANSLATOR_PROMPT, &content, 0.0)?;
        Ok(translated)
    }
}

fn translation_request(text: &str, target: &str) -> String {
    format!("Target language: {target}\n\nText:\n{text}")
}

/// Language code from a label such as `"Korean (ko)"`; bare codes pass through.
pub fn language_code(label: &str) -> &str {
    let label = label.trim();
    match (label.rfind('('), label.strip_suffix(')')) {
        (Some(open), Some(inner)) => inner[open + 1..].trim(),
        _ => label,
    }
}
