mod traits;
mod openai;

pub use traits::{Translator, TranslatorInfo};
pub use openai::OpenAiTranslator;

use crate::config::TranslatorConfig;
use crate::error::Result;
use crate::text;
use std::sync::Arc;
use tracing::debug;

/// Create a translator from configuration
pub fn create_translator(config: &TranslatorConfig) -> Result<Arc<dyn Translator>> {
    let translator = OpenAiTranslator::from_config(config)?;
    Ok(Arc::new(translator))
}

/// Translate free text of any length.
///
/// The text is cleaned, split into chunks of at most `max_chunk_len`
/// characters, each chunk is translated in order, and the results are joined
/// with single spaces. Chunk seams may show boundary artifacts.
pub async fn translate_text(
    translator: &dyn Translator,
    text: &str,
    max_chunk_len: usize,
) -> Result<String> {
    let cleaned = text::clean(text);
    if cleaned.is_empty() {
        return Ok(String::new());
    }

    let mut translated = Vec::new();
    for (i, chunk) in text::split(&cleaned, max_chunk_len).enumerate() {
        debug!("Translating chunk {} ({} chars)", i + 1, chunk.chars().count());
        translated.push(translator.translate(&chunk).await?);
    }

    Ok(translated.join(" "))
}
