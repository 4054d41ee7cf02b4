use async_trait::async_trait;
use crate::error::Result;

/// Information about a translator backend
#[derive(Debug, Clone)]
pub struct TranslatorInfo {
    /// Human-readable name
    pub name: &'static str,
}

/// An English to Amharic translation backend.
///
/// The pipeline treats this as an opaque `text -> text` capability: it may be
/// slow, it may fail for any input, and it is called once per distinct text.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Get information about this translator
    fn info(&self) -> TranslatorInfo;

    /// Translate a piece of English text into Amharic
    async fn translate(&self, text: &str) -> Result<String>;
}
