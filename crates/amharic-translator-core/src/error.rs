use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for amharic-translator-core
///
/// The first group covers the fatal pipeline failures a caller of
/// [`crate::PdfTranslator::translate_pdf`] can observe. Everything below it
/// is a lower-level cause that gets folded into one of those, or surfaces
/// from the plain-text path and configuration loading.
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Pipeline Errors
    // ==========================================================================
    /// No page of the document yielded a usable text run
    #[error("no extractable text found in PDF")]
    ExtractionEmpty,

    /// The translation backend failed for some unique text
    #[error("translation failed: {0}")]
    TranslationFailed(String),

    /// The renderer produced no bytes
    #[error("failed to create PDF: {0}")]
    RenderFailed(String),

    /// Failed to persist the translated PDF
    #[error("failed to write output {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ==========================================================================
    // PDF Errors
    // ==========================================================================
    /// Failed to open or parse a PDF file
    #[error("failed to open PDF: {0}")]
    PdfOpen(String),

    /// Error from the lopdf library
    #[error("lopdf error: {0}")]
    Lopdf(String),

    /// A target-script font could not be loaded
    #[error("failed to load font {}: {reason}", path.display())]
    FontLoad { path: PathBuf, reason: String },

    // ==========================================================================
    // Translation Errors
    // ==========================================================================
    /// Translation API request failed
    #[error("translation API request failed: {0}")]
    TranslationRequest(String),

    /// Invalid response from translation API
    #[error("invalid translation API response: {0}")]
    TranslationInvalidResponse(String),

    /// Rate limited by translation API
    #[error(
        "translation rate limited{}",
        retry_after.map(|s| format!(", retry after {s} seconds")).unwrap_or_default()
    )]
    TranslationRateLimited { retry_after: Option<u64> },

    /// A translation call did not finish in time
    #[error("translation request timed out")]
    TranslationTimeout,

    /// Maximum retry attempts exceeded for translation
    #[error("translation failed after maximum retries")]
    TranslationMaxRetriesExceeded,

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    ConfigInvalid { field: String, reason: String },

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Plain-language message for end users, one per fatal failure class.
    pub fn user_message(&self) -> String {
        match self {
            Self::ExtractionEmpty => "Could not extract text from PDF. Please ensure the PDF \
                                     contains text and not just images."
                .to_string(),
            Self::TranslationFailed(_)
            | Self::TranslationTimeout
            | Self::TranslationRequest(_)
            | Self::TranslationInvalidResponse(_)
            | Self::TranslationRateLimited { .. }
            | Self::TranslationMaxRetriesExceeded => {
                "Translation failed. Please try again or check your internet connection."
                    .to_string()
            }
            Self::RenderFailed(_) => "Could not create translated PDF. The file might be \
                                     corrupted or in an unsupported format."
                .to_string(),
            other => format!("PDF translation error: {other}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
