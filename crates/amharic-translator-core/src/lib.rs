//! Amharic Translator Core Library
//!
//! Translates English PDF documents into Amharic while keeping the layout:
//! - Positioned text extraction with lopdf
//! - One translation per distinct text via OpenAI-compatible APIs
//! - Re-rendering every run in place with an embedded Ethiopic font
//! - Plain-text translation with chunking

pub mod config;
pub mod error;
pub mod mapper;
pub mod pdf;
pub mod text;
pub mod translator;
pub mod util;

pub use config::{AppConfig, LayoutConfig, PipelineConfig, TranslatorConfig};
pub use error::{Error, Result};
pub use mapper::{ItemProgress, MapOptions, TranslationMap};
pub use pdf::{Page, PageGeometry, RenderOutput, RenderReport, TextExtractor, TextRun};
pub use translator::{OpenAiTranslator, Translator, TranslatorInfo, create_translator};
pub use util::is_pdf_path;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Fraction reported once when a translation fails.
pub const PROGRESS_FAILED: f32 = -1.0;

/// One progress notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    /// In `[0, 1]`, or [`PROGRESS_FAILED`]
    pub fraction: f32,
    pub message: String,
}

impl ProgressUpdate {
    pub fn is_failure(&self) -> bool {
        self.fraction < 0.0
    }
}

/// Receives progress updates while a document is translated.
pub type ProgressCallback = dyn Fn(&ProgressUpdate) + Send + Sync;

/// High-level PDF translator that combines all components
pub struct PdfTranslator {
    translator: Arc<dyn Translator>,
    extractor: TextExtractor,
    config: AppConfig,
}

impl PdfTranslator {
    /// Create a new PDF translator with the given configuration
    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let translator = create_translator(&config.translator)?;
        Ok(Self::with_translator(translator, config))
    }

    /// Create with a custom translator
    pub fn with_translator(translator: Arc<dyn Translator>, config: AppConfig) -> Self {
        Self {
            translator,
            extractor: TextExtractor::from_layout(&config.layout),
            config,
        }
    }

    /// Translate a PDF file and write the result next to it.
    ///
    /// Returns the path of the written file. On failure `on_progress` gets a
    /// single [`PROGRESS_FAILED`] update with a plain-language message and
    /// nothing is written.
    pub async fn translate_pdf(
        &self,
        input: &Path,
        on_progress: Option<&(dyn Fn(&ProgressUpdate) + Send + Sync + '_)>,
    ) -> Result<PathBuf> {
        let progress = Progress(on_progress);
        let result = self.translate_file(input, &progress).await;

        if let Err(e) = &result {
            error!("Translation of {} failed: {}", input.display(), e);
            progress.fail(e);
        }
        result
    }

    /// Translate PDF bytes without touching the filesystem.
    pub async fn translate_bytes(
        &self,
        bytes: &[u8],
        on_progress: Option<&(dyn Fn(&ProgressUpdate) + Send + Sync + '_)>,
    ) -> Result<Vec<u8>> {
        let progress = Progress(on_progress);
        let result = self.pipeline(bytes, &progress).await;

        if let Err(e) = &result {
            error!("Translation failed: {}", e);
            progress.fail(e);
        }
        result
    }

    /// Translate free text, chunking long input.
    pub async fn translate_text(&self, text: &str) -> Result<String> {
        let max_len = self.config.pipeline.max_chunk_len;
        translator::translate_text(self.translator.as_ref(), text, max_len).await
    }

    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn translator_info(&self) -> TranslatorInfo {
        self.translator.info()
    }

    async fn translate_file(&self, input: &Path, progress: &Progress<'_>) -> Result<PathBuf> {
        info!("Translating {}", input.display());
        let bytes = tokio::fs::read(input)
            .await
            .map_err(|e| Error::PdfOpen(format!("{}: {e}", input.display())))?;

        let translated = self.pipeline(&bytes, progress).await?;

        progress.report(0.9, "Saving translated PDF...");
        let output = output_path_for(input, &self.config.pipeline);
        if let Some(dir) = &self.config.pipeline.output_dir {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| Error::OutputWrite {
                    path: dir.clone(),
                    source,
                })?;
        }
        tokio::fs::write(&output, &translated)
            .await
            .map_err(|source| Error::OutputWrite {
                path: output.clone(),
                source,
            })?;

        progress.report(1.0, "Translation complete!");
        info!("Wrote {} ({} bytes)", output.display(), translated.len());
        Ok(output)
    }

    /// Extract, translate and render. Progress runs from 0.1 to 0.8.
    async fn pipeline(&self, bytes: &[u8], progress: &Progress<'_>) -> Result<Vec<u8>> {
        progress.report(0.1, "Extracting text from PDF...");
        let pages = self.extractor.extract(bytes);
        if pages.is_empty() {
            return Err(Error::ExtractionEmpty);
        }
        info!(
            "Extracted {} runs from {} pages",
            pdf::total_runs(&pages),
            pages.len()
        );

        progress.report(0.2, "Translating text...");
        let options = MapOptions::from_pipeline(&self.config.pipeline);
        let map = TranslationMap::build(&pages, self.translator.as_ref(), &options, |item| {
            progress.report(
                lerp(0.2, 0.8, item.ratio()),
                format!("Translating page {}...", item.page_number),
            );
        })
        .await?;

        progress.report(0.8, "Creating translated PDF...");
        let output = pdf::render_document(&pages, &map, &self.config.layout);
        if output.is_empty() {
            return Err(Error::RenderFailed(format!(
                "{} of {} pages could not be rendered",
                output.report.pages_skipped,
                pages.len()
            )));
        }

        Ok(output.bytes)
    }
}

/// Where the translation of `input` is written: `<dir>/<prefix><file name>`,
/// with `dir` defaulting to the input's own directory.
pub fn output_path_for(input: &Path, pipeline: &PipelineConfig) -> PathBuf {
    let file_name = input
        .file_name()
        .map_or_else(|| "document.pdf".into(), |name| name.to_string_lossy());
    let dir = pipeline
        .output_dir
        .clone()
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();

    dir.join(format!("{}{}", pipeline.output_prefix, file_name))
}

/// Exact at both ends, so the last mapping step lands on `b`.
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a.mul_add(1.0 - t, b * t)
}

struct Progress<'a>(Option<&'a (dyn Fn(&ProgressUpdate) + Send + Sync + 'a)>);

impl Progress<'_> {
    fn report(&self, fraction: f32, message: impl Into<String>) {
        let update = ProgressUpdate {
            fraction,
            message: message.into(),
        };
        debug!("[{:.0}%] {}", fraction * 100.0, update.message);
        if let Some(callback) = self.0 {
            callback(&update);
        }
    }

    fn fail(&self, error: &Error) {
        if let Some(callback) = self.0 {
            callback(&ProgressUpdate {
                fraction: PROGRESS_FAILED,
                message: error.user_message(),
            });
        }
    }
}
