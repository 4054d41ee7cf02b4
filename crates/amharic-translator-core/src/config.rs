use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Scale-up applied to every source font size when drawing Ethiopic text.
pub const DEFAULT_FONT_SCALE: f32 = 1.2;

/// Minimum vertical gap between two consecutively placed runs, in millimetres.
pub const DEFAULT_MIN_LINE_SPACING_MM: f32 = 2.0;

/// Font size assumed when a content stream never sets one.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Font name recorded for runs whose font resource has no `BaseFont`.
pub const DEFAULT_FONT_NAME: &str = "Helvetica";

/// Maximum characters per chunk on the plain-text path.
pub const DEFAULT_MAX_CHUNK_LEN: usize = 512;

/// Prefix prepended to the input file name to form the output file name.
pub const DEFAULT_OUTPUT_PREFIX: &str = "translated_";

/// PDF user-space units per millimetre (72 points per inch).
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Translator backend configuration for OpenAI-compatible APIs.
///
/// Supports llama.cpp, Ollama, OpenAI, and any other OpenAI-compatible API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// HTTP request timeout for a single attempt
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Human-readable source language used in the prompt
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    /// Human-readable target language used in the prompt
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
}

impl TranslatorConfig {
    /// Create a new translator config
    pub fn new(
        api_base: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            api_key,
            model: model.into(),
            ..Self::default()
        }
    }
}

fn default_api_base() -> String {
    "http://localhost:8080/v1".to_string()
}

fn default_model() -> String {
    "default_model".to_string()
}

fn default_source_lang() -> String {
    "English".to_string()
}

fn default_target_lang() -> String {
    "Amharic".to_string()
}

const fn default_retry_count() -> u32 {
    3
}

const fn default_retry_delay_ms() -> u64 {
    1000
}

const fn default_timeout_secs() -> u64 {
    60
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            model: default_model(),
            retry_count: default_retry_count(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_timeout_secs(),
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
        }
    }
}

/// Layout heuristics and font lookup for the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Multiplier from source font size to drawn font size
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,

    /// Minimum vertical gap between consecutive runs (mm)
    #[serde(default = "default_min_line_spacing_mm")]
    pub min_line_spacing_mm: f32,

    /// Font size used when the source does not declare one
    #[serde(default = "default_font_size")]
    pub default_font_size: f32,

    /// Name recorded for runs with an anonymous font
    #[serde(default = "default_font_name")]
    pub fallback_font_name: String,

    /// Target-script TrueType candidates, tried in order
    #[serde(default = "default_font_paths")]
    pub font_paths: Vec<PathBuf>,
}

impl LayoutConfig {
    /// Minimum line spacing converted to PDF points.
    pub fn min_line_spacing_pt(&self) -> f32 {
        self.min_line_spacing_mm * POINTS_PER_MM
    }
}

const fn default_font_scale() -> f32 {
    DEFAULT_FONT_SCALE
}

const fn default_min_line_spacing_mm() -> f32 {
    DEFAULT_MIN_LINE_SPACING_MM
}

const fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

fn default_font_name() -> String {
    DEFAULT_FONT_NAME.to_string()
}

fn default_font_paths() -> Vec<PathBuf> {
    [
        "fonts/nyala.ttf",
        "static/fonts/nyala.ttf",
        "/usr/share/fonts/truetype/noto/NotoSansEthiopic-Regular.ttf",
        "/usr/share/fonts/noto/NotoSansEthiopic-Regular.ttf",
        "/usr/share/fonts/google-noto/NotoSansEthiopic-Regular.ttf",
        "/Library/Fonts/NotoSansEthiopic-Regular.ttf",
        "C:\\Windows\\Fonts\\nyala.ttf",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font_scale: DEFAULT_FONT_SCALE,
            min_line_spacing_mm: DEFAULT_MIN_LINE_SPACING_MM,
            default_font_size: DEFAULT_FONT_SIZE,
            fallback_font_name: default_font_name(),
            font_paths: default_font_paths(),
        }
    }
}

/// Pipeline sequencing and output placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum characters per chunk on the plain-text path
    #[serde(default = "default_max_chunk_len")]
    pub max_chunk_len: usize,

    /// File name prefix for translated PDFs
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,

    /// Directory for translated PDFs (defaults to the input's directory)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Maximum translation calls in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Cancel a single translation call after this many seconds
    #[serde(default)]
    pub call_timeout_secs: Option<u64>,
}

const fn default_max_chunk_len() -> usize {
    DEFAULT_MAX_CHUNK_LEN
}

fn default_output_prefix() -> String {
    DEFAULT_OUTPUT_PREFIX.to_string()
}

const fn default_concurrency() -> usize {
    1
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_chunk_len: DEFAULT_MAX_CHUNK_LEN,
            output_prefix: default_output_prefix(),
            output_dir: None,
            concurrency: default_concurrency(),
            call_timeout_secs: None,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Translator backend configuration
    #[serde(default)]
    pub translator: TranslatorConfig,

    /// Renderer layout configuration
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Pipeline configuration
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::ConfigLoad(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations (~/.config/amharic-translator/config.toml, ./config.toml)
    pub fn load() -> Self {
        // Try user config
        if let Some(config_dir) = crate::util::config_dir() {
            let user_config = config_dir.join("amharic-translator").join("config.toml");
            if user_config.exists() {
                match Self::from_file(&user_config) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {}", user_config.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // Try local config
        let local_config = PathBuf::from("config.toml");
        if local_config.exists() {
            match Self::from_file(&local_config) {
                Ok(config) => {
                    tracing::debug!("Loaded config from ./config.toml");
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load ./config.toml: {}", e);
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Self::default()
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |field: &str, reason: &str| {
            Err(Error::ConfigInvalid {
                field: field.to_string(),
                reason: reason.to_string(),
            })
        };

        if !(self.layout.font_scale.is_finite() && self.layout.font_scale > 0.0) {
            return invalid("layout.font_scale", "must be a positive number");
        }
        if !(self.layout.min_line_spacing_mm.is_finite() && self.layout.min_line_spacing_mm >= 0.0)
        {
            return invalid("layout.min_line_spacing_mm", "must not be negative");
        }
        if !(self.layout.default_font_size.is_finite() && self.layout.default_font_size > 0.0) {
            return invalid("layout.default_font_size", "must be a positive number");
        }
        if self.pipeline.max_chunk_len == 0 {
            return invalid("pipeline.max_chunk_len", "must be greater than zero");
        }
        if self.pipeline.concurrency == 0 {
            return invalid("pipeline.concurrency", "must be at least 1");
        }
        if self.pipeline.call_timeout_secs == Some(0) {
            return invalid("pipeline.call_timeout_secs", "must be greater than zero");
        }
        if self.pipeline.output_prefix.is_empty() && self.pipeline.output_dir.is_none() {
            return invalid(
                "pipeline.output_prefix",
                "must not be empty unless pipeline.output_dir is set",
            );
        }
        Ok(())
    }
}
