use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn, error};

use crate::config::TranslatorConfig;
use crate::error::{Error, Result};
use super::traits::{Translator, TranslatorInfo};

/// OpenAI-compatible API translator
/// Works with: llama.cpp server, Ollama, OpenAI, etc.
pub struct OpenAiTranslator {
    client: Client,
    /// Base URL for the API (e.g., "http://localhost:8080/v1")
    pub api_base: String,
    /// Optional API key for authentication
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// Number of attempts per translation
    pub retry_count: u32,
    /// Delay between retries in milliseconds
    pub retry_delay_ms: u64,
    source_lang: String,
    target_lang: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OpenAiTranslator {
    /// Build a translator from configuration.
    pub fn from_config(config: &TranslatorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| Error::TranslationRequest(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            retry_count: config.retry_count.max(1),
            retry_delay_ms: config.retry_delay_ms,
            source_lang: config.source_lang.clone(),
            target_lang: config.target_lang.clone(),
        })
    }

    /// Create translation prompt
    fn create_prompt(&self, text: &str) -> String {
        format!(
            "Translate the following text from {} into {}. \
             Output only the translation, no explanations.\n\nText: \"{}\"",
            self.source_lang, self.target_lang, text
        )
    }

    /// Make API request with retry logic
    async fn request_with_retry(&self, text: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: self.create_prompt(text),
            }],
            temperature: Some(0.3),
        };

        let mut last_error = None;

        for attempt in 0..self.retry_count {
            debug!(
                "Translation request attempt {}/{} to {}",
                attempt + 1,
                self.retry_count,
                url
            );

            let mut req = self.client.post(&url).json(&request);

            if let Some(ref key) = self.api_key {
                req = req.header("Authorization", format!("Bearer {key}"));
            }

            match req.send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        match response.json::<ChatResponse>().await {
                            Ok(chat_response) => return parse_choice(chat_response),
                            Err(e) => {
                                warn!("Failed to parse response: {}", e);
                                last_error = Some(Error::TranslationInvalidResponse(e.to_string()));
                            }
                        }
                    } else if response.status().as_u16() == 429 {
                        let retry_after = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse().ok());

                        warn!("Rate limited, retry after {:?}s", retry_after);
                        last_error = Some(Error::TranslationRateLimited { retry_after });

                        if attempt + 1 < self.retry_count {
                            let wait_time = retry_after.unwrap_or(5) * 1000;
                            tokio::time::sleep(Duration::from_millis(wait_time)).await;
                        }
                        continue;
                    } else {
                        let status = response.status();
                        let body = response.text().await.unwrap_or_default();
                        warn!("API error: {} - {}", status, body);
                        last_error = Some(Error::TranslationRequest(format!(
                            "HTTP {status}: {body}"
                        )));
                    }
                }
                Err(e) => {
                    warn!("Request failed: {}", e);
                    if e.is_timeout() {
                        last_error = Some(Error::TranslationTimeout);
                    } else {
                        last_error = Some(Error::TranslationRequest(e.to_string()));
                    }
                }
            }

            if attempt + 1 < self.retry_count {
                tokio::time::sleep(Duration::from_millis(self.retry_delay_ms)).await;
            }
        }

        error!("Translation failed after {} attempts", self.retry_count);
        Err(last_error.unwrap_or(Error::TranslationMaxRetriesExceeded))
    }
}

/// Pull the translated text out of a chat completion.
fn parse_choice(response: ChatResponse) -> Result<String> {
    let choice = response.choices.into_iter().next().ok_or_else(|| {
        Error::TranslationInvalidResponse("No choices in response".to_string())
    })?;

    // Models sometimes echo the quoting used in the prompt
    let translated = choice.message.content.trim();
    Ok(translated
        .trim_start_matches('"')
        .trim_end_matches('"')
        .to_string())
}

#[async_trait]
impl Translator for OpenAiTranslator {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo {
            name: "OpenAI Compatible",
        }
    }

    async fn translate(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        self.request_with_retry(text).await
    }
}
