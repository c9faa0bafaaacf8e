use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::config::OpenAISettings;
use crate::utils::error::{AppError, Result};
use crate::utils::http_client::HttpClient;
use crate::utils::similarity::collapse_whitespace;

/// Instruction sent to the completion API
pub const JOKE_PROMPT: &str = "Tell me a dad joke";

/// Source of fresh joke texts
#[async_trait]
pub trait JokeGenerator: Send + Sync {
    /// Produce one cleaned, non-empty joke text
    async fn generate(&self) -> Result<String>;
}

/// Chat completion API settings
#[derive(Debug, Clone)]
pub struct OpenAIJokeConfig {
    pub api_key: String,
    pub api_base_url: String,
    pub model: String,
    /// Budget for obtaining a usable completion, retries included
    pub timeout: Duration,
    pub empty_retry_delay: Duration,
}

impl Default for OpenAIJokeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            timeout: Duration::from_secs(30),
            empty_retry_delay: Duration::from_millis(500),
        }
    }
}

impl From<&OpenAISettings> for OpenAIJokeConfig {
    fn from(settings: &OpenAISettings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            api_base_url: settings.api_base_url.clone(),
            model: settings.model.clone(),
            timeout: Duration::from_secs(settings.timeout_seconds),
            empty_retry_delay: Duration::from_millis(settings.empty_retry_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// First choice with non-blank content, whitespace collapsed
    pub fn first_usable_text(&self) -> Option<String> {
        self.choices
            .iter()
            .filter_map(|choice| choice.message.as_ref()?.content.as_deref())
            .map(collapse_whitespace)
            .find(|text| !text.is_empty())
    }
}

/// Joke generator backed by an OpenAI-compatible chat completion endpoint
pub struct OpenAIJokeGenerator {
    config: OpenAIJokeConfig,
    http_client: HttpClient,
}

impl OpenAIJokeGenerator {
    pub fn new(config: OpenAIJokeConfig, http_client: HttpClient) -> Self {
        Self {
            config,
            http_client,
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base_url.trim_end_matches('/')
        )
    }

    fn build_request(&self) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: JOKE_PROMPT.to_string(),
            }],
        }
    }

    async fn request_completion(&self) -> Result<ChatCompletionResponse> {
        let response = self
            .http_client
            .post_json_with_bearer(
                &self.completions_url(),
                &self.config.api_key,
                &self.build_request(),
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(AppError::GenerationError(format!(
                "Completion API returned {}: {}",
                status, snippet
            )));
        }

        response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| AppError::GenerationError(format!("Invalid completion body: {}", e)))
    }

    /// Empty completions are retried; anything else that fails ends the loop
    async fn generate_until_usable(&self) -> Result<String> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let response = self.request_completion().await?;

            if let Some(text) = response.first_usable_text() {
                debug!(attempt, "😄 Completion produced a joke");
                return Ok(text);
            }

            warn!(
                attempt,
                choices = response.choices.len(),
                "⚠️  Completion had no usable choice, retrying"
            );
            sleep(self.config.empty_retry_delay).await;
        }
    }
}

#[async_trait]
impl JokeGenerator for OpenAIJokeGenerator {
    async fn generate(&self) -> Result<String> {
        timeout(self.config.timeout, self.generate_until_usable())
            .await
            .map_err(|_| {
                AppError::GenerationTimeout(format!(
                    "No usable completion within {}ms",
                    self.config.timeout.as_millis()
                ))
            })?
    }
}
