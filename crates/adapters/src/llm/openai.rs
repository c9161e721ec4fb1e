//! OpenAI Responses API adapter

use async_trait::async_trait;
use festival_notifier_domain::{GenerationError, TextGenerator};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{LlmConfig, SYSTEM_INSTRUCTION, strip_code_fence};

/// OpenAI text generator using the Responses API
pub struct OpenAiTextGenerator {
    client: Client,
    api_key: SecretString,
    base_url: String,
    config: LlmConfig,
}

impl OpenAiTextGenerator {
    pub fn new(api_key: SecretString, config: LlmConfig) -> Self {
        Self::with_base_url(api_key, "https://api.openai.com/v1".to_string(), config)
    }

    pub fn with_base_url(api_key: SecretString, base_url: String, config: LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url,
            config,
        }
    }
}

#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    output: Vec<OutputItem>,
}

#[derive(Deserialize)]
struct OutputItem {
    r#type: String,
    #[serde(default)]
    content: Vec<ContentItem>,
}

#[derive(Deserialize)]
struct ContentItem {
    r#type: String,
    #[serde(default)]
    text: String,
}

#[async_trait]
impl TextGenerator for OpenAiTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = OpenAiRequest {
            model: self.config.model.clone(),
            input: prompt.to_string(),
            instructions: Some(SYSTEM_INSTRUCTION.to_string()),
            temperature: Some(self.config.temperature),
            max_output_tokens: Some(self.config.max_output_tokens),
        };

        let url = format!("{}/responses", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout
                } else {
                    GenerationError::Api(e.to_string())
                }
            })?;

        if response.status() == 429 {
            return Err(GenerationError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let api_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidFormat(e.to_string()))?;

        let text = api_response
            .output
            .into_iter()
            .filter(|item| item.r#type == "message")
            .flat_map(|item| item.content)
            .filter(|c| c.r#type == "output_text")
            .map(|c| c.text)
            .collect::<Vec<_>>()
            .join("");

        let text = strip_code_fence(&text);
        if text.is_empty() {
            return Err(GenerationError::InvalidFormat("Empty response".to_string()));
        }

        tracing::debug!(model = %self.config.model, chars = text.chars().count(), "OpenAI generated text");
        Ok(text.to_string())
    }
}
