//! Google Gemini API adapter

use async_trait::async_trait;
use festival_notifier_domain::{GenerationError, TextGenerator};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{LlmConfig, SYSTEM_INSTRUCTION, strip_code_fence};

/// Gemini text generator
pub struct GeminiTextGenerator {
    client: Client,
    api_key: SecretString,
    base_url: String,
    config: LlmConfig,
}

impl GeminiTextGenerator {
    pub fn new(api_key: SecretString, config: LlmConfig) -> Self {
        Self::with_base_url(
            api_key,
            "https://generativelanguage.googleapis.com/v1beta".to_string(),
            config,
        )
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
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "generationConfig")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "systemInstruction")]
    system_instruction: Option<SystemInstruction>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "maxOutputTokens")]
    max_output_tokens: Option<u32>,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[async_trait]
impl TextGenerator for GeminiTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(self.config.temperature),
                max_output_tokens: Some(self.config.max_output_tokens),
            }),
            system_instruction: Some(SystemInstruction {
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION.to_string(),
                }],
            }),
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.config.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
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

        let api_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidFormat(e.to_string()))?;

        let text = api_response
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let text = strip_code_fence(&text);
        if text.is_empty() {
            return Err(GenerationError::InvalidFormat("Empty response".to_string()));
        }

        tracing::debug!(model = %self.config.model, chars = text.chars().count(), "Gemini generated text");
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn generator(server: &MockServer) -> GeminiTextGenerator {
        GeminiTextGenerator::with_base_url(
            SecretString::new("test-key".into()),
            server.uri(),
            LlmConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_generate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [
                    {"content": {"parts": [{"text": "Happy Diwali! "}, {"text": "🪔"}]}}
                ]
            })))
            .mount(&mock_server)
            .await;

        let text = generator(&mock_server).generate("prompt").await.unwrap();

        assert_eq!(text, "Happy Diwali! 🪔");
    }

    #[tokio::test]
    async fn test_no_candidates_is_invalid_format() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .mount(&mock_server)
            .await;

        let result = generator(&mock_server).generate("prompt").await;

        assert!(matches!(result, Err(GenerationError::InvalidFormat(_))));
    }

    #[tokio::test]
    async fn test_generate_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = generator(&mock_server).generate("prompt").await;

        assert!(matches!(result, Err(GenerationError::RateLimited)));
    }

    #[tokio::test]
    async fn test_generate_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = generator(&mock_server).generate("prompt").await;

        assert!(matches!(result, Err(GenerationError::Api(msg)) if msg.contains("overloaded")));
    }
}
