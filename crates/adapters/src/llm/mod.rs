//! Generative-text provider adapters

pub mod gemini;
pub mod openai;
pub mod stub;

pub use gemini::GeminiTextGenerator;
pub use openai::OpenAiTextGenerator;
pub use stub::StubTextGenerator;

use serde::{Deserialize, Serialize};

/// System instruction shared by the HTTP providers
pub const SYSTEM_INSTRUCTION: &str =
    "You write short festive greetings for community chat servers. Reply with plain text only.";

/// Common LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model name/ID
    pub model: String,
    /// Temperature (0.0-2.0)
    pub temperature: f64,
    /// Maximum output tokens
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            temperature: 0.9,
            max_output_tokens: 400,
            timeout_secs: 30,
        }
    }
}

/// Strip a surrounding markdown code fence some models add to plain answers
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };

    // Drop a language identifier on the opening line
    match body.split_once('\n') {
        Some((first_line, remainder)) if !first_line.trim().contains(' ') => remainder.trim(),
        _ => body.trim(),
    }
}
