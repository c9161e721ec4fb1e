//! Stub text generator for testing and offline mode

use async_trait::async_trait;
use festival_notifier_domain::{GenerationError, TextGenerator};

/// Stub generator that returns configurable responses
pub struct StubTextGenerator {
    response: Option<String>,
    error: Option<GenerationError>,
}

impl StubTextGenerator {
    /// Create a stub that writes a generic greeting long enough to be accepted
    pub fn festive() -> Self {
        Self {
            response: None,
            error: None,
        }
    }

    /// Create a stub that returns a specific text
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            error: None,
        }
    }

    /// Create a stub that always returns an error
    pub fn with_error(error: GenerationError) -> Self {
        Self {
            response: None,
            error: Some(error),
        }
    }
}

impl Default for StubTextGenerator {
    fn default() -> Self {
        Self::festive()
    }
}

#[async_trait]
impl TextGenerator for StubTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if let Some(ref error) = self.error {
            return Err(match error {
                GenerationError::Api(msg) => GenerationError::Api(msg.clone()),
                GenerationError::InvalidFormat(msg) => GenerationError::InvalidFormat(msg.clone()),
                GenerationError::RateLimited => GenerationError::RateLimited,
                GenerationError::Timeout => GenerationError::Timeout,
                GenerationError::Config(msg) => GenerationError::Config(msg.clone()),
            });
        }

        if let Some(ref response) = self.response {
            return Ok(response.clone());
        }

        // Festive mode: echo the festival named on the prompt's first line
        let festival = prompt
            .lines()
            .find_map(|line| line.strip_prefix("Festival: "))
            .unwrap_or("this festival");

        Ok(format!(
            "✨ Warm wishes to everyone celebrating {festival} today! May this occasion fill \
             your homes with joy, your tables with good food and your hearts with peace. \
             Take a moment to reach out to friends and neighbours, share a smile and \
             celebrate the spirit of togetherness that makes our community special. 🎉"
        ))
    }
}
