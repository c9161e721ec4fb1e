//! Photo search adapters

mod pexels;
mod unsplash;

pub use pexels::PexelsImageSearch;
pub use unsplash::UnsplashImageSearch;

use async_trait::async_trait;
use festival_notifier_domain::{ImageCandidate, ImageSearch, ImageSearchError};
use reqwest::StatusCode;

/// Image search used when no provider is configured; never finds anything
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledImageSearch;

#[async_trait]
impl ImageSearch for DisabledImageSearch {
    async fn search(
        &self,
        _query: &str,
        _per_page: u32,
    ) -> Result<Vec<ImageCandidate>, ImageSearchError> {
        Ok(vec![])
    }
}

/// Map a non-success status to the port error
async fn status_error(response: reqwest::Response) -> ImageSearchError {
    let status = response.status();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ImageSearchError::Auth(format!("API returned {}", status))
        }
        StatusCode::TOO_MANY_REQUESTS => ImageSearchError::RateLimited,
        _ => {
            let body = response.text().await.unwrap_or_default();
            ImageSearchError::Api(format!("API returned {}: {}", status, body))
        }
    }
}
