//! Pexels photo search adapter

use async_trait::async_trait;
use festival_notifier_domain::{ImageCandidate, ImageSearch, ImageSearchError};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::status_error;

/// Pexels search client
pub struct PexelsImageSearch {
    client: Client,
    api_key: SecretString,
    base_url: String,
}

impl PexelsImageSearch {
    pub fn new(api_key: SecretString, timeout_secs: u64) -> Self {
        Self::with_base_url(api_key, "https://api.pexels.com/v1".to_string(), timeout_secs)
    }

    pub fn with_base_url(api_key: SecretString, base_url: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url,
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Deserialize)]
struct Photo {
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    src: PhotoSources,
}

#[derive(Deserialize, Default)]
struct PhotoSources {
    landscape: Option<String>,
    large2x: Option<String>,
}

#[async_trait]
impl ImageSearch for PexelsImageSearch {
    async fn search(
        &self,
        query: &str,
        per_page: u32,
    ) -> Result<Vec<ImageCandidate>, ImageSearchError> {
        let url = format!("{}/search", self.base_url);
        let per_page = per_page.to_string();

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.api_key.expose_secret())
            .query(&[("query", query), ("per_page", per_page.as_str())])
            .send()
            .await
            .map_err(|e| ImageSearchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ImageSearchError::Api(e.to_string()))?;

        Ok(body
            .photos
            .into_iter()
            .filter_map(|photo| {
                let url = photo.src.landscape.or(photo.src.large2x)?;
                Some(ImageCandidate {
                    width: photo.width,
                    height: photo.height,
                    url,
                })
            })
            .collect())
    }
}
