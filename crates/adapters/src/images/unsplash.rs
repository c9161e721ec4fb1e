//! Unsplash photo search adapter

use async_trait::async_trait;
use festival_notifier_domain::{ImageCandidate, ImageSearch, ImageSearchError};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::status_error;

/// Unsplash search client
pub struct UnsplashImageSearch {
    client: Client,
    access_key: SecretString,
    base_url: String,
}

impl UnsplashImageSearch {
    pub fn new(access_key: SecretString, timeout_secs: u64) -> Self {
        Self::with_base_url(
            access_key,
            "https://api.unsplash.com".to_string(),
            timeout_secs,
        )
    }

    pub fn with_base_url(access_key: SecretString, base_url: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            access_key,
            base_url,
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Deserialize)]
struct Photo {
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    urls: PhotoUrls,
}

#[derive(Deserialize)]
struct PhotoUrls {
    regular: String,
}

#[async_trait]
impl ImageSearch for UnsplashImageSearch {
    async fn search(
        &self,
        query: &str,
        per_page: u32,
    ) -> Result<Vec<ImageCandidate>, ImageSearchError> {
        let url = format!("{}/search/photos", self.base_url);
        let per_page = per_page.to_string();

        let response = self
            .client
            .get(&url)
            .header(
                "Authorization",
                format!("Client-ID {}", self.access_key.expose_secret()),
            )
            .header("Accept-Version", "v1")
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
            .results
            .into_iter()
            .map(|photo| ImageCandidate {
                width: photo.width,
                height: photo.height,
                url: photo.urls.regular,
            })
            .collect())
    }
}
