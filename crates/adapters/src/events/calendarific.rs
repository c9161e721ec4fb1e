//! Calendarific holidays API adapter

use async_trait::async_trait;
use festival_notifier_domain::{EventSource, EventSourceError, FestivalEvent, iso_date};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use time::Date;

/// Fixed request timeout for the holidays endpoint
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Calendarific event source
pub struct CalendarificEventSource {
    client: Client,
    api_key: SecretString,
    base_url: String,
}

impl CalendarificEventSource {
    pub fn new(api_key: SecretString) -> Self {
        Self::with_base_url(api_key, "https://calendarific.com/api/v2".to_string())
    }

    pub fn with_base_url(api_key: SecretString, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
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
struct HolidaysEnvelope {
    /// An object with `holidays`, or an empty array on days without events
    #[serde(default)]
    response: serde_json::Value,
}

#[derive(Deserialize)]
struct Holiday {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "type")]
    types: Vec<String>,
    #[serde(default)]
    primary_type: String,
}

impl From<Holiday> for FestivalEvent {
    fn from(holiday: Holiday) -> Self {
        FestivalEvent {
            name: holiday.name,
            description: holiday.description,
            type_tags: holiday.types,
            primary_type: holiday.primary_type,
        }
    }
}

#[async_trait]
impl EventSource for CalendarificEventSource {
    async fn events_on(
        &self,
        country: &str,
        date: Date,
    ) -> Result<Vec<FestivalEvent>, EventSourceError> {
        let url = format!("{}/holidays", self.base_url);
        let year = date.year().to_string();
        let month = u8::from(date.month()).to_string();
        let day = date.day().to_string();

        tracing::debug!(country = %country, date = %iso_date(date), "Fetching holidays");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.expose_secret()),
                ("country", country),
                ("year", year.as_str()),
                ("month", month.as_str()),
                ("day", day.as_str()),
            ])
            .send()
            .await
            .map_err(|e| EventSourceError::Network(e.to_string()))?;

        if response.status() == 401 || response.status() == 403 {
            return Err(EventSourceError::Auth("Invalid API key".to_string()));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EventSourceError::Api(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let envelope: HolidaysEnvelope = response
            .json()
            .await
            .map_err(|e| EventSourceError::InvalidResponse(e.to_string()))?;

        let holidays = match envelope.response.get("holidays") {
            Some(list) => Vec::<Holiday>::deserialize(list)
                .map_err(|e| EventSourceError::InvalidResponse(e.to_string()))?,
            None => vec![],
        };

        Ok(holidays
            .into_iter()
            .filter(|h| !h.name.trim().is_empty())
            .map(FestivalEvent::from)
            .collect())
    }
}
