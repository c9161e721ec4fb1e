//! Discord REST adapter for listing guilds and posting festival embeds

use async_trait::async_trait;
use festival_notifier_domain::{
    Channel, ChannelKind, DeliveryReceipt, Guild, Messenger, MessengerError, NotificationPayload,
};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Page size for the guild listing endpoint
const GUILD_PAGE_LIMIT: usize = 200;

/// Discord REST v10 messenger
pub struct DiscordMessenger {
    client: Client,
    token: SecretString,
    base_url: String,
}

impl DiscordMessenger {
    pub fn new(token: SecretString) -> Self {
        Self::with_base_url(token, "https://discord.com/api/v10".to_string())
    }

    pub fn with_base_url(token: SecretString, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            token,
            base_url,
        }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.header(
            "Authorization",
            format!("Bot {}", self.token.expose_secret()),
        )
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, MessengerError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED => MessengerError::Auth("Invalid bot token".to_string()),
            StatusCode::FORBIDDEN => MessengerError::Forbidden(body),
            StatusCode::NOT_FOUND => MessengerError::NotFound(body),
            StatusCode::TOO_MANY_REQUESTS => MessengerError::RateLimited,
            _ => MessengerError::Api(format!("API returned {}: {}", status, body)),
        })
    }
}

#[derive(Deserialize)]
struct GuildResponse {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct ChannelResponse {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: u8,
}

/// Map a Discord channel type code to the domain kind
fn channel_kind(code: u8) -> ChannelKind {
    match code {
        0 => ChannelKind::Text,
        2 => ChannelKind::Voice,
        4 => ChannelKind::Category,
        5 => ChannelKind::Announcement,
        _ => ChannelKind::Other,
    }
}

#[derive(Serialize)]
struct CreateMessageRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    embeds: Vec<Embed>,
    allowed_mentions: AllowedMentions,
}

#[derive(Serialize)]
struct Embed {
    title: String,
    description: String,
    color: u32,
    footer: EmbedFooter,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<EmbedImage>,
}

#[derive(Serialize)]
struct EmbedFooter {
    text: String,
}

#[derive(Serialize)]
struct EmbedImage {
    url: String,
}

#[derive(Serialize)]
struct AllowedMentions {
    parse: Vec<&'static str>,
}

#[derive(Deserialize)]
struct MessageResponse {
    id: String,
}

impl CreateMessageRequest {
    fn new(mention: Option<&str>, payload: &NotificationPayload) -> Self {
        Self {
            content: mention.map(String::from),
            embeds: vec![Embed {
                title: payload.title.clone(),
                description: payload.description.clone(),
                color: payload.color,
                footer: EmbedFooter {
                    text: payload.footer.clone(),
                },
                image: payload
                    .image_url
                    .as_ref()
                    .map(|url| EmbedImage { url: url.clone() }),
            }],
            allowed_mentions: AllowedMentions {
                // @everyone and @here are both governed by the "everyone" parse type
                parse: if mention.is_some() {
                    vec!["everyone"]
                } else {
                    vec![]
                },
            },
        }
    }
}

#[async_trait]
impl Messenger for DiscordMessenger {
    async fn guilds(&self) -> Result<Vec<Guild>, MessengerError> {
        let url = format!("{}/users/@me/guilds", self.base_url);
        let mut guilds = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut query = vec![("limit", GUILD_PAGE_LIMIT.to_string())];
            if let Some(after) = &after {
                query.push(("after", after.clone()));
            }

            let response = self
                .authorized(self.client.get(&url).query(&query))
                .send()
                .await
                .map_err(|e| MessengerError::Api(e.to_string()))?;
            let page: Vec<GuildResponse> = Self::check(response)
                .await?
                .json()
                .await
                .map_err(|e| MessengerError::Api(e.to_string()))?;

            let full_page = page.len() == GUILD_PAGE_LIMIT;
            after = page.last().map(|g| g.id.clone());
            guilds.extend(page.into_iter().map(|g| Guild {
                id: g.id,
                name: g.name,
            }));

            if !full_page {
                break;
            }
        }

        tracing::debug!(count = guilds.len(), "Listed guilds");
        Ok(guilds)
    }

    async fn channels(&self, guild_id: &str) -> Result<Vec<Channel>, MessengerError> {
        let url = format!("{}/guilds/{}/channels", self.base_url, guild_id);

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(|e| MessengerError::Api(e.to_string()))?;
        let channels: Vec<ChannelResponse> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| MessengerError::Api(e.to_string()))?;

        Ok(channels
            .into_iter()
            .map(|c| Channel {
                id: c.id,
                name: c.name,
                kind: channel_kind(c.kind),
            })
            .collect())
    }

    async fn send(
        &self,
        channel_id: &str,
        mention: Option<&str>,
        payload: &NotificationPayload,
    ) -> Result<DeliveryReceipt, MessengerError> {
        let url = format!("{}/channels/{}/messages", self.base_url, channel_id);
        let request = CreateMessageRequest::new(mention, payload);

        let response = self
            .authorized(self.client.post(&url))
            .json(&request)
            .send()
            .await
            .map_err(|e| MessengerError::Api(e.to_string()))?;
        let message: MessageResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| MessengerError::Api(e.to_string()))?;

        Ok(DeliveryReceipt {
            message_id: message.id,
        })
    }
}
