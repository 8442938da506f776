//! Discord embeds and delivery.
//!
//! Handlers build an [`Embed`] and hand it to a [`DeliverySink`]. The
//! production sink is [`DiscordWebhook`]; tests substitute their own.
//!
//! ```rust,ignore
//! use octohook::discord::{DiscordWebhook, DeliverySink, Embed};
//!
//! let sink = DiscordWebhook::new("https://discord.com/api/webhooks/...");
//! sink.deliver(Embed::new("Hello").with_color(0x5865F2)).await?;
//! ```

pub mod format;
pub mod webhook;

use crate::payload::Sender;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use format::{format_duration, format_file_changes, status_text, truncate};
pub use webhook::DiscordWebhook;

/// Errors raised while delivering a message to Discord.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// No webhook URL was configured
    #[error("Discord webhook URL not configured")]
    NotConfigured,

    /// The request never produced a response
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Discord answered with a non-success status
    #[error("Discord API error: {status} - {body}")]
    Status { status: u16, body: String },
}

/// Anything that can transmit an embed to its destination.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn deliver(&self, embed: Embed) -> Result<(), DeliveryError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

impl EmbedField {
    pub fn new(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmbedThumbnail {
    pub url: String,
}

/// A single Discord embed.
///
/// Unset optional fields are omitted from the JSON sent to Discord.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    /// ISO 8601 timestamp shown in the embed footer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedThumbnail>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

impl Embed {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        if !url.is_empty() {
            self.url = Some(url);
        }
        self
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_field(mut self, field: EmbedField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = EmbedField>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn with_footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(EmbedFooter {
            text: text.into(),
            icon_url: None,
        });
        self
    }

    /// Attribute the embed to the GitHub user that triggered the event and
    /// stamp it with the current time.
    pub fn with_sender(mut self, sender: &Sender) -> Self {
        self.author = Some(EmbedAuthor {
            name: sender.login.clone(),
            url: non_empty(&sender.html_url),
            icon_url: non_empty(&sender.avatar_url),
        });
        self.timestamp = Some(chrono::Utc::now().to_rfc3339());
        self
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Body of a Discord webhook request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebhookMessage {
    pub embeds: Vec<Embed>,
}

impl From<Embed> for WebhookMessage {
    fn from(embed: Embed) -> Self {
        Self {
            embeds: vec![embed],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> Sender {
        Sender {
            login: "alice".to_string(),
            avatar_url: "https://avatars.example/alice.png".to_string(),
            html_url: String::new(),
        }
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let embed = Embed::new("Title").with_color(0x57F287);
        let json = serde_json::to_value(WebhookMessage::from(embed)).unwrap();

        let embed = &json["embeds"][0];
        assert_eq!(embed["title"], "Title");
        assert_eq!(embed["color"], 0x57F287);
        assert!(embed.get("fields").is_none());
        assert!(embed.get("description").is_none());
        assert!(embed.get("author").is_none());
    }

    #[test]
    fn test_with_sender_sets_author_and_timestamp() {
        let embed = Embed::new("Title").with_sender(&sender());

        let author = embed.author.unwrap();
        assert_eq!(author.name, "alice");
        assert!(author.url.is_none());
        assert_eq!(
            author.icon_url.as_deref(),
            Some("https://avatars.example/alice.png")
        );

        let timestamp = embed.timestamp.unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&timestamp).is_ok());
    }

    #[test]
    fn test_fields_serialize_in_order() {
        let embed = Embed::new("Title")
            .with_field(EmbedField::new("A", "1", true))
            .with_fields([EmbedField::new("B", "2", false)]);

        let json = serde_json::to_value(&embed).unwrap();
        assert_eq!(json["fields"][0]["name"], "A");
        assert_eq!(json["fields"][1]["name"], "B");
        assert_eq!(json["fields"][1]["inline"], false);
    }

    #[test]
    fn test_empty_url_is_ignored() {
        let embed = Embed::new("Title").with_url("");
        assert!(embed.url.is_none());
    }
}
