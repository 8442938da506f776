//! Discord webhook delivery.
//!
//! [`DiscordWebhook`] posts a [`WebhookMessage`] to a Discord webhook URL.
//!
//! # Example
//!
//! ```rust,ignore
//! use octohook::discord::DiscordWebhook;
//! use std::time::Duration;
//!
//! let sink = DiscordWebhook::new("https://discord.com/api/webhooks/...")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_retries(2);
//! ```

use super::{DeliveryError, DeliverySink, Embed, WebhookMessage};
use crate::config::DiscordConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default timeout for webhook requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of retries on 5xx errors
const DEFAULT_RETRIES: u32 = 1;

/// A [`DeliverySink`] that posts embeds to a Discord webhook.
///
/// - Configurable timeout
/// - Retry on 5xx and transport errors
/// - No retry on 4xx; Discord's error body is surfaced in the error
#[derive(Debug, Clone)]
pub struct DiscordWebhook {
    /// Target webhook URL; empty means unconfigured
    url: String,

    /// HTTP client (reused for connection pooling)
    client: Client,

    timeout: Duration,

    /// Number of retries on 5xx errors
    retries: u32,
}

impl DiscordWebhook {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
        }
    }

    /// Build a webhook from the `[discord]` config section.
    pub fn from_config(config: &DiscordConfig) -> Self {
        Self::new(&config.webhook_url)
            .with_timeout(Duration::from_millis(config.timeout_ms))
            .with_retries(config.retries)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set number of retries on 5xx errors
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.url.contains("${")
    }

    /// Send the message, retrying server errors.
    async fn send_request(&self, message: &WebhookMessage) -> Result<(), DeliveryError> {
        let mut last_error = None;
        let mut attempts = 0;

        while attempts <= self.retries {
            if attempts > 0 {
                debug!(
                    attempt = attempts,
                    max_retries = self.retries,
                    "Retrying Discord webhook request"
                );
            }

            let result = self
                .client
                .post(&self.url)
                .timeout(self.timeout)
                .json(message)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(());
                    }

                    let body = response.text().await.unwrap_or_default();
                    let error = DeliveryError::Status {
                        status: status.as_u16(),
                        body,
                    };

                    // Client error - don't retry
                    if !status.is_server_error() {
                        warn!(status = %status, "Discord rejected webhook message");
                        return Err(error);
                    }

                    warn!(
                        status = %status,
                        attempt = attempts,
                        "Discord returned server error, will retry"
                    );
                    last_error = Some(error);
                }
                Err(e) => {
                    warn!(error = %e, attempt = attempts, "Discord webhook request failed");
                    last_error = Some(DeliveryError::Http(e));
                }
            }

            attempts += 1;
        }

        Err(last_error.unwrap_or(DeliveryError::NotConfigured))
    }
}

#[async_trait]
impl DeliverySink for DiscordWebhook {
    async fn deliver(&self, embed: Embed) -> Result<(), DeliveryError> {
        if !self.is_configured() {
            return Err(DeliveryError::NotConfigured);
        }

        let message = WebhookMessage::from(embed);
        debug!(title = ?message.embeds[0].title, "Sending Discord message");

        self.send_request(&message).await?;
        info!("Successfully sent Discord message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_webhook_builder() {
        let sink = DiscordWebhook::new("https://example.com/webhook")
            .with_timeout(Duration::from_secs(10))
            .with_retries(3);

        assert_eq!(sink.url, "https://example.com/webhook");
        assert_eq!(sink.timeout, Duration::from_secs(10));
        assert_eq!(sink.retries, 3);
        assert!(sink.is_configured());
    }

    #[test]
    fn test_from_config() {
        let config = DiscordConfig {
            webhook_url: "https://discord.com/api/webhooks/1/abc".to_string(),
            timeout_ms: 2500,
            retries: 0,
        };
        let sink = DiscordWebhook::from_config(&config);
        assert_eq!(sink.timeout, Duration::from_millis(2500));
        assert_eq!(sink.retries, 0);
    }

    #[tokio::test]
    async fn test_unconfigured_url_fails() {
        let err = DiscordWebhook::new("").deliver(Embed::new("t")).await.unwrap_err();
        assert!(matches!(err, DeliveryError::NotConfigured));

        let err = DiscordWebhook::new("${DISCORD_WEBHOOK_URL}")
            .deliver(Embed::new("t"))
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::NotConfigured));
    }

    #[tokio::test]
    async fn test_success_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/webhook")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "embeds": [{"title": "t"}]
            })))
            .with_status(204)
            .expect(1)
            .create_async()
            .await;

        DiscordWebhook::new(format!("{}/webhook", server.url()))
            .deliver(Embed::new("t"))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/webhook")
            .with_status(400)
            .with_body("bad request")
            .expect(1)
            .create_async()
            .await;

        let err = DiscordWebhook::new(format!("{}/webhook", server.url()))
            .with_retries(3)
            .deliver(Embed::new("t"))
            .await
            .unwrap_err();

        match err {
            DeliveryError::Status { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "bad request");
            }
            other => panic!("unexpected error: {other}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/webhook")
            .with_status(502)
            .expect(3)
            .create_async()
            .await;

        let err = DiscordWebhook::new(format!("{}/webhook", server.url()))
            .with_retries(2)
            .deliver(Embed::new("t"))
            .await
            .unwrap_err();

        assert!(matches!(err, DeliveryError::Status { status: 502, .. }));
        mock.assert_async().await;
    }
}
