//! Ping handler - logs the ping GitHub sends when a webhook is created.
//!
//! Nothing is posted to Discord; the ping only confirms the hook reached us.

use super::{Handler, HandlerError};
use crate::event::EventType;
use crate::payload::PingPayload;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct PingHandler;

impl PingHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for PingHandler {
    fn name(&self) -> &str {
        "ping"
    }

    fn events(&self) -> &[EventType] {
        &[EventType::Ping]
    }

    async fn execute(&self, payload: &Value) -> Result<(), HandlerError> {
        let ping = PingPayload::deserialize(payload)?;
        let repository = ping
            .repository
            .as_ref()
            .map(|r| r.full_name.as_str())
            .unwrap_or("<organization>");

        info!(
            hook_id = ?ping.hook_id,
            repository = %repository,
            zen = ping.zen.as_deref().unwrap_or_default(),
            "Webhook ping received"
        );
        Ok(())
    }
}
