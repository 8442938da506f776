//! Event handlers.
//!
//! A handler subscribes to one or more [`EventType`]s and turns each payload
//! into a Discord notification. The [`Handler`] trait is the only thing the
//! [`Dispatcher`](crate::Dispatcher) knows about.
//!
//! ## Built-in Handlers
//!
//! - [`IssuesHandler`]: issue opened/closed/labeled summaries
//! - [`PushHandler`]: commit lists for pushes
//! - [`WorkflowRunHandler`]: finished GitHub Actions runs
//! - [`WorkflowJobHandler`]: finished GitHub Actions jobs
//! - [`PingHandler`]: logs the hook-created ping
//!
//! ## Creating Custom Handlers
//!
//! ```rust,ignore
//! use octohook::{EventType, Handler, HandlerError};
//! use async_trait::async_trait;
//! use serde_json::Value;
//!
//! struct MyHandler;
//!
//! #[async_trait]
//! impl Handler for MyHandler {
//!     fn name(&self) -> &str {
//!         "my-handler"
//!     }
//!
//!     fn events(&self) -> &[EventType] {
//!         &[EventType::Push]
//!     }
//!
//!     async fn execute(&self, payload: &Value) -> Result<(), HandlerError> {
//!         // Your logic here
//!         Ok(())
//!     }
//! }
//! ```

pub mod issues;
pub mod ping;
pub mod push;
pub mod workflow_job;
pub mod workflow_run;

use crate::config::AppConfig;
use crate::discord::{DeliveryError, DeliverySink};
use crate::event::EventType;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub use issues::IssuesHandler;
pub use ping::PingHandler;
pub use push::PushHandler;
pub use workflow_job::WorkflowJobHandler;
pub use workflow_run::WorkflowRunHandler;

/// Errors that can occur while a handler executes.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The payload did not have the shape the handler expects
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// The notification could not be delivered
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// Generic handler failure
    #[error("handler failed: {0}")]
    Failed(String),
}

/// The core Handler trait.
///
/// # Thread Safety
///
/// Handlers are shared between the dispatcher's per-event lists through
/// `Arc`, so they must be `Send + Sync`.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Non-empty name used in diagnostics (e.g. "issues", "push")
    fn name(&self) -> &str;

    /// Event types this handler subscribes to. Must not be empty.
    fn events(&self) -> &[EventType];

    /// Handle one event payload.
    ///
    /// Returning an error (or panicking) is reported by the dispatcher and
    /// never affects other handlers subscribed to the same event.
    async fn execute(&self, payload: &Value) -> Result<(), HandlerError>;
}

/// Build every built-in handler, sharing one config and one delivery sink.
pub fn default_handlers(
    config: Arc<AppConfig>,
    sink: Arc<dyn DeliverySink>,
) -> Vec<Arc<dyn Handler>> {
    vec![
        Arc::new(PingHandler::new()),
        Arc::new(PushHandler::new(config.clone(), sink.clone())),
        Arc::new(IssuesHandler::new(config.clone(), sink.clone())),
        Arc::new(WorkflowRunHandler::new(config.clone(), sink.clone())),
        Arc::new(WorkflowJobHandler::new(config, sink)),
    ]
}
