//! # octohook
//!
//! Relays GitHub webhook events to a Discord channel.
//!
//! ## Architecture
//!
//! ```text
//! GitHub -> (event type, payload) -> Dispatcher -> Handlers -> Discord webhook
//! ```
//!
//! ## Modules
//!
//! - [`event`]: The GitHub event types octohook routes on
//! - [`payload`]: Typed views over GitHub webhook payloads
//! - [`dispatcher`]: Handler registry and concurrent fan-out
//! - [`handlers`]: Handler trait and built-in handlers
//! - [`discord`]: Embed model, formatting helpers and webhook delivery
//! - [`config`]: TOML configuration

pub mod config;
pub mod discord;
pub mod dispatcher;
pub mod event;
pub mod handlers;
pub mod payload;

// Re-export commonly used types at crate root
pub use config::AppConfig;
pub use dispatcher::{DispatchSummary, Dispatcher, HandlerFailure};
pub use event::EventType;
pub use handlers::{Handler, HandlerError};
