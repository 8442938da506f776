//! octohook - replay a GitHub webhook payload into Discord.
//!
//! ```text
//! octohook <event-type> [payload.json]
//! ```
//!
//! The payload is read from the file, or from stdin when no file is given.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `OCTOHOOK_CONFIG`: Config file path (default: "config/octohook.toml")
//! - `DISCORD_WEBHOOK_URL`: Webhook URL when the config file leaves it blank
//! - `RUST_LOG`: Logging filter (default: "info", or "debug" with `app.debug`)

use serde_json::Value;
use std::env;
use std::io::Read;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter};

use octohook::discord::DiscordWebhook;
use octohook::handlers::default_handlers;
use octohook::{AppConfig, Dispatcher, EventType};

const USAGE: &str = "usage: octohook <event-type> [payload.json]";

/// Build the dispatcher with every built-in handler.
fn build_dispatcher(config: Arc<AppConfig>) -> Dispatcher {
    let sink = Arc::new(DiscordWebhook::from_config(&config.discord));

    let mut dispatcher = Dispatcher::new();
    dispatcher.register(default_handlers(config, sink));

    info!(
        handler_count = dispatcher.handler_count(),
        events = ?dispatcher.registered_events(),
        "Dispatcher configured"
    );
    dispatcher
}

fn read_payload(path: Option<&str>) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            raw
        }
    };
    Ok(serde_json::from_str(&raw)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Logging comes up before the config so load diagnostics are visible;
    // `app.debug` raises the level afterwards unless RUST_LOG is set.
    let env_filter = EnvFilter::try_from_default_env().ok();
    let has_env_filter = env_filter.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let config = AppConfig::load()?;

    if config.app.debug && !has_env_filter {
        filter_handle.modify(|filter| *filter = EnvFilter::new("debug"))?;
        info!("Debug logging enabled");
    }

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(event_name) = args.first() else {
        error!("{}", USAGE);
        return Err(USAGE.into());
    };

    let event: EventType = event_name.parse()?;
    let payload = read_payload(args.get(1).map(String::as_str))?;

    let dispatcher = build_dispatcher(Arc::new(config));
    let summary = dispatcher.emit(event, &payload).await;

    if summary.is_success() {
        info!(
            event = %summary.event,
            handlers_run = summary.handlers_run,
            "Event relayed"
        );
    } else {
        warn!(
            event = %summary.event,
            handlers_run = summary.handlers_run,
            failures = summary.failure_count(),
            "Event relayed with failures"
        );
    }

    Ok(())
}
