//! Event Dispatcher - maps GitHub event types to handlers.
//!
//! The [`Dispatcher`] keeps, per [`EventType`], the handlers subscribed to it
//! in registration order, and fans each emitted event out to all of them.
//!
//! # Architecture
//!
//! ```text
//! emit(issues, payload)
//!     │
//!     ▼
//! ┌──────────────────────────────────────────┐
//! │              DISPATCHER                  │
//! │                                          │
//! │  handlers[issues] = [IssuesHandler, Audit]
//! │                                          │
//! │  ├──► IssuesHandler.execute(payload) ─┐  │
//! │  └──► Audit.execute(payload) ─────────┤  │
//! │                                       ▼  │
//! │           wait until all have settled    │
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Failure isolation
//!
//! A handler that returns an error or panics is logged and recorded in the
//! [`DispatchSummary`]; its siblings still run to completion and
//! [`Dispatcher::emit`] itself never fails.
//!
//! # Lifecycle
//!
//! Build one dispatcher at startup, register every handler, then share it
//! (usually as `Arc<Dispatcher>`) with whatever issues `emit` calls.
//! [`Dispatcher::register`] takes `&mut self`, so registration cannot race
//! with dispatch.
//!
//! # Example
//!
//! ```rust,ignore
//! use octohook::{Dispatcher, EventType};
//! use octohook::handlers::default_handlers;
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.register(default_handlers(config, sink));
//!
//! let summary = dispatcher.emit(EventType::Issues, &payload).await;
//! ```

use crate::event::EventType;
use crate::handlers::Handler;
use futures::future::join_all;
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// A handler that failed while processing an emitted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    /// Name of the handler that failed
    pub handler: String,

    /// Error detail (error message or panic message)
    pub error: String,
}

/// Outcome of emitting one event.
///
/// Purely informational: callers that only care about completion can drop it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSummary {
    pub event: EventType,

    /// Number of handlers invoked
    pub handlers_run: usize,

    /// Handlers that returned an error or panicked
    pub failures: Vec<HandlerFailure>,
}

impl DispatchSummary {
    fn empty(event: EventType) -> Self {
        Self {
            event,
            handlers_run: 0,
            failures: Vec::new(),
        }
    }

    /// Returns true if every invoked handler succeeded
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns the number of failed handlers
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Registry of handlers and dispatcher of events to them.
///
/// # Thread Safety
///
/// The Dispatcher is designed to be wrapped in `Arc` once registration is
/// done. Handlers must be `Send + Sync`.
#[derive(Default)]
pub struct Dispatcher {
    /// Handlers per event type, in registration order
    handlers: HashMap<EventType, Vec<Arc<dyn Handler>>>,
}

impl Dispatcher {
    /// Create a dispatcher with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register handlers for every event type they subscribe to.
    ///
    /// Handlers are appended per event type in the order given. Registering
    /// the same handler instance twice for an event type is a no-op; two
    /// distinct instances are both kept, even if they share a name.
    /// Handlers subscribing to no event type are skipped.
    pub fn register<I>(&mut self, handlers: I)
    where
        I: IntoIterator<Item = Arc<dyn Handler>>,
    {
        for handler in handlers {
            if handler.events().is_empty() {
                warn!(
                    handler = %handler.name(),
                    "Handler subscribes to no event types, skipping"
                );
                continue;
            }

            for &event in handler.events() {
                let list = self.handlers.entry(event).or_default();

                if list.iter().any(|h| same_handler(h, &handler)) {
                    debug!(
                        handler = %handler.name(),
                        event = %event,
                        "Handler already registered for event, ignoring"
                    );
                    continue;
                }

                list.push(handler.clone());
                info!(
                    handler = %handler.name(),
                    event = %event,
                    "Registered {} for {} events",
                    handler.name(),
                    event
                );
            }
        }
    }

    /// Event types with at least one registered handler.
    pub fn registered_events(&self) -> BTreeSet<EventType> {
        self.handlers
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(event, _)| *event)
            .collect()
    }

    /// Handlers registered for `event`, in registration order.
    pub fn handlers(&self, event: EventType) -> &[Arc<dyn Handler>] {
        self.handlers
            .get(&event)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of (handler, event type) registrations.
    pub fn handler_count(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    /// Emit an event to every handler registered for its type.
    ///
    /// # Execution
    ///
    /// All handlers are started, in registration order, before any is waited
    /// on; they then run concurrently on the calling task. Completion order is
    /// unspecified. The returned future resolves once every handler has
    /// either succeeded or failed.
    ///
    /// There is no timeout: a handler that never finishes keeps `emit` from
    /// finishing. Wrap the call in `tokio::time::timeout` if latency matters.
    ///
    /// # Error Handling
    ///
    /// Handler errors and panics are logged with the handler's name and
    /// collected in the summary. They never reach the caller.
    pub async fn emit(&self, event: EventType, payload: &Value) -> DispatchSummary {
        let handlers = self.handlers(event);

        if handlers.is_empty() {
            warn!(
                event = %event,
                "No handlers registered for event type: {}",
                event
            );
            return DispatchSummary::empty(event);
        }

        info!(
            event = %event,
            handler_count = handlers.len(),
            "Processing {} event with {} handler(s)",
            event,
            handlers.len()
        );

        let outcomes = join_all(handlers.iter().map(|handler| async move {
            let outcome = AssertUnwindSafe(async { handler.execute(payload).await })
                .catch_unwind()
                .await;
            (handler, outcome)
        }))
        .await;

        let mut summary = DispatchSummary::empty(event);
        summary.handlers_run = outcomes.len();

        for (handler, outcome) in outcomes {
            let detail = match outcome {
                Ok(Ok(())) => {
                    debug!(handler = %handler.name(), "{} executed successfully", handler.name());
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(panic) => format!("panicked: {}", panic_message(panic.as_ref())),
            };

            error!(
                handler = %handler.name(),
                event = %event,
                error = %detail,
                "{} failed: {}",
                handler.name(),
                detail
            );
            summary.failures.push(HandlerFailure {
                handler: handler.name().to_string(),
                error: detail,
            });
        }

        if !summary.is_success() {
            warn!(
                event = %event,
                handlers_run = summary.handlers_run,
                failures = summary.failure_count(),
                "Event dispatched with failures"
            );
        }

        summary
    }
}

/// Identity comparison on the handler allocation, ignoring vtables.
fn same_handler(a: &Arc<dyn Handler>, b: &Arc<dyn Handler>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
