//! GitHub event types understood by octohook.
//!
//! [`EventType`] is the tag the [`Dispatcher`](crate::Dispatcher) routes on.
//! The names match the `X-GitHub-Event` header values GitHub sends.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Returned when a GitHub event name has no [`EventType`] counterpart.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown GitHub event type: {0}")]
pub struct UnknownEventType(pub String);

/// A category of inbound GitHub webhook event.
///
/// # Example
///
/// ```
/// use octohook::EventType;
///
/// let event: EventType = "workflow_run".parse().unwrap();
/// assert_eq!(event, EventType::WorkflowRun);
/// assert_eq!(event.to_string(), "workflow_run");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Sent once when a webhook is created
    Ping,
    /// Commits pushed to a branch or tag
    Push,
    /// Issue opened, closed, labeled, ...
    Issues,
    /// A GitHub Actions workflow run changed state
    WorkflowRun,
    /// A single job inside a workflow run changed state
    WorkflowJob,
}

impl EventType {
    /// Every event type, in declaration order.
    pub const ALL: [EventType; 5] = [
        EventType::Ping,
        EventType::Push,
        EventType::Issues,
        EventType::WorkflowRun,
        EventType::WorkflowJob,
    ];

    /// The GitHub name of this event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Ping => "ping",
            EventType::Push => "push",
            EventType::Issues => "issues",
            EventType::WorkflowRun => "workflow_run",
            EventType::WorkflowJob => "workflow_job",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| UnknownEventType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_types() {
        assert_eq!("ping".parse::<EventType>(), Ok(EventType::Ping));
        assert_eq!("push".parse::<EventType>(), Ok(EventType::Push));
        assert_eq!("issues".parse::<EventType>(), Ok(EventType::Issues));
        assert_eq!("workflow_job".parse::<EventType>(), Ok(EventType::WorkflowJob));
    }

    #[test]
    fn test_parse_unknown_type() {
        let err = "pull_request".parse::<EventType>().unwrap_err();
        assert_eq!(err, UnknownEventType("pull_request".to_string()));
        assert!(err.to_string().contains("pull_request"));
    }

    #[test]
    fn test_serde_uses_github_names() {
        let json = serde_json::to_string(&EventType::WorkflowRun).unwrap();
        assert_eq!(json, "\"workflow_run\"");

        let event: EventType = serde_json::from_str("\"issues\"").unwrap();
        assert_eq!(event, EventType::Issues);
    }

    #[test]
    fn test_display_matches_as_str() {
        for event in EventType::ALL {
            assert_eq!(event.to_string(), event.as_str());
        }
    }
}
