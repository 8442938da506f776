//! Issues handler - summarises issue activity.

use super::{Handler, HandlerError};
use crate::config::AppConfig;
use crate::discord::{truncate, DeliverySink, Embed, EmbedField};
use crate::event::EventType;
use crate::payload::{IssueState, IssuesPayload};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Longest issue title shown before truncation
const TITLE_LIMIT: usize = 50;

/// Longest issue body excerpt
const BODY_LIMIT: usize = 300;

pub struct IssuesHandler {
    config: Arc<AppConfig>,
    sink: Arc<dyn DeliverySink>,
}

impl IssuesHandler {
    pub fn new(config: Arc<AppConfig>, sink: Arc<dyn DeliverySink>) -> Self {
        Self { config, sink }
    }

    fn build_embed(&self, payload: &IssuesPayload) -> Embed {
        let options = &self.config.events_config.issues;
        let issue = &payload.issue;
        let repo = &payload.repository;
        let action = payload.action();

        let mut description = vec![
            format!(
                ">>> Issue **#{}** {} in [`{}`]({})",
                issue.number,
                action,
                repo.full_name,
                repo.url()
            ),
            "```diff".to_string(),
            match issue.state {
                IssueState::Open => "+ Issue opened".to_string(),
                IssueState::Closed => "- Issue closed".to_string(),
            },
        ];
        if !issue.labels.is_empty() {
            let noun = if issue.labels.len() == 1 { "label" } else { "labels" };
            description.push(format!("! {} {} applied", issue.labels.len(), noun));
        }
        description.push("```".to_string());

        if let Some(body) = issue.body.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
            description.push(format!("> {}", truncate(body, BODY_LIMIT)));
        }

        let mut fields = vec![EmbedField::new(
            format!("`#{}`", issue.number),
            format!("```fix\n{}\n```", truncate(&issue.title, TITLE_LIMIT)),
            issue.title.chars().count() < TITLE_LIMIT,
        )];

        if options.show_labels && !issue.labels.is_empty() {
            let labels = issue
                .labels
                .iter()
                .map(|label| format!("`{}`", label.name))
                .collect::<Vec<_>>()
                .join(", ");
            fields.push(EmbedField::new("Labels", labels, true));
        }

        if options.show_assignees && !issue.assignees.is_empty() {
            let assignees = issue
                .assignees
                .iter()
                .map(|a| format!("[@{0}](https://github.com/{0})", a.login))
                .collect::<Vec<_>>()
                .join(", ");
            fields.push(EmbedField::new("Assignees", assignees, true));
        }

        let state = match issue.state {
            IssueState::Open => "Open",
            IssueState::Closed => "Closed",
        };
        fields.push(EmbedField::new("State", state, true));

        Embed::new(format!("Issue {}: #{}", action, issue.number))
            .with_url(issue.html_url.clone())
            .with_description(description.join("\n"))
            .with_color(options.embed_color)
            .with_fields(fields)
            .with_sender(&payload.sender)
    }
}

#[async_trait]
impl Handler for IssuesHandler {
    fn name(&self) -> &str {
        "issues"
    }

    fn events(&self) -> &[EventType] {
        &[EventType::Issues]
    }

    async fn execute(&self, payload: &Value) -> Result<(), HandlerError> {
        if !self.config.events.is_enabled(EventType::Issues) {
            debug!("Issues notifications disabled, skipping");
            return Ok(());
        }

        let payload = IssuesPayload::deserialize(payload)?;
        let embed = self.build_embed(&payload);
        self.sink.deliver(embed).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EventToggles;
    use crate::handlers::test_support::RecordingSink;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "action": "labeled",
            "issue": {
                "number": 42,
                "title": "Bug",
                "body": "It crashes when I click the button",
                "state": "open",
                "html_url": "https://github.com/org/repo/issues/42",
                "labels": [{"name": "bug", "color": "d73a4a"}, {"name": "p1", "color": "000000"}],
                "assignees": [{"login": "bob", "avatar_url": ""}]
            },
            "repository": {"name": "repo", "full_name": "org/repo", "html_url": "https://github.com/org/repo"},
            "sender": {"login": "alice", "avatar_url": "https://a/alice.png", "html_url": "https://github.com/alice"}
        })
    }

    fn handler(config: AppConfig) -> (IssuesHandler, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        (IssuesHandler::new(Arc::new(config), sink.clone()), sink)
    }

    #[tokio::test]
    async fn test_issue_embed() {
        let (handler, sink) = handler(AppConfig::default());
        handler.execute(&payload()).await.unwrap();

        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        let embed = &sent[0];

        assert_eq!(embed.title.as_deref(), Some("Issue labeled: #42"));
        assert_eq!(embed.color, Some(0x57F287));
        let description = embed.description.as_deref().unwrap();
        assert!(description.contains("Issue **#42** labeled in [`org/repo`](https://github.com/org/repo)"));
        assert!(description.contains("+ Issue opened"));
        assert!(description.contains("! 2 labels applied"));
        assert!(description.contains("> It crashes"));

        let names: Vec<&str> = embed.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["`#42`", "Labels", "Assignees", "State"]);
        assert_eq!(embed.fields[0].value, "```fix\nBug\n```");
        assert!(embed.fields[0].inline);
        assert_eq!(embed.fields[1].value, "`bug`, `p1`");
        assert_eq!(embed.fields[2].value, "[@bob](https://github.com/bob)");
        assert_eq!(embed.fields[3].value, "Open");
        assert_eq!(embed.author.as_ref().unwrap().name, "alice");
    }

    #[tokio::test]
    async fn test_minimal_payload() {
        let (handler, sink) = handler(AppConfig::default());
        let payload = json!({
            "issue": {"number": 42, "title": "Bug", "state": "closed", "labels": [], "assignees": []},
            "repository": {"full_name": "org/repo"},
            "sender": {"login": "alice"}
        });

        handler.execute(&payload).await.unwrap();

        let sent = sink.sent();
        let embed = &sent[0];
        assert_eq!(embed.title.as_deref(), Some("Issue closed: #42"));
        let description = embed.description.as_deref().unwrap();
        assert!(description.contains("- Issue closed"));
        assert!(!description.contains("applied"));
        assert_eq!(embed.fields.len(), 2);
        assert_eq!(embed.fields[1].value, "Closed");
    }

    #[tokio::test]
    async fn test_long_title_truncated() {
        let (handler, sink) = handler(AppConfig::default());
        let mut payload = payload();
        payload["issue"]["title"] = json!("x".repeat(80));

        handler.execute(&payload).await.unwrap();

        let sent = sink.sent();
        let field = &sent[0].fields[0];
        assert_eq!(field.value, format!("```fix\n{}...\n```", "x".repeat(47)));
        assert!(!field.inline);
    }

    #[tokio::test]
    async fn test_optional_fields_respect_config() {
        let mut config = AppConfig::default();
        config.events_config.issues.show_labels = false;
        config.events_config.issues.show_assignees = false;
        let (handler, sink) = handler(config);

        handler.execute(&payload()).await.unwrap();

        let names: Vec<String> = sink.sent()[0].fields.iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, vec!["`#42`", "State"]);
    }

    #[tokio::test]
    async fn test_disabled_skips_delivery() {
        let config = AppConfig {
            events: EventToggles {
                issues: false,
                ..EventToggles::default()
            },
            ..AppConfig::default()
        };
        let (handler, sink) = handler(config);

        handler.execute(&payload()).await.unwrap();
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_payload() {
        let (handler, sink) = handler(AppConfig::default());
        let err = handler.execute(&json!({"issue": 1})).await.unwrap_err();

        assert!(matches!(err, HandlerError::Payload(_)));
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure_propagates() {
        let sink = Arc::new(RecordingSink::failing());
        let handler = IssuesHandler::new(Arc::new(AppConfig::default()), sink.clone());

        let err = handler.execute(&payload()).await.unwrap_err();
        assert!(matches!(err, HandlerError::Delivery(_)));
        assert_eq!(sink.sent().len(), 1);
    }
}
