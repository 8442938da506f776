//! Push handler - lists the commits in a push.

use super::{Handler, HandlerError};
use crate::config::AppConfig;
use crate::discord::{format_file_changes, truncate, DeliverySink, Embed, EmbedField};
use crate::event::EventType;
use crate::payload::PushPayload;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Longest commit summary shown per line
const SUMMARY_LIMIT: usize = 60;

pub struct PushHandler {
    config: Arc<AppConfig>,
    sink: Arc<dyn DeliverySink>,
}

impl PushHandler {
    pub fn new(config: Arc<AppConfig>, sink: Arc<dyn DeliverySink>) -> Self {
        Self { config, sink }
    }

    fn build_embed(&self, payload: &PushPayload) -> Embed {
        let options = &self.config.events_config.push;
        let commits = &payload.commits;
        let noun = if commits.len() == 1 { "commit" } else { "commits" };

        let mut description = vec![format!(
            "**{}** new {} pushed to `{}` in [`{}`]({})",
            commits.len(),
            noun,
            payload.ref_name(),
            payload.repository.full_name,
            payload.repository.url()
        )];

        if options.show_commit_details {
            description.push(String::new());
            for commit in commits.iter().take(options.max_commits_shown) {
                description.push(format!(
                    "[`{}`]({}) {} - {}",
                    commit.short_id(),
                    commit.url,
                    truncate(commit.summary(), SUMMARY_LIMIT),
                    commit.author.name
                ));
            }
            if commits.len() > options.max_commits_shown {
                description.push(format!(
                    "...and {} more",
                    commits.len() - options.max_commits_shown
                ));
            }
        }

        let mut embed = Embed::new(format!(
            "[{}:{}] {} new {}",
            payload.repository.full_name,
            payload.ref_name(),
            commits.len(),
            noun
        ))
        .with_description(description.join("\n"))
        .with_color(options.embed_color);

        if let Some(compare) = &payload.compare {
            embed = embed.with_url(compare.clone());
        }

        if options.show_file_changes {
            let (added, modified, removed) = commits.iter().fold((0, 0, 0), |acc, c| {
                (
                    acc.0 + c.added.len(),
                    acc.1 + c.modified.len(),
                    acc.2 + c.removed.len(),
                )
            });
            let summary = format_file_changes(added, modified, removed);
            if !summary.is_empty() {
                embed = embed.with_field(EmbedField::new(
                    "Files",
                    format!("```diff\n{}\n```", summary.replace(", ", "\n")),
                    true,
                ));
            }
        }

        embed.with_sender(&payload.sender)
    }
}

#[async_trait]
impl Handler for PushHandler {
    fn name(&self) -> &str {
        "push"
    }

    fn events(&self) -> &[EventType] {
        &[EventType::Push]
    }

    async fn execute(&self, payload: &Value) -> Result<(), HandlerError> {
        if !self.config.events.is_enabled(EventType::Push) {
            debug!("Push notifications disabled, skipping");
            return Ok(());
        }

        let payload = PushPayload::deserialize(payload)?;

        // Branch deletions and tag pushes without commits have nothing to list
        if payload.commits.is_empty() {
            debug!(git_ref = %payload.git_ref, "Push without commits, skipping");
            return Ok(());
        }

        let embed = self.build_embed(&payload);
        self.sink.deliver(embed).await?;
        Ok(())
    }
}
